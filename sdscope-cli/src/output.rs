use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use sdscope::Diagnostic;

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

/// Column alignment for tabular output.
#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Right,
}

/// Borderless, whitespace-aligned table for entry listings.
pub struct TabWriter {
    table: Table,
    indent: &'static str,
}

impl TabWriter {
    /// Create a table with `(header, alignment)` columns.
    pub fn new(columns: &[(&str, Align)]) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(columns.iter().map(|(name, _)| *name));

        let last = columns.len().saturating_sub(1);
        for (i, (_, align)) in columns.iter().enumerate() {
            if let Some(col) = table.column_mut(i) {
                col.set_cell_alignment(match align {
                    Align::Left => CellAlignment::Left,
                    Align::Right => CellAlignment::Right,
                });
                col.set_padding((u16::from(i != 0), u16::from(i != last)));
            }
        }

        Self { table, indent: "" }
    }

    /// Prefix every printed line with `prefix`.
    pub fn indent(mut self, prefix: &'static str) -> Self {
        self.indent = prefix;
        self
    }

    /// Add a row in column order.
    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
    }

    pub fn print(&self) {
        for line in self.table.to_string().lines() {
            println!("{}{}", self.indent, line.trim_end());
        }
    }
}

/// Serializable form of a library diagnostic.
#[derive(Debug, Serialize)]
pub struct DiagnosticEntry {
    pub severity: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl From<&Diagnostic> for DiagnosticEntry {
    fn from(diagnostic: &Diagnostic) -> Self {
        DiagnosticEntry {
            severity: diagnostic.severity.to_string(),
            category: diagnostic.category.to_string(),
            message: diagnostic.message.clone(),
            offset: diagnostic.offset,
        }
    }
}

pub fn diagnostic_entries(diagnostics: &[Diagnostic]) -> Vec<DiagnosticEntry> {
    diagnostics.iter().map(DiagnosticEntry::from).collect()
}

/// Print diagnostics as an indented block, nothing if there are none.
pub fn print_diagnostics(diagnostics: &[DiagnosticEntry]) {
    if diagnostics.is_empty() {
        return;
    }

    println!();
    println!("Diagnostics:");
    for d in diagnostics {
        match d.offset {
            Some(offset) => println!(
                "  [{}] {}: {} (offset: {offset:#06x})",
                d.severity, d.category, d.message
            ),
            None => println!("  [{}] {}: {}", d.severity, d.category, d.message),
        }
    }
}
