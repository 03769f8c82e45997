use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use sdscope::{DecoderConfig, SecurityDescriptor};

use crate::{
    app::GlobalOptions,
    commands::common::{collect_files, decoder_config, file_display_name},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct BatchOutput {
    files: usize,
    decoded: usize,
    failed: usize,
    with_warnings: usize,
    results: Vec<FileResult>,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    #[serde(skip)]
    name: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    dacl_entries: usize,
    dangerous_entries: usize,
    diagnostics: usize,
    warnings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn decode_file(path: &Path, config: &DecoderConfig) -> FileResult {
    let mut result = FileResult {
        path: path.display().to_string(),
        name: file_display_name(path),
        size: 0,
        owner: None,
        dacl_entries: 0,
        dangerous_entries: 0,
        diagnostics: 0,
        warnings: false,
        error: None,
    };

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };
    result.size = data.len();

    match SecurityDescriptor::decode_with(&data, config) {
        Ok(decoded) => {
            let sd = &decoded.value;
            result.owner = sd.owner.as_ref().map(ToString::to_string);
            if let Some(dacl) = &sd.dacl {
                result.dacl_entries = dacl.len();
                result.dangerous_entries = dacl
                    .iter()
                    .filter(|entry| entry.is_allow())
                    .filter_map(|entry| entry.mask())
                    .filter(|mask| mask.is_dangerous())
                    .count();
            }
            result.diagnostics = decoded.diagnostics.len();
            result.warnings = decoded.has_warnings();
        }
        Err(e) => {
            log::debug!("{}: {}", result.path, e);
            result.error = Some(e.to_string());
        }
    }

    result
}

pub fn run(dir: &Path, recursive: bool, opts: &GlobalOptions) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = collect_files(dir, recursive)?;
    let config = decoder_config(opts);

    let results: Vec<FileResult> = files
        .par_iter()
        .map(|path| decode_file(path, &config))
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let output = BatchOutput {
        files: results.len(),
        decoded: results.len() - failed,
        failed,
        with_warnings: results.iter().filter(|r| r.warnings).count(),
        results,
    };

    print_output(&output, opts, |out| {
        let mut table = TabWriter::new(&[
            ("File", Align::Left),
            ("Size", Align::Right),
            ("Owner", Align::Left),
            ("DACL", Align::Right),
            ("Dangerous", Align::Right),
            ("Status", Align::Left),
        ]);

        for r in &out.results {
            let status = match &r.error {
                Some(error) => format!("error: {error}"),
                None if r.warnings => format!("{} diagnostics, warnings", r.diagnostics),
                None if r.diagnostics > 0 => format!("{} diagnostics", r.diagnostics),
                None => "ok".to_string(),
            };
            table.row(vec![
                r.name.clone(),
                r.size.to_string(),
                r.owner.clone().unwrap_or_else(|| "-".to_string()),
                r.dacl_entries.to_string(),
                r.dangerous_entries.to_string(),
                status,
            ]);
        }
        table.print();

        println!();
        println!(
            "{} files: {} decoded, {} failed, {} with warnings",
            out.files, out.decoded, out.failed, out.with_warnings
        );
    })
}
