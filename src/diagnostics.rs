//! Non-fatal findings collected while decoding and analyzing descriptors.
//!
//! Structural damage aborts a decode with an [`crate::Error`]. Everything that is merely
//! unusual (a control flag that disagrees with an offset, an ACE type this crate does not
//! decode, an unknown object-type GUID) is reported as a [`Diagnostic`] next to the value
//! instead, so a caller never loses the parts of a descriptor that decoded cleanly.
//!
//! # Key Components
//!
//! - [`Decoded`] - A decoded value together with the diagnostics produced for it
//! - [`Diagnostics`] - Per-call collector handed down through the decoders
//! - [`Diagnostic`] - Individual entry with severity, category, message and offset
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning)
//! - [`DiagnosticCategory`] - Which part of the pipeline produced the entry
//!
//! # Usage Examples
//!
//! ```rust
//! use sdscope::{DiagnosticSeverity, SecurityDescriptor};
//!
//! // Revision 1, DACL_PRESENT | SELF_RELATIVE, but no DACL offset
//! let blob = [
//!     0x01, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//! ];
//! let decoded = SecurityDescriptor::decode(&blob)?;
//!
//! assert!(decoded.value.dacl.is_none());
//! for entry in &decoded.diagnostics {
//!     println!("{}", entry);
//! }
//! assert!(decoded.has_warnings());
//! # Ok::<(), sdscope::Error>(())
//! ```
//!
//! # Logging
//!
//! Every recorded entry is also emitted through the `log` facade: warnings at `warn`,
//! informational entries at `debug`.

use std::fmt;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for unusual but expected states, e.g. a SACL that was flagged present but
    /// withheld because the reader lacked audit rights.
    Info,

    /// Something about the input is inconsistent or could not be fully interpreted.
    ///
    /// The value is still returned, but parts of it may be missing or uninterpreted.
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
        }
    }
}

/// Category indicating the source of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Descriptor header issues: control flags versus offsets, offsets into the header.
    Descriptor,

    /// ACL issues: revisions, canonical ordering, object entries in a basic ACL.
    Acl,

    /// ACE issues: entry types that are kept opaque.
    Ace,

    /// Access mask interpretation: unknown object-type identifiers.
    AccessMask,

    /// Delegation analysis: contradictory account settings, odd RBCD descriptors.
    Delegation,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Descriptor => write!(f, "Descriptor"),
            DiagnosticCategory::Acl => write!(f, "Acl"),
            DiagnosticCategory::Ace => write!(f, "Ace"),
            DiagnosticCategory::AccessMask => write!(f, "AccessMask"),
            DiagnosticCategory::Delegation => write!(f, "Delegation"),
        }
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Optional blob offset where the issue was found.
    pub offset: Option<usize>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            offset: None,
        }
    }

    /// Adds blob offset information to the diagnostic.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(offset) = self.offset {
            write!(f, " (offset: 0x{:04x})", offset)?;
        }

        Ok(())
    }
}

/// Collector for the diagnostics of a single decode or analysis call.
///
/// Created fresh per call and converted into the `diagnostics` field of a [`Decoded`]
/// once the call finishes.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates a new empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records an informational entry.
    pub fn info(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Records a warning.
    pub fn warning(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Records an informational entry located at `offset`.
    pub fn info_at(
        &mut self,
        category: DiagnosticCategory,
        offset: usize,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message).with_offset(offset));
    }

    /// Records a warning located at `offset`.
    pub fn warning_at(
        &mut self,
        category: DiagnosticCategory,
        offset: usize,
        message: impl Into<String>,
    ) {
        self.push(
            Diagnostic::new(DiagnosticSeverity::Warning, category, message).with_offset(offset),
        );
    }

    /// Records a prepared entry.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Warning => log::warn!("{}", diagnostic),
            DiagnosticSeverity::Info => log::debug!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Moves every entry of `other` into this collector, keeping their order.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(other);
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the recorded entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Consumes the collector and returns its entries.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// A decoded value plus the non-fatal diagnostics produced while decoding it.
///
/// `Result<Decoded<T>>` is the shape of every top-level operation in this crate: a hard
/// error, or a value with zero or more warnings attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded value
    pub value: T,
    /// Diagnostics in the order they were recorded
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    /// Pairs a value with the entries of a collector.
    #[must_use]
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Decoded {
            value,
            diagnostics: diagnostics.into_vec(),
        }
    }

    /// Returns `true` if any diagnostic has [`DiagnosticSeverity::Warning`].
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Drops the diagnostics and returns the value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}
