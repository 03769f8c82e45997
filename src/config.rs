//! Decoder configuration
//!
//! Structural checks (bounds, declared sizes, SID validity) always run. This module only
//! controls how strictly unusual but decodable input is treated and which optional
//! consistency checks produce diagnostics.

/// Configuration for security descriptor decoding
///
/// # Examples
///
/// ```rust
/// use sdscope::{DecoderConfig, SecurityDescriptor};
///
/// let blob = [
///     0x01, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
/// ];
/// let decoded = SecurityDescriptor::decode_with(&blob, &DecoderConfig::strict())?;
/// assert!(decoded.diagnostics.is_empty());
/// # Ok::<(), sdscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DecoderConfig {
    /// Reject ACL revisions other than 2 and 4 with [`crate::Error::UnsupportedRevision`]
    /// instead of recording a warning and decoding the entries anyway
    pub strict_revisions: bool,

    /// Record diagnostics when a present flag and its offset disagree, when the
    /// self-relative flag is missing, and when an offset points into the header
    pub report_control_mismatches: bool,

    /// Record a warning when a DACL is not in canonical order
    /// (explicit before inherited, explicit deny before explicit allow)
    pub check_canonical_order: bool,

    /// Record a diagnostic for every ACE that is kept opaque
    pub report_opaque_entries: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strict_revisions: false,
            report_control_mismatches: true,
            check_canonical_order: true,
            report_opaque_entries: true,
        }
    }
}

impl DecoderConfig {
    /// Creates a configuration that rejects unknown ACL revisions
    ///
    /// All consistency checks are enabled.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_revisions: true,
            report_control_mismatches: true,
            check_canonical_order: true,
            report_opaque_entries: true,
        }
    }

    /// Creates a configuration for bulk decoding of directory dumps
    ///
    /// Only structural errors are reported; no optional diagnostics are recorded.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict_revisions: false,
            report_control_mismatches: false,
            check_canonical_order: false,
            report_opaque_entries: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_presets() {
        let strict = DecoderConfig::strict();
        assert!(strict.strict_revisions);
        assert!(strict.report_control_mismatches);
        assert!(strict.check_canonical_order);
        assert!(strict.report_opaque_entries);

        let lenient = DecoderConfig::lenient();
        assert!(!lenient.strict_revisions);
        assert!(!lenient.report_control_mismatches);
        assert!(!lenient.check_canonical_order);
        assert!(!lenient.report_opaque_entries);

        let default = DecoderConfig::default();
        assert!(!default.strict_revisions);
        assert!(default.report_control_mismatches);
        assert!(default.check_canonical_order);
    }
}
