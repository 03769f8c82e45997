//! Access control lists.
//!
//! An ACL is an 8-byte header followed by its entries:
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | Revision (2, or 4 with object entries) |
//! | 1      | 1    | Reserved                               |
//! | 2      | 2    | Size including this header, LE         |
//! | 4      | 2    | Entry count, LE                        |
//! | 6      | 2    | Reserved                               |
//!
//! Entries are decoded from a reader restricted to the declared size, so a damaged entry can
//! never pull bytes from whatever follows the ACL in the descriptor. An ACL either decodes
//! completely or fails; a partial entry list would under-report the effective permissions.

use crate::{
    config::DecoderConfig,
    descriptor::ace::{AccessControlEntry, ACE_HEADER_SIZE},
    diagnostics::{DiagnosticCategory, Diagnostics},
    reader::{io::write_le_at, Parser},
    Error, Result,
};

/// Size of the ACL header
pub const ACL_HEADER_SIZE: usize = 8;
/// Revision of ACLs that contain only basic entries
pub const ACL_REVISION: u8 = 2;
/// Revision of ACLs that may contain object entries
pub const ACL_REVISION_DS: u8 = 4;

/// A decoded access control list.
///
/// Entry order is significant: access checks evaluate entries first to last and stop at the
/// first entry that decides a requested right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlList {
    /// ACL revision
    pub revision: u8,
    /// Entries in their stored order
    pub entries: Vec<AccessControlEntry>,
}

impl AccessControlList {
    /// Creates an ACL from entries, choosing the revision from their types.
    #[must_use]
    pub fn new(entries: Vec<AccessControlEntry>) -> Self {
        let revision = if entries.iter().any(|e| e.ace_type().is_object()) {
            ACL_REVISION_DS
        } else {
            ACL_REVISION
        };

        AccessControlList { revision, entries }
    }

    /// Decodes an ACL at the current position of `parser` and advances past it.
    ///
    /// # Errors
    /// - [`crate::Error::AclSizeMismatch`] if the declared size is below 8, an entry would
    ///   extend past the declared size, or the entries do not fill it exactly
    /// - [`crate::Error::Truncated`] if the declared size runs past the buffer
    /// - [`crate::Error::UnsupportedRevision`] for revisions other than 2 and 4 when
    ///   [`DecoderConfig::strict_revisions`] is set
    /// - Any error of [`AccessControlEntry::decode`]
    pub fn decode(
        parser: &mut Parser,
        config: &DecoderConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let start = parser.pos();

        let revision = parser.read_le::<u8>()?;
        let _sbz1 = parser.read_le::<u8>()?;
        let declared = usize::from(parser.read_le::<u16>()?);
        let count = parser.read_le::<u16>()?;
        let _sbz2 = parser.read_le::<u16>()?;

        if declared < ACL_HEADER_SIZE {
            return Err(Error::AclSizeMismatch {
                offset: start,
                declared,
                consumed: ACL_HEADER_SIZE,
            });
        }

        if revision != ACL_REVISION && revision != ACL_REVISION_DS {
            if config.strict_revisions {
                return Err(Error::UnsupportedRevision {
                    structure: "ACL",
                    revision,
                    offset: start,
                });
            }
            diagnostics.warning_at(
                DiagnosticCategory::Acl,
                start,
                format!("unexpected ACL revision {}", revision),
            );
        }

        let mut window = parser.limit(declared - ACL_HEADER_SIZE)?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let entry_start = window.pos();
            if window.remaining() < ACE_HEADER_SIZE {
                return Err(Error::AclSizeMismatch {
                    offset: start,
                    declared,
                    consumed: entry_start - start + ACE_HEADER_SIZE,
                });
            }

            let mut header = window;
            header.advance_by(2)?;
            let entry_size = usize::from(header.read_le::<u16>()?);
            if entry_size > window.remaining() {
                return Err(Error::AclSizeMismatch {
                    offset: start,
                    declared,
                    consumed: entry_start - start + entry_size,
                });
            }

            let entry = AccessControlEntry::decode(&mut window, config, diagnostics)?;
            if revision == ACL_REVISION && entry.ace_type().is_object() {
                diagnostics.warning_at(
                    DiagnosticCategory::Acl,
                    entry_start,
                    format!(
                        "object entry {:?} in a revision {} ACL",
                        entry.ace_type(),
                        ACL_REVISION
                    ),
                );
            }
            entries.push(entry);
        }

        if window.has_more_data() {
            return Err(Error::AclSizeMismatch {
                offset: start,
                declared,
                consumed: window.pos() - start,
            });
        }

        parser.advance_by(declared - ACL_HEADER_SIZE)?;

        log::debug!(
            "decoded ACL at {:#x}: revision {}, {} entries",
            start,
            revision,
            entries.len()
        );
        Ok(AccessControlList { revision, entries })
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AccessControlEntry> {
        self.entries.iter()
    }

    /// Checks the canonical DACL order.
    ///
    /// Explicit entries must precede inherited ones, and among explicit entries every deny
    /// must precede every allow. Opaque entries are ignored.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        // 0 = explicit deny, 1 = explicit allow, 2 = inherited
        let mut phase = 0u8;
        for entry in &self.entries {
            let rank = if entry.is_inherited() {
                2
            } else if entry.is_deny() {
                0
            } else if entry.is_allow() {
                1
            } else {
                continue;
            };

            if rank < phase {
                return false;
            }
            phase = rank;
        }
        true
    }

    /// Number of bytes the ACL occupies when encoded, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        ACL_HEADER_SIZE
            + self
                .entries
                .iter()
                .map(AccessControlEntry::encoded_len)
                .sum::<usize>()
    }

    /// Writes the ACL into `data` at `offset` and advances the offset.
    ///
    /// Size and count are recomputed; reserved fields are written as zero.
    ///
    /// # Errors
    /// - [`crate::Error::Truncated`] if `data` is too small
    /// - [`crate::Error::Malformed`] if size or count exceed 65535
    pub fn write_to(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        let size = u16::try_from(self.encoded_len())
            .map_err(|_| malformed_error!("ACL of {} bytes exceeds 65535", self.encoded_len()))?;
        let count = u16::try_from(self.entries.len())
            .map_err(|_| malformed_error!("ACL with {} entries", self.entries.len()))?;

        write_le_at(data, offset, self.revision)?;
        write_le_at(data, offset, 0u8)?;
        write_le_at(data, offset, size)?;
        write_le_at(data, offset, count)?;
        write_le_at(data, offset, 0u16)?;

        for entry in &self.entries {
            entry.write_to(data, offset)?;
        }

        Ok(())
    }

    /// Returns the encoded ACL as a new buffer.
    ///
    /// # Errors
    /// See [`AccessControlList::write_to`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.encoded_len()];
        let mut offset = 0;
        self.write_to(&mut buffer, &mut offset)?;
        Ok(buffer)
    }
}

impl<'a> IntoIterator for &'a AccessControlList {
    type Item = &'a AccessControlEntry;
    type IntoIter = std::slice::Iter<'a, AccessControlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
