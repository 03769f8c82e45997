//! Self-relative security descriptors.
//!
//! The 20-byte header is followed by the parts it references by offset:
//!
//! | Offset | Size | Field                                             |
//! |--------|------|---------------------------------------------------|
//! | 0      | 1    | Revision, always 1                                |
//! | 1      | 1    | Reserved, resource manager bits if `RM_CONTROL_VALID` |
//! | 2      | 2    | Control flags ([`ControlFlags`]), LE              |
//! | 4      | 4    | Owner SID offset, LE                              |
//! | 8      | 4    | Group SID offset, LE                              |
//! | 12     | 4    | SACL offset, LE                                   |
//! | 16     | 4    | DACL offset, LE                                   |
//!
//! An offset of zero means the part is absent. The `*_PRESENT` control flags are expected to
//! agree with the offsets; disagreements are reported as diagnostics rather than errors,
//! because directory servers routinely omit the SACL for callers without audit rights.

use crate::{
    config::DecoderConfig,
    descriptor::{acl::AccessControlList, control::ControlFlags, sid::SecurityIdentifier},
    diagnostics::{Decoded, DiagnosticCategory, Diagnostics},
    reader::{io::write_le_at, Parser},
    Error, Result,
};

/// Size of the security descriptor header
pub const SD_HEADER_SIZE: usize = 20;
/// The only security descriptor revision
pub const SD_REVISION: u8 = 1;

/// A decoded security descriptor.
///
/// `dacl: None` and `dacl: Some(empty)` are different states: a missing DACL grants
/// everyone full access, an empty DACL grants nobody anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDescriptor {
    /// Descriptor revision
    pub revision: u8,
    /// Resource manager control bits from the reserved header byte
    pub resource_manager_control: u8,
    /// Control flags as stored, unknown bits included
    pub control: ControlFlags,
    /// Owner SID
    pub owner: Option<SecurityIdentifier>,
    /// Primary group SID
    pub group: Option<SecurityIdentifier>,
    /// System ACL (auditing)
    pub sacl: Option<AccessControlList>,
    /// Discretionary ACL (access)
    pub dacl: Option<AccessControlList>,
}

impl SecurityDescriptor {
    /// Decodes a self-relative descriptor with [`DecoderConfig::default`].
    ///
    /// # Errors
    /// See [`SecurityDescriptor::decode_with`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::SecurityDescriptor;
    ///
    /// let blob = [
    ///     0x01, 0x00, 0x04, 0x80, // revision 1, DACL_PRESENT | SELF_RELATIVE
    ///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no owner, no group
    ///     0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, // no SACL, DACL at 20
    ///     0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, // empty DACL
    /// ];
    /// let decoded = SecurityDescriptor::decode(&blob)?;
    /// assert!(decoded.value.dacl.unwrap().is_empty());
    /// assert!(decoded.diagnostics.is_empty());
    /// # Ok::<(), sdscope::Error>(())
    /// ```
    pub fn decode(data: &[u8]) -> Result<Decoded<Self>> {
        Self::decode_with(data, &DecoderConfig::default())
    }

    /// Decodes a self-relative descriptor.
    ///
    /// # Errors
    /// - [`crate::Error::Empty`] for empty input
    /// - [`crate::Error::UnsupportedRevision`] if the revision is not 1
    /// - [`crate::Error::Truncated`] if the header or a referenced part runs past the buffer
    /// - Any error of [`SecurityIdentifier::decode`] and [`AccessControlList::decode`]
    pub fn decode_with(data: &[u8], config: &DecoderConfig) -> Result<Decoded<Self>> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut diagnostics = Diagnostics::new();
        let mut parser = Parser::new(data);

        let revision = parser.read_le::<u8>()?;
        if revision != SD_REVISION {
            return Err(Error::UnsupportedRevision {
                structure: "security descriptor",
                revision,
                offset: 0,
            });
        }

        let resource_manager_control = parser.read_le::<u8>()?;
        let control = ControlFlags::from_bits_retain(parser.read_le::<u16>()?);
        let owner_offset = parser.read_le::<u32>()? as usize;
        let group_offset = parser.read_le::<u32>()? as usize;
        let sacl_offset = parser.read_le::<u32>()? as usize;
        let dacl_offset = parser.read_le::<u32>()? as usize;

        if config.report_control_mismatches {
            if !control.contains(ControlFlags::SELF_RELATIVE) {
                diagnostics.warning_at(
                    DiagnosticCategory::Descriptor,
                    2,
                    "SELF_RELATIVE flag is not set, offsets are interpreted as self-relative",
                );
            }

            for (name, field, offset) in [
                ("owner", 4, owner_offset),
                ("group", 8, group_offset),
                ("SACL", 12, sacl_offset),
                ("DACL", 16, dacl_offset),
            ] {
                if offset != 0 && offset < SD_HEADER_SIZE {
                    diagnostics.warning_at(
                        DiagnosticCategory::Descriptor,
                        field,
                        format!("{} offset {} points into the descriptor header", name, offset),
                    );
                }
            }
        }

        let owner = Self::decode_sid(&parser, owner_offset)?;
        let group = Self::decode_sid(&parser, group_offset)?;

        let sacl = Self::decode_acl(
            &parser,
            "SACL",
            control.contains(ControlFlags::SACL_PRESENT),
            sacl_offset,
            config,
            &mut diagnostics,
        )?;
        let dacl = Self::decode_acl(
            &parser,
            "DACL",
            control.contains(ControlFlags::DACL_PRESENT),
            dacl_offset,
            config,
            &mut diagnostics,
        )?;

        if config.check_canonical_order {
            if let Some(dacl) = &dacl {
                if !dacl.is_canonical() {
                    diagnostics.warning_at(
                        DiagnosticCategory::Acl,
                        dacl_offset,
                        "DACL entries are not in canonical order",
                    );
                }
            }
        }

        log::debug!(
            "decoded security descriptor: control {:#06x}, owner {}, group {}, sacl {}, dacl {}",
            control.bits(),
            owner.is_some(),
            group.is_some(),
            sacl.as_ref().map_or(0, AccessControlList::len),
            dacl.as_ref().map_or(0, AccessControlList::len),
        );

        Ok(Decoded::new(
            SecurityDescriptor {
                revision,
                resource_manager_control,
                control,
                owner,
                group,
                sacl,
                dacl,
            },
            diagnostics,
        ))
    }

    fn decode_sid(parser: &Parser, offset: usize) -> Result<Option<SecurityIdentifier>> {
        if offset == 0 {
            return Ok(None);
        }

        let mut sid_parser = *parser;
        sid_parser.seek(offset)?;
        SecurityIdentifier::decode(&mut sid_parser).map(Some)
    }

    fn decode_acl(
        parser: &Parser,
        name: &str,
        present: bool,
        offset: usize,
        config: &DecoderConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<AccessControlList>> {
        match (present, offset) {
            (false, 0) => return Ok(None),
            (true, 0) => {
                if config.report_control_mismatches {
                    let message = format!("{}_PRESENT is set but the {} offset is 0", name, name);
                    // Directory reads without audit rights drop the SACL but keep the flag
                    if name == "SACL" {
                        diagnostics.info_at(DiagnosticCategory::Descriptor, 2, message);
                    } else {
                        diagnostics.warning_at(DiagnosticCategory::Descriptor, 2, message);
                    }
                }
                return Ok(None);
            }
            (false, _) => {
                if config.report_control_mismatches {
                    diagnostics.warning_at(
                        DiagnosticCategory::Descriptor,
                        offset,
                        format!(
                            "{} found at offset {} although {}_PRESENT is not set",
                            name, offset, name
                        ),
                    );
                }
            }
            (true, _) => {}
        }

        let mut acl_parser = *parser;
        acl_parser.seek(offset)?;
        AccessControlList::decode(&mut acl_parser, config, diagnostics).map(Some)
    }

    /// Number of bytes the descriptor occupies when encoded.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        SD_HEADER_SIZE
            + self.sacl.as_ref().map_or(0, AccessControlList::encoded_len)
            + self.dacl.as_ref().map_or(0, AccessControlList::encoded_len)
            + self.owner.as_ref().map_or(0, SecurityIdentifier::encoded_len)
            + self.group.as_ref().map_or(0, SecurityIdentifier::encoded_len)
    }

    /// Encodes the descriptor in self-relative form.
    ///
    /// Parts are laid out as header, SACL, DACL, owner, group. Control flags are written as
    /// stored; they are not adjusted to the parts that are present.
    ///
    /// # Errors
    /// - [`crate::Error::Malformed`] if an ACL or entry exceeds the 16-bit size fields
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::SecurityDescriptor;
    ///
    /// let blob = [
    ///     0x01, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
    ///     0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00,
    /// ];
    /// let descriptor = SecurityDescriptor::decode(&blob)?.value;
    /// assert_eq!(descriptor.to_bytes()?, blob);
    /// # Ok::<(), sdscope::Error>(())
    /// ```
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.encoded_len()];

        let mut cursor = SD_HEADER_SIZE;
        let sacl_offset = Self::place(&self.sacl, AccessControlList::encoded_len, &mut cursor)?;
        let dacl_offset = Self::place(&self.dacl, AccessControlList::encoded_len, &mut cursor)?;
        let owner_offset = Self::place(&self.owner, SecurityIdentifier::encoded_len, &mut cursor)?;
        let group_offset = Self::place(&self.group, SecurityIdentifier::encoded_len, &mut cursor)?;

        let mut offset = 0;
        write_le_at(&mut buffer, &mut offset, self.revision)?;
        write_le_at(&mut buffer, &mut offset, self.resource_manager_control)?;
        write_le_at(&mut buffer, &mut offset, self.control.bits())?;
        write_le_at(&mut buffer, &mut offset, owner_offset)?;
        write_le_at(&mut buffer, &mut offset, group_offset)?;
        write_le_at(&mut buffer, &mut offset, sacl_offset)?;
        write_le_at(&mut buffer, &mut offset, dacl_offset)?;

        if let Some(sacl) = &self.sacl {
            sacl.write_to(&mut buffer, &mut offset)?;
        }
        if let Some(dacl) = &self.dacl {
            dacl.write_to(&mut buffer, &mut offset)?;
        }
        if let Some(owner) = &self.owner {
            owner.write_to(&mut buffer, &mut offset)?;
        }
        if let Some(group) = &self.group {
            group.write_to(&mut buffer, &mut offset)?;
        }

        Ok(buffer)
    }

    fn place<T>(part: &Option<T>, len: fn(&T) -> usize, cursor: &mut usize) -> Result<u32> {
        let Some(part) = part else {
            return Ok(0);
        };

        let offset = u32::try_from(*cursor)
            .map_err(|_| malformed_error!("descriptor offset {} exceeds 32 bits", cursor))?;
        *cursor += len(part);
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::DiagnosticSeverity,
        test::builders::{ace_bytes, acl_bytes, sid_bytes, DescriptorBuilder},
    };

    fn admins() -> Vec<u8> {
        sid_bytes(5, &[32, 544])
    }

    fn full_descriptor() -> Vec<u8> {
        let dacl = acl_bytes(
            2,
            &[
                ace_bytes(0x00, 0x00, 0x000F_01FF, &admins()),
                ace_bytes(0x00, 0x12, 0x0002_0094, &sid_bytes(5, &[11])),
            ],
        );
        let sacl = acl_bytes(2, &[ace_bytes(0x02, 0xC0, 0x000F_01FF, &sid_bytes(1, &[0]))]);

        DescriptorBuilder::new()
            .with_control(0x8014)
            .with_owner(admins())
            .with_group(sid_bytes(5, &[18]))
            .with_sacl(sacl)
            .with_dacl(dacl)
            .build()
    }

    #[test]
    fn decode_full() {
        let data = full_descriptor();
        let decoded = SecurityDescriptor::decode(&data).unwrap();
        let sd = &decoded.value;

        assert_eq!(sd.revision, 1);
        assert_eq!(sd.owner.as_ref().unwrap().to_string(), "S-1-5-32-544");
        assert_eq!(sd.group.as_ref().unwrap().to_string(), "S-1-5-18");
        assert_eq!(sd.dacl.as_ref().unwrap().len(), 2);
        assert_eq!(sd.sacl.as_ref().unwrap().len(), 1);

        // The audit entry is kept opaque and noted
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Info);

        assert_eq!(sd.encoded_len(), data.len());
        assert_eq!(sd.to_bytes().unwrap(), data);
    }

    #[test]
    fn idempotent() {
        let data = full_descriptor();
        assert_eq!(
            SecurityDescriptor::decode(&data).unwrap(),
            SecurityDescriptor::decode(&data).unwrap()
        );
    }

    #[test]
    fn dacl_present_without_offset() {
        let data = DescriptorBuilder::new().with_control(0x8004).build();
        let decoded = SecurityDescriptor::decode(&data).unwrap();

        assert!(decoded.value.dacl.is_none());
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(decoded.diagnostics[0].category, DiagnosticCategory::Descriptor);
    }

    #[test]
    fn sacl_present_without_offset_is_info() {
        let data = DescriptorBuilder::new()
            .with_control(0x8014)
            .with_dacl(acl_bytes(2, &[]))
            .build();
        let decoded = SecurityDescriptor::decode(&data).unwrap();

        assert!(decoded.value.sacl.is_none());
        assert!(decoded.value.dacl.is_some());
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Info);
        assert!(!decoded.has_warnings());
    }

    #[test]
    fn dacl_without_flag_is_still_decoded() {
        let data = DescriptorBuilder::new()
            .with_control(0x8000)
            .with_dacl(acl_bytes(2, &[ace_bytes(0x00, 0x00, 0x10, &admins())]))
            .build();
        let decoded = SecurityDescriptor::decode(&data).unwrap();

        assert_eq!(decoded.value.dacl.as_ref().unwrap().len(), 1);
        assert!(decoded.has_warnings());
    }

    #[test]
    fn lenient_records_nothing() {
        let data = DescriptorBuilder::new().with_control(0x0014).build();
        let decoded = SecurityDescriptor::decode_with(&data, &DecoderConfig::lenient()).unwrap();
        assert!(decoded.diagnostics.is_empty());

        let decoded = SecurityDescriptor::decode(&data).unwrap();
        // Missing SELF_RELATIVE, DACL and SACL mismatches
        assert_eq!(decoded.diagnostics.len(), 3);
    }

    #[test]
    fn header_errors() {
        assert_eq!(SecurityDescriptor::decode(&[]), Err(Error::Empty));

        let mut data = DescriptorBuilder::new().build();
        data[0] = 2;
        assert_eq!(
            SecurityDescriptor::decode(&data),
            Err(Error::UnsupportedRevision {
                structure: "security descriptor",
                revision: 2,
                offset: 0
            })
        );

        assert!(matches!(
            SecurityDescriptor::decode(&[0x01, 0x00, 0x04]),
            Err(Error::Truncated { offset: 2, needed: 2, available: 1 })
        ));
    }

    #[test]
    fn offset_past_end() {
        let mut data = DescriptorBuilder::new().build();
        data[4..8].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            SecurityDescriptor::decode(&data),
            Err(Error::Truncated { offset: 100, .. })
        ));
    }

    #[test]
    fn group_offset_into_header() {
        let mut data = DescriptorBuilder::new().with_owner(admins()).build();
        // The owner offset field reads as SID revision 0x14
        data[8..12].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(
            SecurityDescriptor::decode(&data),
            Err(Error::InvalidSid { offset: 4, .. })
        ));
    }

    #[test]
    fn non_canonical_dacl_warns() {
        let dacl = acl_bytes(
            2,
            &[
                ace_bytes(0x00, 0x00, 0x10, &admins()),
                ace_bytes(0x01, 0x00, 0x20, &admins()),
            ],
        );
        let data = DescriptorBuilder::new()
            .with_control(0x8004)
            .with_dacl(dacl)
            .build();

        let decoded = SecurityDescriptor::decode(&data).unwrap();
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].category, DiagnosticCategory::Acl);

        let decoded = SecurityDescriptor::decode_with(&data, &DecoderConfig::lenient()).unwrap();
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn acl_errors_propagate() {
        let mut dacl = acl_bytes(2, &[ace_bytes(0x00, 0x00, 0x10, &admins())]);
        dacl[4] = 3;
        let data = DescriptorBuilder::new()
            .with_control(0x8004)
            .with_dacl(dacl)
            .build();

        assert!(matches!(
            SecurityDescriptor::decode(&data),
            Err(Error::AclSizeMismatch { offset: 20, .. })
        ));
    }
}
