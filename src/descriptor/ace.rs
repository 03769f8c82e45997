//! Access control entries.
//!
//! Every ACE starts with a 4-byte header:
//!
//! | Offset | Size | Field                              |
//! |--------|------|------------------------------------|
//! | 0      | 1    | Type                               |
//! | 1      | 1    | Flags ([`AceFlags`])               |
//! | 2      | 2    | Size of the whole entry, LE        |
//!
//! Basic entries (`ACCESS_ALLOWED`, `ACCESS_DENIED`) continue with a 4-byte mask and the
//! trustee SID. Object entries (`ACCESS_ALLOWED_OBJECT`, `ACCESS_DENIED_OBJECT`) insert a
//! 4-byte presence field ([`ObjectAceFlags`]) and up to two GUIDs between mask and SID.
//! All other types are kept as [`OpaqueAce`] with their raw body, so a caller always sees
//! that an entry exists even if this crate does not interpret it.
//!
//! The bytes consumed by the decoded fields must equal the declared size exactly; anything
//! else is reported as [`crate::Error::AceSizeMismatch`].

use bitflags::bitflags;
use uguid::Guid;

use crate::{
    config::DecoderConfig,
    descriptor::SecurityIdentifier,
    diagnostics::{DiagnosticCategory, Diagnostics},
    reader::{
        io::{write_bytes_at, write_le_at},
        Parser,
    },
    rights::AccessMask,
    Error, Result,
};

/// Size of the common ACE header
pub const ACE_HEADER_SIZE: usize = 4;

/// The type byte of an ACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AceType {
    /// `ACCESS_ALLOWED_ACE_TYPE`
    AccessAllowed,
    /// `ACCESS_DENIED_ACE_TYPE`
    AccessDenied,
    /// `SYSTEM_AUDIT_ACE_TYPE`
    SystemAudit,
    /// `SYSTEM_ALARM_ACE_TYPE`
    SystemAlarm,
    /// `ACCESS_ALLOWED_COMPOUND_ACE_TYPE`
    AccessAllowedCompound,
    /// `ACCESS_ALLOWED_OBJECT_ACE_TYPE`
    AccessAllowedObject,
    /// `ACCESS_DENIED_OBJECT_ACE_TYPE`
    AccessDeniedObject,
    /// `SYSTEM_AUDIT_OBJECT_ACE_TYPE`
    SystemAuditObject,
    /// `SYSTEM_ALARM_OBJECT_ACE_TYPE`
    SystemAlarmObject,
    /// `ACCESS_ALLOWED_CALLBACK_ACE_TYPE`
    AccessAllowedCallback,
    /// `ACCESS_DENIED_CALLBACK_ACE_TYPE`
    AccessDeniedCallback,
    /// `ACCESS_ALLOWED_CALLBACK_OBJECT_ACE_TYPE`
    AccessAllowedCallbackObject,
    /// `ACCESS_DENIED_CALLBACK_OBJECT_ACE_TYPE`
    AccessDeniedCallbackObject,
    /// `SYSTEM_AUDIT_CALLBACK_ACE_TYPE`
    SystemAuditCallback,
    /// `SYSTEM_ALARM_CALLBACK_ACE_TYPE`
    SystemAlarmCallback,
    /// `SYSTEM_AUDIT_CALLBACK_OBJECT_ACE_TYPE`
    SystemAuditCallbackObject,
    /// `SYSTEM_ALARM_CALLBACK_OBJECT_ACE_TYPE`
    SystemAlarmCallbackObject,
    /// `SYSTEM_MANDATORY_LABEL_ACE_TYPE`
    SystemMandatoryLabel,
    /// `SYSTEM_RESOURCE_ATTRIBUTE_ACE_TYPE`
    SystemResourceAttribute,
    /// `SYSTEM_SCOPED_POLICY_ID_ACE_TYPE`
    SystemScopedPolicyId,
    /// A type byte without a defined meaning
    Unknown(u8),
}

impl From<u8> for AceType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AceType::AccessAllowed,
            0x01 => AceType::AccessDenied,
            0x02 => AceType::SystemAudit,
            0x03 => AceType::SystemAlarm,
            0x04 => AceType::AccessAllowedCompound,
            0x05 => AceType::AccessAllowedObject,
            0x06 => AceType::AccessDeniedObject,
            0x07 => AceType::SystemAuditObject,
            0x08 => AceType::SystemAlarmObject,
            0x09 => AceType::AccessAllowedCallback,
            0x0A => AceType::AccessDeniedCallback,
            0x0B => AceType::AccessAllowedCallbackObject,
            0x0C => AceType::AccessDeniedCallbackObject,
            0x0D => AceType::SystemAuditCallback,
            0x0E => AceType::SystemAlarmCallback,
            0x0F => AceType::SystemAuditCallbackObject,
            0x10 => AceType::SystemAlarmCallbackObject,
            0x11 => AceType::SystemMandatoryLabel,
            0x12 => AceType::SystemResourceAttribute,
            0x13 => AceType::SystemScopedPolicyId,
            _ => AceType::Unknown(value),
        }
    }
}

impl From<AceType> for u8 {
    fn from(value: AceType) -> Self {
        match value {
            AceType::AccessAllowed => 0x00,
            AceType::AccessDenied => 0x01,
            AceType::SystemAudit => 0x02,
            AceType::SystemAlarm => 0x03,
            AceType::AccessAllowedCompound => 0x04,
            AceType::AccessAllowedObject => 0x05,
            AceType::AccessDeniedObject => 0x06,
            AceType::SystemAuditObject => 0x07,
            AceType::SystemAlarmObject => 0x08,
            AceType::AccessAllowedCallback => 0x09,
            AceType::AccessDeniedCallback => 0x0A,
            AceType::AccessAllowedCallbackObject => 0x0B,
            AceType::AccessDeniedCallbackObject => 0x0C,
            AceType::SystemAuditCallback => 0x0D,
            AceType::SystemAlarmCallback => 0x0E,
            AceType::SystemAuditCallbackObject => 0x0F,
            AceType::SystemAlarmCallbackObject => 0x10,
            AceType::SystemMandatoryLabel => 0x11,
            AceType::SystemResourceAttribute => 0x12,
            AceType::SystemScopedPolicyId => 0x13,
            AceType::Unknown(raw) => raw,
        }
    }
}

impl AceType {
    /// Returns `true` for types whose layout carries object-type GUIDs.
    #[must_use]
    pub fn is_object(self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedObject
                | AceType::AccessDeniedObject
                | AceType::SystemAuditObject
                | AceType::SystemAlarmObject
                | AceType::AccessAllowedCallbackObject
                | AceType::AccessDeniedCallbackObject
                | AceType::SystemAuditCallbackObject
                | AceType::SystemAlarmCallbackObject
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Inheritance and audit flags of an ACE
    pub struct AceFlags: u8 {
        /// Non-container child objects inherit the entry
        const OBJECT_INHERIT = 0x01;
        /// Container child objects inherit the entry
        const CONTAINER_INHERIT = 0x02;
        /// Inherited copies do not propagate further
        const NO_PROPAGATE_INHERIT = 0x04;
        /// The entry only affects children, not the object it is attached to
        const INHERIT_ONLY = 0x08;
        /// The entry was inherited from a parent
        const INHERITED = 0x10;
        /// Audit successful access (SACL entries)
        const SUCCESSFUL_ACCESS = 0x40;
        /// Audit failed access (SACL entries)
        const FAILED_ACCESS = 0x80;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Presence flags of the optional GUIDs in an object ACE
    pub struct ObjectAceFlags: u32 {
        /// The object-type GUID is present
        const OBJECT_TYPE_PRESENT = 0x0000_0001;
        /// The inherited-object-type GUID is present
        const INHERITED_OBJECT_TYPE_PRESENT = 0x0000_0002;
    }
}

/// Body of an `ACCESS_ALLOWED` or `ACCESS_DENIED` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAce {
    /// Inheritance flags
    pub flags: AceFlags,
    /// Rights granted or denied
    pub mask: AccessMask,
    /// The trustee the entry applies to
    pub trustee: SecurityIdentifier,
}

/// Body of an `ACCESS_ALLOWED_OBJECT` or `ACCESS_DENIED_OBJECT` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAce {
    /// Inheritance flags
    pub flags: AceFlags,
    /// Rights granted or denied
    pub mask: AccessMask,
    /// Property, property set, extended right, validated write or class the mask applies to
    pub object_type: Option<Guid>,
    /// Class of child objects that inherit the entry
    pub inherited_object_type: Option<Guid>,
    /// The trustee the entry applies to
    pub trustee: SecurityIdentifier,
    /// Presence field bits other than the two defined flags, kept for re-encoding
    pub reserved_flags: u32,
}

impl ObjectAce {
    /// The presence field as written on the wire.
    #[must_use]
    pub fn object_flags(&self) -> ObjectAceFlags {
        let mut flags =
            ObjectAceFlags::from_bits_retain(self.reserved_flags & !ObjectAceFlags::all().bits());
        if self.object_type.is_some() {
            flags |= ObjectAceFlags::OBJECT_TYPE_PRESENT;
        }
        if self.inherited_object_type.is_some() {
            flags |= ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT;
        }
        flags
    }
}

/// An entry of a type this crate does not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueAce {
    /// The raw type byte
    pub ace_type: AceType,
    /// Flags from the header
    pub flags: AceFlags,
    /// Size from the header, including the header
    pub declared_size: u16,
    /// Everything after the header
    pub body: Vec<u8>,
}

/// A decoded access control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessControlEntry {
    /// `ACCESS_ALLOWED_ACE`
    Allowed(BasicAce),
    /// `ACCESS_DENIED_ACE`
    Denied(BasicAce),
    /// `ACCESS_ALLOWED_OBJECT_ACE`
    AllowedObject(ObjectAce),
    /// `ACCESS_DENIED_OBJECT_ACE`
    DeniedObject(ObjectAce),
    /// Any other type, kept undecoded
    Opaque(OpaqueAce),
}

impl AccessControlEntry {
    /// Decodes one ACE at the current position of `parser` and advances past it.
    ///
    /// The entry must fit into the readable window of `parser`; an ACL decoder restricts that
    /// window to the ACL before calling this.
    ///
    /// # Errors
    /// - [`crate::Error::AceSizeMismatch`] if the declared size is below 4 or disagrees with
    ///   the decoded fields
    /// - [`crate::Error::Truncated`] if the declared size runs past the readable window
    /// - [`crate::Error::InvalidSid`] if the trustee SID is invalid
    pub fn decode(
        parser: &mut Parser,
        config: &DecoderConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let start = parser.pos();

        let ace_type = AceType::from(parser.read_le::<u8>()?);
        let flags = AceFlags::from_bits_retain(parser.read_le::<u8>()?);
        let declared_size = parser.read_le::<u16>()?;
        let declared = usize::from(declared_size);

        if declared < ACE_HEADER_SIZE {
            return Err(Error::AceSizeMismatch {
                offset: start,
                declared,
                consumed: ACE_HEADER_SIZE,
            });
        }

        let mut body = parser.limit(declared - ACE_HEADER_SIZE)?;
        let entry = match ace_type {
            AceType::AccessAllowed => Self::decode_basic(&mut body, flags).map(Self::Allowed),
            AceType::AccessDenied => Self::decode_basic(&mut body, flags).map(Self::Denied),
            AceType::AccessAllowedObject => {
                Self::decode_object(&mut body, flags).map(Self::AllowedObject)
            }
            AceType::AccessDeniedObject => {
                Self::decode_object(&mut body, flags).map(Self::DeniedObject)
            }
            _ => {
                if config.report_opaque_entries {
                    let message = format!(
                        "{:?} entry (type {:#04x}) kept undecoded",
                        ace_type,
                        u8::from(ace_type)
                    );
                    match ace_type {
                        AceType::Unknown(_) => {
                            diagnostics.warning_at(DiagnosticCategory::Ace, start, message);
                        }
                        _ => diagnostics.info_at(DiagnosticCategory::Ace, start, message),
                    }
                }

                body.read_bytes(body.remaining()).map(|raw| {
                    Self::Opaque(OpaqueAce {
                        ace_type,
                        flags,
                        declared_size,
                        body: raw.to_vec(),
                    })
                })
            }
        }
        .map_err(|error| Self::body_error(error, start, declared))?;

        if body.has_more_data() {
            return Err(Error::AceSizeMismatch {
                offset: start,
                declared,
                consumed: body.pos() - start,
            });
        }

        parser.advance_by(declared - ACE_HEADER_SIZE)?;
        Ok(entry)
    }

    /// A read past the declared size means the body is larger than the header claims.
    fn body_error(error: Error, start: usize, declared: usize) -> Error {
        match error {
            Error::Truncated { offset, needed, .. } => Error::AceSizeMismatch {
                offset: start,
                declared,
                consumed: offset + needed - start,
            },
            other => other,
        }
    }

    fn decode_basic(body: &mut Parser, flags: AceFlags) -> Result<BasicAce> {
        let mask = AccessMask::from_bits_retain(body.read_le::<u32>()?);
        let trustee = SecurityIdentifier::decode(body)?;

        Ok(BasicAce {
            flags,
            mask,
            trustee,
        })
    }

    fn decode_object(body: &mut Parser, flags: AceFlags) -> Result<ObjectAce> {
        let mask = AccessMask::from_bits_retain(body.read_le::<u32>()?);
        let object_flags = ObjectAceFlags::from_bits_retain(body.read_le::<u32>()?);

        let object_type = if object_flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
            Some(body.read_guid()?)
        } else {
            None
        };
        let inherited_object_type =
            if object_flags.contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT) {
                Some(body.read_guid()?)
            } else {
                None
            };
        let trustee = SecurityIdentifier::decode(body)?;

        Ok(ObjectAce {
            flags,
            mask,
            object_type,
            inherited_object_type,
            trustee,
            reserved_flags: object_flags.bits() & !ObjectAceFlags::all().bits(),
        })
    }

    /// The type of this entry.
    #[must_use]
    pub fn ace_type(&self) -> AceType {
        match self {
            Self::Allowed(_) => AceType::AccessAllowed,
            Self::Denied(_) => AceType::AccessDenied,
            Self::AllowedObject(_) => AceType::AccessAllowedObject,
            Self::DeniedObject(_) => AceType::AccessDeniedObject,
            Self::Opaque(ace) => ace.ace_type,
        }
    }

    /// The header flags.
    #[must_use]
    pub fn flags(&self) -> AceFlags {
        match self {
            Self::Allowed(ace) | Self::Denied(ace) => ace.flags,
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => ace.flags,
            Self::Opaque(ace) => ace.flags,
        }
    }

    /// The access mask, `None` for opaque entries.
    #[must_use]
    pub fn mask(&self) -> Option<AccessMask> {
        match self {
            Self::Allowed(ace) | Self::Denied(ace) => Some(ace.mask),
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => Some(ace.mask),
            Self::Opaque(_) => None,
        }
    }

    /// The trustee SID, `None` for opaque entries.
    #[must_use]
    pub fn trustee(&self) -> Option<&SecurityIdentifier> {
        match self {
            Self::Allowed(ace) | Self::Denied(ace) => Some(&ace.trustee),
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => Some(&ace.trustee),
            Self::Opaque(_) => None,
        }
    }

    /// The object-type GUID of an object entry.
    #[must_use]
    pub fn object_type(&self) -> Option<&Guid> {
        match self {
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => ace.object_type.as_ref(),
            _ => None,
        }
    }

    /// The inherited-object-type GUID of an object entry.
    #[must_use]
    pub fn inherited_object_type(&self) -> Option<&Guid> {
        match self {
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => {
                ace.inherited_object_type.as_ref()
            }
            _ => None,
        }
    }

    /// Returns `true` for `Allowed` and `AllowedObject` entries.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allowed(_) | Self::AllowedObject(_))
    }

    /// Returns `true` for `Denied` and `DeniedObject` entries.
    #[must_use]
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Denied(_) | Self::DeniedObject(_))
    }

    /// Returns `true` if the entry was inherited from a parent object.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.flags().contains(AceFlags::INHERITED)
    }

    /// Returns `true` if the entry does not apply to the object it is attached to.
    #[must_use]
    pub fn is_inherit_only(&self) -> bool {
        self.flags().contains(AceFlags::INHERIT_ONLY)
    }

    /// Number of bytes the entry occupies when encoded.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Allowed(ace) | Self::Denied(ace) => {
                ACE_HEADER_SIZE + 4 + ace.trustee.encoded_len()
            }
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => {
                let guids = usize::from(ace.object_type.is_some())
                    + usize::from(ace.inherited_object_type.is_some());
                ACE_HEADER_SIZE + 8 + 16 * guids + ace.trustee.encoded_len()
            }
            Self::Opaque(ace) => ACE_HEADER_SIZE + ace.body.len(),
        }
    }

    /// Writes the entry into `data` at `offset` and advances the offset.
    ///
    /// The size field is recomputed from the fields.
    ///
    /// # Errors
    /// - [`crate::Error::Truncated`] if `data` is too small
    /// - [`crate::Error::Malformed`] if the entry is larger than 65535 bytes
    pub fn write_to(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        let size = u16::try_from(self.encoded_len())
            .map_err(|_| malformed_error!("ACE of {} bytes exceeds 65535", self.encoded_len()))?;

        write_le_at(data, offset, u8::from(self.ace_type()))?;
        write_le_at(data, offset, self.flags().bits())?;
        write_le_at(data, offset, size)?;

        match self {
            Self::Allowed(ace) | Self::Denied(ace) => {
                write_le_at(data, offset, ace.mask.bits())?;
                ace.trustee.write_to(data, offset)?;
            }
            Self::AllowedObject(ace) | Self::DeniedObject(ace) => {
                write_le_at(data, offset, ace.mask.bits())?;
                write_le_at(data, offset, ace.object_flags().bits())?;
                if let Some(guid) = &ace.object_type {
                    write_bytes_at(data, offset, &guid.to_bytes())?;
                }
                if let Some(guid) = &ace.inherited_object_type {
                    write_bytes_at(data, offset, &guid.to_bytes())?;
                }
                ace.trustee.write_to(data, offset)?;
            }
            Self::Opaque(ace) => {
                write_bytes_at(data, offset, &ace.body)?;
            }
        }

        Ok(())
    }
}
