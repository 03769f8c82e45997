//! Translation of an access mask into named capabilities.
//!
//! [`interpret`] is a pure function of the mask and the optional object-type GUID of an
//! object ACE. Generic bits are reported as themselves and additionally expanded through the
//! directory generic mapping, so `GENERIC_ALL` yields both "Generic All" and every right it
//! implies. Rights that an object ACE narrows to a single GUID are reported together with the
//! resolved name, or with the raw GUID and a warning when the GUID is not known.
//!
//! # Examples
//!
//! ```rust
//! use sdscope::rights::interpret;
//! use sdscope::AccessMask;
//! use uguid::guid;
//!
//! let replication = guid!("1131f6aa-9c07-11d1-f79f-00c04fc2dcd2");
//! let decoded = interpret(AccessMask::CONTROL_ACCESS, Some(&replication));
//!
//! assert_eq!(decoded.value.names(), ["Extended Right: DS-Replication-Get-Changes"]);
//! assert!(decoded.value.is_dangerous());
//! assert!(decoded.diagnostics.is_empty());
//! ```

use std::fmt;

use strum::IntoEnumIterator;
use uguid::Guid;

use crate::{
    diagnostics::{Decoded, DiagnosticCategory, Diagnostics},
    rights::{
        mask::{AccessMask, AccessRight},
        objecttypes::{lookup, ObjectType},
    },
};

/// One named capability granted or denied by a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A right that applies to the whole object
    Right(AccessRight),
    /// A right narrowed to a known object type
    Named {
        /// The right being narrowed
        right: AccessRight,
        /// The object type it is narrowed to
        object: &'static ObjectType,
    },
    /// A right narrowed to an object type that is not in the static table
    Unrecognized {
        /// The right being narrowed
        right: AccessRight,
        /// The raw object-type GUID
        guid: Guid,
    },
}

impl Capability {
    /// The underlying access right.
    #[must_use]
    pub fn right(&self) -> AccessRight {
        match self {
            Capability::Right(right)
            | Capability::Named { right, .. }
            | Capability::Unrecognized { right, .. } => *right,
        }
    }

    /// Returns `true` if this capability names a sensitive object type.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Capability::Named { object, .. } if object.sensitive)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Right(right) => write!(f, "{}", right),
            Capability::Named { right, object } => write!(f, "{}: {}", right, object.name),
            Capability::Unrecognized { right, guid } => write!(f, "{}: {{{}}}", right, guid),
        }
    }
}

/// The interpreted form of an access mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskInterpretation {
    /// The mask as found in the ACE
    pub mask: AccessMask,
    /// The mask after generic bits were mapped to directory rights
    pub effective: AccessMask,
    /// Named capabilities in mask bit order
    pub capabilities: Vec<Capability>,
}

impl MaskInterpretation {
    /// Returns `true` if the mask grants rights that allow taking over the object.
    ///
    /// Covers generic all and generic write, write DAC, write owner, write property,
    /// validated writes and extended rights.
    #[must_use]
    pub fn is_dangerous(&self) -> bool {
        self.mask.is_dangerous() || self.effective.is_dangerous()
    }

    /// Returns `true` if `right` is contained in the effective mask.
    #[must_use]
    pub fn grants(&self, right: AccessRight) -> bool {
        self.effective.contains(right.bit()) || self.mask.contains(right.bit())
    }

    /// Display names of all capabilities, e.g. `"Write DACL"` or `"Extended Right: Send-As"`.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.capabilities.iter().map(ToString::to_string).collect()
    }

    /// Capabilities narrowed to a sensitive object type.
    pub fn sensitive(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(|c| c.is_sensitive())
    }
}

/// Interprets `mask`, optionally narrowed by the object-type GUID of an object ACE.
///
/// An all-zero GUID is treated as absent. Unrecognized GUIDs produce a warning in the
/// returned diagnostics and are kept in raw form.
#[must_use]
pub fn interpret(mask: AccessMask, object_type: Option<&Guid>) -> Decoded<MaskInterpretation> {
    let mut diagnostics = Diagnostics::new();
    let effective = mask.expand_generic();
    let object_type = object_type.filter(|guid| **guid != Guid::ZERO);
    let resolved = object_type.map(|guid| (guid, lookup(guid)));

    let mut capabilities = Vec::new();
    let mut unrecognized = false;
    for right in AccessRight::iter() {
        if !mask.contains(right.bit()) && !effective.contains(right.bit()) {
            continue;
        }

        let narrowed = AccessMask::OBJECT_SPECIFIC.contains(right.bit());
        let capability = match resolved {
            Some((_, Some(object))) if narrowed => Capability::Named { right, object },
            Some((guid, None)) if narrowed => {
                unrecognized = true;
                Capability::Unrecognized { right, guid: *guid }
            }
            _ => Capability::Right(right),
        };
        capabilities.push(capability);
    }

    if unrecognized {
        if let Some(guid) = object_type {
            diagnostics.warning(
                DiagnosticCategory::AccessMask,
                format!("unrecognized object type {{{}}} in mask {:#010x}", guid, mask.bits()),
            );
        }
    }

    let unknown = mask.unknown_bits();
    if unknown != 0 {
        diagnostics.info(
            DiagnosticCategory::AccessMask,
            format!("mask {:#010x} carries undefined bits {:#010x}", mask.bits(), unknown),
        );
    }

    Decoded::new(
        MaskInterpretation {
            mask,
            effective,
            capabilities,
        },
        diagnostics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSeverity;
    use uguid::guid;

    #[test]
    fn full_control() {
        let decoded = interpret(AccessMask::from_bits_retain(0x000F_01FF), None);
        let value = decoded.value;

        assert!(value.grants(AccessRight::WriteDac));
        assert!(value.grants(AccessRight::WriteOwner));
        assert!(value.is_dangerous());
        assert_eq!(value.capabilities.len(), 13);
        assert_eq!(
            value.capabilities.first(),
            Some(&Capability::Right(AccessRight::CreateChild))
        );
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn generic_read_expands() {
        let value = interpret(AccessMask::GENERIC_READ, None).value;
        assert_eq!(
            value.names(),
            [
                "List Contents",
                "Read Property",
                "List Object",
                "Read Control",
                "Generic Read"
            ]
        );
        assert!(!value.is_dangerous());
    }

    #[test]
    fn generic_all_is_dangerous() {
        let value = interpret(AccessMask::GENERIC_ALL, None).value;
        assert!(value.grants(AccessRight::WriteDac));
        assert!(value.grants(AccessRight::GenericAll));
        assert!(value.is_dangerous());
    }

    #[test]
    fn named_property_write() {
        let rbcd = guid!("3f78c3e5-f79a-46bd-a0b8-9d18116ddc79");
        let decoded = interpret(
            AccessMask::WRITE_PROPERTY | AccessMask::READ_CONTROL,
            Some(&rbcd),
        );

        assert_eq!(
            decoded.value.names(),
            [
                "Write Property: msDS-AllowedToActOnBehalfOfOtherIdentity",
                "Read Control"
            ]
        );
        assert_eq!(decoded.value.sensitive().count(), 1);
    }

    #[test]
    fn unrecognized_guid_is_kept() {
        let unknown = guid!("01234567-89ab-cdef-0123-456789abcdef");
        let decoded = interpret(AccessMask::CONTROL_ACCESS, Some(&unknown));

        assert_eq!(
            decoded.value.capabilities,
            [Capability::Unrecognized {
                right: AccessRight::ControlAccess,
                guid: unknown
            }]
        );
        assert_eq!(decoded.diagnostics.len(), 1);
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(
            decoded.value.names(),
            ["Extended Right: {01234567-89ab-cdef-0123-456789abcdef}"]
        );
    }

    #[test]
    fn zero_guid_means_all() {
        let decoded = interpret(AccessMask::READ_PROPERTY, Some(&Guid::ZERO));
        assert_eq!(
            decoded.value.capabilities,
            [Capability::Right(AccessRight::ReadProperty)]
        );
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn undefined_bits_reported() {
        let decoded = interpret(AccessMask::from_bits_retain(0x0000_0200), None);
        assert!(decoded.value.capabilities.is_empty());
        assert_eq!(decoded.diagnostics[0].severity, DiagnosticSeverity::Info);
    }
}
