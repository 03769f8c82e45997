//! Access mask bits and their named rights.
//!
//! The 32-bit mask of an ACE is split into four groups:
//!
//! - **Object-specific** (bits 0-15): for directory objects these are the `ADS_RIGHT_DS_*`
//!   rights such as create child, read property or control access
//! - **Standard** (bits 16-20): delete, read control, write DAC, write owner, synchronize
//! - **Special** (bits 24-25): access system security, maximum allowed
//! - **Generic** (bits 28-31): expanded into object-specific and standard rights by the
//!   object's generic mapping
//!
//! [`AccessMask`] is the raw bit set; [`AccessRight`] enumerates the individual rights with
//! display names for reporting.

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// A 32-bit access mask
    ///
    /// Bits without a name are retained so masks survive a decode/encode cycle unchanged.
    pub struct AccessMask: u32 {
        /// Create child objects, optionally limited to one class
        const CREATE_CHILD = 0x0000_0001;
        /// Delete child objects, optionally limited to one class
        const DELETE_CHILD = 0x0000_0002;
        /// List the children of the object
        const LIST_CHILDREN = 0x0000_0004;
        /// Validated write, optionally limited to one validated write
        const SELF_WRITE = 0x0000_0008;
        /// Read properties, optionally limited to one property or property set
        const READ_PROPERTY = 0x0000_0010;
        /// Write properties, optionally limited to one property or property set
        const WRITE_PROPERTY = 0x0000_0020;
        /// Delete the object and all of its children
        const DELETE_TREE = 0x0000_0040;
        /// List the object itself
        const LIST_OBJECT = 0x0000_0080;
        /// Extended rights, optionally limited to one extended right
        const CONTROL_ACCESS = 0x0000_0100;
        /// Delete the object
        const DELETE = 0x0001_0000;
        /// Read the security descriptor, excluding the SACL
        const READ_CONTROL = 0x0002_0000;
        /// Modify the DACL
        const WRITE_DAC = 0x0004_0000;
        /// Take ownership
        const WRITE_OWNER = 0x0008_0000;
        /// Use the object for synchronization
        const SYNCHRONIZE = 0x0010_0000;
        /// Read or modify the SACL
        const ACCESS_SYSTEM_SECURITY = 0x0100_0000;
        /// Request the maximum allowed access
        const MAXIMUM_ALLOWED = 0x0200_0000;
        /// All rights
        const GENERIC_ALL = 0x1000_0000;
        /// Execute access
        const GENERIC_EXECUTE = 0x2000_0000;
        /// Write access
        const GENERIC_WRITE = 0x4000_0000;
        /// Read access
        const GENERIC_READ = 0x8000_0000;
    }
}

/// Directory mapping of `GENERIC_READ`
pub const DS_GENERIC_READ: u32 = 0x0002_0094;
/// Directory mapping of `GENERIC_WRITE`
pub const DS_GENERIC_WRITE: u32 = 0x0002_0028;
/// Directory mapping of `GENERIC_EXECUTE`
pub const DS_GENERIC_EXECUTE: u32 = 0x0002_0004;
/// Directory mapping of `GENERIC_ALL`
pub const DS_GENERIC_ALL: u32 = 0x000F_01FF;

impl AccessMask {
    /// Bits that let a trustee take over the object or its security
    pub const DANGEROUS: AccessMask = AccessMask::GENERIC_ALL
        .union(AccessMask::GENERIC_WRITE)
        .union(AccessMask::WRITE_DAC)
        .union(AccessMask::WRITE_OWNER)
        .union(AccessMask::WRITE_PROPERTY)
        .union(AccessMask::SELF_WRITE)
        .union(AccessMask::CONTROL_ACCESS);

    /// Bits that are refined by an object-type GUID in an object ACE
    pub const OBJECT_SPECIFIC: AccessMask = AccessMask::CREATE_CHILD
        .union(AccessMask::DELETE_CHILD)
        .union(AccessMask::SELF_WRITE)
        .union(AccessMask::READ_PROPERTY)
        .union(AccessMask::WRITE_PROPERTY)
        .union(AccessMask::CONTROL_ACCESS);

    /// Replaces the generic bits by their directory-specific equivalents.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::AccessMask;
    ///
    /// let effective = AccessMask::GENERIC_READ.expand_generic();
    /// assert_eq!(effective.bits(), 0x0002_0094);
    /// assert!(effective.contains(AccessMask::READ_PROPERTY | AccessMask::READ_CONTROL));
    /// ```
    #[must_use]
    pub fn expand_generic(self) -> AccessMask {
        let mut bits = self.bits() & !0xF000_0000;

        if self.contains(AccessMask::GENERIC_READ) {
            bits |= DS_GENERIC_READ;
        }
        if self.contains(AccessMask::GENERIC_WRITE) {
            bits |= DS_GENERIC_WRITE;
        }
        if self.contains(AccessMask::GENERIC_EXECUTE) {
            bits |= DS_GENERIC_EXECUTE;
        }
        if self.contains(AccessMask::GENERIC_ALL) {
            bits |= DS_GENERIC_ALL;
        }

        AccessMask::from_bits_retain(bits)
    }

    /// Returns `true` if the mask contains any bit of [`AccessMask::DANGEROUS`].
    #[must_use]
    pub fn is_dangerous(self) -> bool {
        self.intersects(AccessMask::DANGEROUS)
    }

    /// Bits set in the mask that carry no known meaning.
    #[must_use]
    pub fn unknown_bits(self) -> u32 {
        self.bits() & !AccessMask::all().bits()
    }
}

/// An individual access right, in mask bit order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
)]
pub enum AccessRight {
    /// `ADS_RIGHT_DS_CREATE_CHILD`
    #[strum(serialize = "Create Child")]
    CreateChild,
    /// `ADS_RIGHT_DS_DELETE_CHILD`
    #[strum(serialize = "Delete Child")]
    DeleteChild,
    /// `ADS_RIGHT_ACTRL_DS_LIST`
    #[strum(serialize = "List Contents")]
    ListChildren,
    /// `ADS_RIGHT_DS_SELF`
    #[strum(serialize = "Self Write")]
    SelfWrite,
    /// `ADS_RIGHT_DS_READ_PROP`
    #[strum(serialize = "Read Property")]
    ReadProperty,
    /// `ADS_RIGHT_DS_WRITE_PROP`
    #[strum(serialize = "Write Property")]
    WriteProperty,
    /// `ADS_RIGHT_DS_DELETE_TREE`
    #[strum(serialize = "Delete Tree")]
    DeleteTree,
    /// `ADS_RIGHT_DS_LIST_OBJECT`
    #[strum(serialize = "List Object")]
    ListObject,
    /// `ADS_RIGHT_DS_CONTROL_ACCESS`
    #[strum(serialize = "Extended Right")]
    ControlAccess,
    /// `DELETE`
    #[strum(serialize = "Delete")]
    Delete,
    /// `READ_CONTROL`
    #[strum(serialize = "Read Control")]
    ReadControl,
    /// `WRITE_DAC`
    #[strum(serialize = "Write DACL")]
    WriteDac,
    /// `WRITE_OWNER`
    #[strum(serialize = "Write Owner")]
    WriteOwner,
    /// `SYNCHRONIZE`
    #[strum(serialize = "Synchronize")]
    Synchronize,
    /// `ACCESS_SYSTEM_SECURITY`
    #[strum(serialize = "Access System Security")]
    AccessSystemSecurity,
    /// `MAXIMUM_ALLOWED`
    #[strum(serialize = "Maximum Allowed")]
    MaximumAllowed,
    /// `GENERIC_ALL`
    #[strum(serialize = "Generic All")]
    GenericAll,
    /// `GENERIC_EXECUTE`
    #[strum(serialize = "Generic Execute")]
    GenericExecute,
    /// `GENERIC_WRITE`
    #[strum(serialize = "Generic Write")]
    GenericWrite,
    /// `GENERIC_READ`
    #[strum(serialize = "Generic Read")]
    GenericRead,
}

impl AccessRight {
    /// The mask bit of this right.
    #[must_use]
    pub fn bit(self) -> AccessMask {
        match self {
            AccessRight::CreateChild => AccessMask::CREATE_CHILD,
            AccessRight::DeleteChild => AccessMask::DELETE_CHILD,
            AccessRight::ListChildren => AccessMask::LIST_CHILDREN,
            AccessRight::SelfWrite => AccessMask::SELF_WRITE,
            AccessRight::ReadProperty => AccessMask::READ_PROPERTY,
            AccessRight::WriteProperty => AccessMask::WRITE_PROPERTY,
            AccessRight::DeleteTree => AccessMask::DELETE_TREE,
            AccessRight::ListObject => AccessMask::LIST_OBJECT,
            AccessRight::ControlAccess => AccessMask::CONTROL_ACCESS,
            AccessRight::Delete => AccessMask::DELETE,
            AccessRight::ReadControl => AccessMask::READ_CONTROL,
            AccessRight::WriteDac => AccessMask::WRITE_DAC,
            AccessRight::WriteOwner => AccessMask::WRITE_OWNER,
            AccessRight::Synchronize => AccessMask::SYNCHRONIZE,
            AccessRight::AccessSystemSecurity => AccessMask::ACCESS_SYSTEM_SECURITY,
            AccessRight::MaximumAllowed => AccessMask::MAXIMUM_ALLOWED,
            AccessRight::GenericAll => AccessMask::GENERIC_ALL,
            AccessRight::GenericExecute => AccessMask::GENERIC_EXECUTE,
            AccessRight::GenericWrite => AccessMask::GENERIC_WRITE,
            AccessRight::GenericRead => AccessMask::GENERIC_READ,
        }
    }

    /// Display name of the right, e.g. `"Write DACL"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns `true` for rights that are generic and only meaningful after mapping.
    #[must_use]
    pub fn is_generic(self) -> bool {
        matches!(
            self,
            AccessRight::GenericAll
                | AccessRight::GenericExecute
                | AccessRight::GenericWrite
                | AccessRight::GenericRead
        )
    }
}
