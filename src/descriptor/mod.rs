//! Decoding and encoding of self-relative security descriptors.
//!
//! This module contains the structural layer: it turns the raw bytes of an
//! `nTSecurityDescriptor`, `msDS-AllowedToActOnBehalfOfOtherIdentity` or
//! `msDS-GroupMSAMembership` value into owned types and back. Rights are left as raw
//! [`crate::rights::AccessMask`] values; naming them is the job of [`crate::rights`].
//!
//! # Key Components
//!
//! - [`SecurityDescriptor`] - Header, control flags, owner, group, SACL and DACL
//! - [`AccessControlList`] - Ordered entries with declared size and count
//! - [`AccessControlEntry`] - Allowed, denied, object and opaque entries
//! - [`SecurityIdentifier`] - Binary and string forms of a SID
//! - [`TrusteeResolver`] / [`WellKnownSids`] - Display names for trustees
//!
//! # Examples
//!
//! ```rust
//! use sdscope::descriptor::{AccessControlEntry, SecurityDescriptor};
//!
//! let blob = [
//!     0x01, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
//!     // DACL: one entry granting GENERIC_ALL to S-1-5-18
//!     0x02, 0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x00, 0x10,
//!     0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x12, 0x00, 0x00, 0x00,
//! ];
//!
//! let descriptor = SecurityDescriptor::decode(&blob)?.value;
//! for entry in descriptor.dacl.iter().flatten() {
//!     if let AccessControlEntry::Allowed(ace) = entry {
//!         println!("{} -> {:#010x}", ace.trustee, ace.mask.bits());
//!     }
//! }
//! # Ok::<(), sdscope::Error>(())
//! ```

/// Implementation of access control entries
pub mod ace;
/// Implementation of access control lists
pub mod acl;
/// Security descriptor control flags
pub mod control;
/// Implementation of the security descriptor header and layout
pub mod securitydescriptor;
/// Implementation of security identifiers
pub mod sid;
/// Well-known trustee names
pub mod wellknown;

pub use ace::{
    AccessControlEntry, AceFlags, AceType, BasicAce, ObjectAce, ObjectAceFlags, OpaqueAce,
    ACE_HEADER_SIZE,
};
pub use acl::{AccessControlList, ACL_HEADER_SIZE, ACL_REVISION, ACL_REVISION_DS};
pub use control::ControlFlags;
pub use securitydescriptor::{SecurityDescriptor, SD_HEADER_SIZE, SD_REVISION};
pub use sid::{SecurityIdentifier, SID_HEADER_SIZE, SID_MAX_SUB_AUTHORITIES, SID_REVISION};
pub use wellknown::{well_known_name, TrusteeResolver, WellKnownSids};
