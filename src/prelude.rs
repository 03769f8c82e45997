//! # sdscope Prelude
//!
//! The types needed to decode a descriptor, name its trustees, interpret its rights and
//! classify delegation, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all sdscope operations
pub use crate::Error;

/// The result type used throughout sdscope
pub use crate::Result;

/// Decoder strictness settings
pub use crate::DecoderConfig;

/// Decode results and their diagnostics
pub use crate::{Decoded, Diagnostic, DiagnosticCategory, DiagnosticSeverity};

// ================================================================================================
// Descriptor Structures
// ================================================================================================

/// Main entry point for descriptor decoding
pub use crate::SecurityDescriptor;

/// Lists and entries
pub use crate::descriptor::{
    AccessControlEntry, AccessControlList, AceFlags, AceType, BasicAce, ObjectAce, OpaqueAce,
};

/// Header control flags
pub use crate::ControlFlags;

/// Security identifiers and their names
pub use crate::{well_known_name, SecurityIdentifier, TrusteeResolver, WellKnownSids};

// ================================================================================================
// Rights and Analysis
// ================================================================================================

/// Access mask interpretation
pub use crate::rights::{interpret, AccessMask, AccessRight, Capability, MaskInterpretation};

/// ACL viewer rows
pub use crate::permissions::{dacl_entries, explicit_entries, permission_entries, PermissionEntry};

/// Delegation classification
pub use crate::delegation::{analyze, DelegationInput, Finding, UserAccountControl};
