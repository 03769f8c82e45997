//! Access mask interpretation for directory objects.
//!
//! # Key Components
//!
//! - [`AccessMask`] / [`AccessRight`] - Raw mask bits and individual named rights
//! - [`interpret`] - Maps a mask and optional object-type GUID to [`Capability`] values
//! - [`OBJECT_TYPES`] / [`lookup`] - Static table of extended rights, properties,
//!   property sets, validated writes and classes

mod interpreter;
mod mask;
mod objecttypes;

pub use interpreter::{interpret, Capability, MaskInterpretation};
pub use mask::{
    AccessMask, AccessRight, DS_GENERIC_ALL, DS_GENERIC_EXECUTE, DS_GENERIC_READ,
    DS_GENERIC_WRITE,
};
pub use objecttypes::{lookup, lookup_by_name, ObjectType, ObjectTypeKind, OBJECT_TYPES};
