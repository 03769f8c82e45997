// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # sdscope
//!
//! A cross-platform decoder and security analyzer for Windows security descriptors, as stored
//! in the `nTSecurityDescriptor`, `msDS-AllowedToActOnBehalfOfOtherIdentity` and
//! `msDS-GroupMSAMembership` attributes of Active Directory objects.
//!
//! ## Features
//!
//! - **Bounds-checked decoding** - Every size and offset field is validated against the input,
//!   errors carry the byte offset at which decoding stopped
//! - **Lossless entries** - Entry types that are not decoded are kept as raw bytes, and every
//!   decoded structure encodes back to the bytes it came from
//! - **Diagnostics** - Inconsistent but readable descriptors decode with attached warnings
//!   instead of failing
//! - **Rights interpretation** - Access masks are mapped to named rights, extended rights,
//!   properties and validated writes of the directory schema
//! - **Delegation analysis** - Unconstrained, constrained and resource-based delegation,
//!   plus service account risk assessment
//!
//! The crate does no I/O. Attribute values are fetched by the caller, e.g. with an LDAP
//! client requesting the SD flags control, and passed in as byte slices.
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use sdscope::prelude::*;
//!
//! let blob = [
//!     0x01, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
//!     0x02, 0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x14, 0x00, 0xFF, 0x01, 0x0F, 0x00,
//!     0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x12, 0x00, 0x00, 0x00,
//! ];
//!
//! let decoded = SecurityDescriptor::decode(&blob)?;
//! for row in dacl_entries(&decoded.value, &WellKnownSids).value {
//!     let trustee = row.trustee_name.as_deref().unwrap_or("-");
//!     println!("{} {}: {}", row.kind, trustee, row.right_names().join(", "));
//! }
//! # Ok::<(), sdscope::Error>(())
//! ```
//!
//! ### Delegation
//!
//! ```rust
//! use sdscope::delegation::{analyze, DelegationInput, Finding};
//!
//! let input = DelegationInput::new(0x0008_1000u32);
//! assert_eq!(analyze(&input)?.value, [Finding::Unconstrained]);
//! # Ok::<(), sdscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`reader`] - Bounds-checked [`Parser`] and endian helpers
//! - [`descriptor`] - SIDs, entries, lists and the descriptor itself
//! - [`rights`] - Access mask interpretation and the object-type table
//! - [`permissions`] - Display rows for ACL viewers
//! - [`delegation`] - Delegation and service account analysis
//! - [`Error`] and [`Result`] - Structural errors; [`Diagnostic`] for everything non-fatal
//!
//! ## Error Handling
//!
//! Decoding either fails with an [`Error`] carrying the offset of the offending byte, or
//! returns a [`Decoded`] value with zero or more [`Diagnostic`]s. A descriptor is never
//! returned with entries silently skipped.
//!
//! ```rust
//! use sdscope::{Error, SecurityDescriptor};
//!
//! match SecurityDescriptor::decode(&[0x01, 0x00, 0x04, 0x80, 0x14]) {
//!     Err(Error::Truncated { offset, .. }) => println!("ends early at {:#x}", offset),
//!     Err(e) => println!("error: {}", e),
//!     Ok(decoded) => println!("{} diagnostics", decoded.diagnostics.len()),
//! }
//! ```

#[macro_use]
pub(crate) mod error;


/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use sdscope::prelude::*;
///
/// let sid: SecurityIdentifier = "S-1-5-32-544".parse()?;
/// assert_eq!(well_known_name(&sid), Some("BUILTIN\\Administrators"));
/// # Ok::<(), sdscope::Error>(())
/// ```
pub mod prelude;

/// Decoder configuration presets
pub mod config;

/// Non-fatal findings attached to decode results
pub mod diagnostics;

/// Bounds-checked binary reading and writing
///
/// [`Parser`] is a copyable cursor over a byte slice that keeps absolute offsets, so errors
/// from nested structures point into the original blob. [`reader::io`] holds the free
/// functions the encoders use to write little- and big-endian values.
///
/// # Examples
///
/// ```rust
/// use sdscope::Parser;
///
/// let data = [0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_le::<u8>()?, 1);
/// parser.seek(2)?;
/// assert_eq!(parser.read_be::<u16>()?, 0);
/// # Ok::<(), sdscope::Error>(())
/// ```
pub mod reader;

pub mod descriptor;

pub mod rights;

pub mod permissions;

pub mod delegation;

/// `sdscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `sdscope` Error type
///
/// Structural decoding errors; every variant except `Malformed` and `Empty` carries the blob
/// offset at which decoding stopped.
pub use error::Error;

/// Bounds-checked cursor over a byte slice
pub use reader::Parser;

/// Decode results and their diagnostics
pub use diagnostics::{Decoded, Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};

/// Decoder strictness settings
pub use config::DecoderConfig;

/// Main entry point for decoding a security descriptor.
///
/// # Example
///
/// ```rust
/// use sdscope::SecurityDescriptor;
///
/// let blob = [
///     0x01, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
/// ];
/// let descriptor = SecurityDescriptor::decode(&blob)?.value;
/// assert!(descriptor.dacl.is_none());
/// # Ok::<(), sdscope::Error>(())
/// ```
pub use descriptor::SecurityDescriptor;

/// Descriptor building blocks
pub use descriptor::{
    AccessControlEntry, AccessControlList, AceFlags, AceType, ControlFlags, SecurityIdentifier,
};

/// Trustee naming
pub use descriptor::{well_known_name, TrusteeResolver, WellKnownSids};

/// Access mask types
pub use rights::{AccessMask, AccessRight};
