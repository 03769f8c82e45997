//! Low-level byte access for descriptor decoding and encoding.
//!
//! - [`Parser`] - bounds-checked cursor used by every decoder
//! - [`io`] - endian-aware primitive reads and writes, shared with the encoders

pub mod io;
mod parser;

pub use parser::Parser;
