use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! truncated_error {
    ($data:expr, $offset:expr, $needed:expr) => {
        crate::Error::Truncated {
            offset: $offset,
            needed: $needed,
            available: $data.len().saturating_sub($offset),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every structural variant carries the byte offset (relative to the start of the decoded blob)
/// at which the inconsistency was detected. Structural errors abort the decode of the enclosing
/// structure; a descriptor is never returned with silently skipped or truncated entries.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::Truncated`] - A read required more bytes than the buffer holds
/// - [`Error::InvalidSid`] - A SID with a bad revision or sub-authority count
/// - [`Error::AclSizeMismatch`] - An ACL whose entries disagree with its declared size
/// - [`Error::AceSizeMismatch`] - An ACE whose body disagrees with its declared size
/// - [`Error::UnsupportedRevision`] - A descriptor or ACL revision this crate does not decode
///
/// ## Input Errors
/// - [`Error::Malformed`] - Invalid textual input, e.g. a SID string that does not parse
/// - [`Error::Empty`] - Empty input provided
///
/// # Examples
///
/// ```rust
/// use sdscope::{Error, SecurityDescriptor};
///
/// match SecurityDescriptor::decode(&[0x01, 0x00, 0x04]) {
///     Ok(decoded) => println!("owner: {:?}", decoded.value.owner),
///     Err(Error::Truncated { offset, .. }) => eprintln!("blob ends early at {}", offset),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes remained than a read required.
    ///
    /// Raised by the [`crate::Parser`] bounds checks, regardless of what any declared size
    /// field inside the blob claims.
    #[error("Truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Offset at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
        /// Number of bytes that were actually left
        available: usize,
    },

    /// The SID at `offset` is not a valid revision 1 SID.
    #[error("Invalid SID at offset {offset}: {reason}")]
    InvalidSid {
        /// Offset of the first byte of the SID
        offset: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The entries of an ACL do not add up to its declared size.
    ///
    /// Also raised when a single entry would extend past the end of its ACL.
    #[error("ACL size mismatch at offset {offset}: declared {declared} bytes, consumed {consumed}")]
    AclSizeMismatch {
        /// Offset of the ACL header
        offset: usize,
        /// Size from the ACL header, including the 8 byte header
        declared: usize,
        /// Bytes covered by the header and the entries that were decoded
        consumed: usize,
    },

    /// The body of an ACE does not match its declared size.
    #[error("ACE size mismatch at offset {offset}: declared {declared} bytes, consumed {consumed}")]
    AceSizeMismatch {
        /// Offset of the ACE header
        offset: usize,
        /// Size from the ACE header
        declared: usize,
        /// Bytes the decoded fields actually occupy
        consumed: usize,
    },

    /// A structure carries a revision this crate does not understand.
    #[error("Unsupported {structure} revision {revision} at offset {offset}")]
    UnsupportedRevision {
        /// Which structure, e.g. `"security descriptor"` or `"ACL"`
        structure: &'static str,
        /// The revision byte that was found
        revision: u8,
        /// Offset of the revision byte
        offset: usize,
    },

    /// The input is damaged and could not be parsed.
    ///
    /// Used for textual inputs (SID strings) and other non-positional failures. The error
    /// includes the source location where the malformation was detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,
}

impl Error {
    /// Returns the blob offset at which a structural error was detected.
    ///
    /// `None` for [`Error::Malformed`] and [`Error::Empty`], which are not tied to a position.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Truncated { offset, .. }
            | Error::InvalidSid { offset, .. }
            | Error::AclSizeMismatch { offset, .. }
            | Error::AceSizeMismatch { offset, .. }
            | Error::UnsupportedRevision { offset, .. } => Some(*offset),
            Error::Malformed { .. } | Error::Empty => None,
        }
    }
}
