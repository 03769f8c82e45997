//! Security identifiers (SIDs).
//!
//! A SID names a trustee: a user, a group, a computer or a well-known principal such as
//! `Everyone`. The binary layout is:
//!
//! | Offset | Size      | Field                                   |
//! |--------|-----------|-----------------------------------------|
//! | 0      | 1         | Revision, always 1                      |
//! | 1      | 1         | Sub-authority count, at most 15         |
//! | 2      | 6         | Identifier authority, big-endian        |
//! | 8      | 4 * count | Sub-authorities, each little-endian u32 |
//!
//! The canonical text form is `S-1-<authority>-<sub1>-...-<subN>`. Authorities that do not
//! fit into 32 bits are written as `0x` followed by 12 hex digits.
//!
//! # Examples
//!
//! ```rust
//! use sdscope::SecurityIdentifier;
//!
//! let sid: SecurityIdentifier = "S-1-5-21-111111111-222222222-333333333-500".parse()?;
//! assert_eq!(sid.authority(), 5);
//! assert_eq!(sid.rid(), Some(500));
//!
//! let bytes = sid.to_bytes()?;
//! assert_eq!(bytes.len(), sid.encoded_len());
//! assert_eq!(SecurityIdentifier::from_bytes(&bytes)?, sid);
//! # Ok::<(), sdscope::Error>(())
//! ```

use std::{fmt, str::FromStr};

use crate::{
    reader::{
        io::{write_bytes_at, write_le_at},
        Parser,
    },
    Error, Result,
};

/// The only SID revision in existence
pub const SID_REVISION: u8 = 1;
/// Maximum number of sub-authorities a SID may carry
pub const SID_MAX_SUB_AUTHORITIES: usize = 15;
/// Size of the fixed part of a SID: revision, count and authority
pub const SID_HEADER_SIZE: usize = 8;

const AUTHORITY_MAX: u64 = 0xFFFF_FFFF_FFFF;

/// A decoded security identifier.
///
/// Immutable once constructed; both the binary decoder and the string parser enforce the
/// revision and sub-authority limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityIdentifier {
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl SecurityIdentifier {
    /// Creates a SID from its authority and sub-authorities.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the authority does not fit into 48 bits or
    /// more than 15 sub-authorities are given.
    pub fn new(authority: u64, sub_authorities: &[u32]) -> Result<Self> {
        if authority > AUTHORITY_MAX {
            return Err(malformed_error!(
                "SID authority {:#x} exceeds 48 bits",
                authority
            ));
        }
        if sub_authorities.len() > SID_MAX_SUB_AUTHORITIES {
            return Err(malformed_error!(
                "SID has {} sub-authorities, at most {} are allowed",
                sub_authorities.len(),
                SID_MAX_SUB_AUTHORITIES
            ));
        }

        Ok(SecurityIdentifier {
            authority,
            sub_authorities: sub_authorities.to_vec(),
        })
    }

    /// Decodes a SID at the current position of `parser` and advances past it.
    ///
    /// # Errors
    /// - [`crate::Error::InvalidSid`] if the revision is not 1 or the count exceeds 15
    /// - [`crate::Error::Truncated`] if the SID runs past the readable window
    pub fn decode(parser: &mut Parser) -> Result<Self> {
        let start = parser.pos();

        let revision = parser.read_le::<u8>()?;
        if revision != SID_REVISION {
            return Err(Error::InvalidSid {
                offset: start,
                reason: format!("revision {} is not {}", revision, SID_REVISION),
            });
        }

        let count = usize::from(parser.read_le::<u8>()?);
        if count > SID_MAX_SUB_AUTHORITIES {
            return Err(Error::InvalidSid {
                offset: start,
                reason: format!(
                    "{} sub-authorities exceed the maximum of {}",
                    count, SID_MAX_SUB_AUTHORITIES
                ),
            });
        }

        let authority = parser
            .read_bytes(6)?
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

        let mut sub_authorities = Vec::with_capacity(count);
        for _ in 0..count {
            sub_authorities.push(parser.read_le::<u32>()?);
        }

        Ok(SecurityIdentifier {
            authority,
            sub_authorities,
        })
    }

    /// Decodes a SID from the start of `data`, e.g. an `objectSid` attribute value.
    ///
    /// Bytes following the SID are ignored.
    ///
    /// # Errors
    /// See [`SecurityIdentifier::decode`]; additionally [`crate::Error::Empty`] for empty input.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(data);
        Self::decode(&mut parser)
    }

    /// Number of bytes the binary form occupies: `8 + 4 * sub_authority_count`.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        SID_HEADER_SIZE + 4 * self.sub_authorities.len()
    }

    /// Writes the binary form into `data` at `offset` and advances the offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if `data` is too small.
    pub fn write_to(&self, data: &mut [u8], offset: &mut usize) -> Result<()> {
        let authority = self.authority.to_be_bytes();

        // Counts are limited to 15 by every constructor
        #[allow(clippy::cast_possible_truncation)]
        let count = self.sub_authorities.len() as u8;

        write_le_at(data, offset, SID_REVISION)?;
        write_le_at(data, offset, count)?;
        write_bytes_at(data, offset, &authority[2..])?;
        for sub_authority in &self.sub_authorities {
            write_le_at(data, offset, *sub_authority)?;
        }

        Ok(())
    }

    /// Returns the binary form as a new buffer.
    ///
    /// # Errors
    /// Only fails if the internal size calculation is inconsistent, which indicates a bug.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.encoded_len()];
        let mut offset = 0;
        self.write_to(&mut buffer, &mut offset)?;
        Ok(buffer)
    }

    /// The SID revision, always 1.
    #[must_use]
    pub fn revision(&self) -> u8 {
        SID_REVISION
    }

    /// The 48-bit identifier authority.
    #[must_use]
    pub fn authority(&self) -> u64 {
        self.authority
    }

    /// The sub-authorities in order.
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }

    /// The relative identifier, i.e. the last sub-authority.
    #[must_use]
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }

    /// Returns a new SID with `rid` appended, e.g. to build `<domain>-512` from a domain SID.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the SID already carries 15 sub-authorities.
    pub fn with_rid(&self, rid: u32) -> Result<Self> {
        let mut sub_authorities = self.sub_authorities.clone();
        sub_authorities.push(rid);
        Self::new(self.authority, &sub_authorities)
    }

    /// Returns `true` for SIDs of the form `S-1-5-21-x-y-z-<rid>` issued by a domain.
    #[must_use]
    pub fn is_domain_account(&self) -> bool {
        self.authority == 5 && self.sub_authorities.len() == 5 && self.sub_authorities[0] == 21
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", SID_REVISION)?;

        if self.authority > u64::from(u32::MAX) {
            write!(f, "0x{:012X}", self.authority)?;
        } else {
            write!(f, "{}", self.authority)?;
        }

        for sub_authority in &self.sub_authorities {
            write!(f, "-{}", sub_authority)?;
        }

        Ok(())
    }
}

impl FromStr for SecurityIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('-');

        match parts.next() {
            Some("S" | "s") => {}
            _ => return Err(malformed_error!("SID string '{}' does not start with 'S-'", s)),
        }

        match parts.next() {
            Some("1") => {}
            Some(revision) => {
                return Err(malformed_error!(
                    "SID string '{}' has unsupported revision '{}'",
                    s,
                    revision
                ))
            }
            None => return Err(malformed_error!("SID string '{}' has no revision", s)),
        }

        let authority = match parts.next() {
            Some(hex) if hex.starts_with("0x") || hex.starts_with("0X") => {
                let digits = &hex[2..];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(malformed_error!("SID string '{}' has an invalid authority", s));
                }
                u64::from_str_radix(digits, 16)
            }
            Some(decimal) if is_decimal(decimal) => decimal.parse::<u64>(),
            Some(_) => return Err(malformed_error!("SID string '{}' has an invalid authority", s)),
            None => return Err(malformed_error!("SID string '{}' has no authority", s)),
        }
        .map_err(|_| malformed_error!("SID string '{}' has an invalid authority", s))?;

        let sub_authorities = parts
            .map(|part| {
                let parsed = if is_decimal(part) {
                    part.parse::<u32>().ok()
                } else {
                    None
                };
                parsed.ok_or_else(|| {
                    malformed_error!("SID string '{}' has invalid sub-authority '{}'", s, part)
                })
            })
            .collect::<Result<Vec<u32>>>()?;

        Self::new(authority, &sub_authorities)
    }
}

// `str::parse` also takes a leading '+', which is not part of the canonical form
fn is_decimal(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::builders::sid_bytes;

    #[test]
    fn decode_domain_sid() {
        let bytes = sid_bytes(5, &[21, 111_111_111, 222_222_222, 333_333_333, 500]);
        let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();

        assert_eq!(sid.revision(), 1);
        assert_eq!(sid.authority(), 5);
        assert_eq!(sid.sub_authorities().len(), 5);
        assert_eq!(sid.rid(), Some(500));
        assert!(sid.is_domain_account());
        assert_eq!(
            sid.to_string(),
            "S-1-5-21-111111111-222222222-333333333-500"
        );
        assert_eq!(sid.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn decode_everyone() {
        let bytes = [0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
        assert_eq!(sid.to_string(), "S-1-1-0");
        assert_eq!(sid.encoded_len(), 12);
    }

    #[test]
    fn decode_advances_parser() {
        let mut bytes = sid_bytes(5, &[18]);
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let mut parser = Parser::new(&bytes);
        let sid = SecurityIdentifier::decode(&mut parser).unwrap();
        assert_eq!(sid.to_string(), "S-1-5-18");
        assert_eq!(parser.pos(), 12);
    }

    #[test]
    fn invalid_revision() {
        let mut bytes = sid_bytes(5, &[18]);
        bytes[0] = 2;
        let err = SecurityIdentifier::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidSid { offset: 0, .. }));
    }

    #[test]
    fn too_many_sub_authorities() {
        let mut bytes = vec![0x01, 0x10, 0, 0, 0, 0, 0, 5];
        bytes.extend(std::iter::repeat(0u8).take(64));
        let err = SecurityIdentifier::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidSid { offset: 0, .. }));
    }

    #[test]
    fn truncated_sub_authorities() {
        let bytes = sid_bytes(5, &[21, 1, 2, 3]);
        let err = SecurityIdentifier::from_bytes(&bytes[..bytes.len() - 2]).unwrap_err();
        assert_eq!(
            err,
            Error::Truncated {
                offset: 20,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(SecurityIdentifier::from_bytes(&[]), Err(Error::Empty));
    }

    #[test]
    fn large_authority_renders_hex() {
        let sid = SecurityIdentifier::new(0x0000_0100_0000_0000, &[7]).unwrap();
        assert_eq!(sid.to_string(), "S-1-0x010000000000-7");

        let parsed: SecurityIdentifier = "S-1-0x010000000000-7".parse().unwrap();
        assert_eq!(parsed, sid);

        let bytes = sid.to_bytes().unwrap();
        assert_eq!(&bytes[2..8], &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn parse_round_trip() {
        for text in ["S-1-0-0", "S-1-5-32-544", "S-1-16-12288", "S-1-5"] {
            let sid: SecurityIdentifier = text.parse().unwrap();
            assert_eq!(sid.to_string(), text);
        }
    }

    #[test]
    fn parse_errors() {
        for text in [
            "",
            "X-1-5",
            "S-2-5-18",
            "S-1",
            "S-1-abc",
            "S-1-5-18-",
            "S-1-5-4294967296",
            "S-1-0x1000000000000",
            "S-1-5-+18",
            "S-1-+5-18",
            "S-1-0x+10-1",
            "S-1-0x-1",
            "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16",
        ] {
            let result = text.parse::<SecurityIdentifier>();
            assert!(
                matches!(result, Err(Error::Malformed { .. })),
                "{} should not parse",
                text
            );
        }
    }

    #[test]
    fn with_rid() {
        let domain: SecurityIdentifier = "S-1-5-21-1-2-3".parse().unwrap();
        let admins = domain.with_rid(512).unwrap();
        assert_eq!(admins.to_string(), "S-1-5-21-1-2-3-512");
        assert_eq!(domain.rid(), Some(3));

        let full = SecurityIdentifier::new(5, &[1; 15]).unwrap();
        assert!(full.with_rid(1).is_err());
        assert_eq!(SecurityIdentifier::new(1, &[]).unwrap().rid(), None);
    }
}
