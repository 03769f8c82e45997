//! Cursor-based, bounds-checked reader over a security descriptor blob.
//!
//! This module provides the [`crate::reader::Parser`] type used by every decoder in the crate.
//! The parser keeps an absolute position into the original blob, so every error it produces
//! carries an offset that can be located in the caller's input without further arithmetic.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::reader::Parser::seek`] - Move to an absolute position
//! - [`crate::reader::Parser::advance_by`] - Move forward by a number of bytes
//! - [`crate::reader::Parser::pos`] - Current absolute position
//! - [`crate::reader::Parser::limit`] - Derive a parser restricted to the next `n` bytes
//! - [`crate::reader::Parser::sub_parser`] - Derive a parser over an absolute sub-range
//!
//! ## Data Access Methods
//! - [`crate::reader::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::reader::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::reader::Parser::read_bytes`] - Borrow a raw byte range
//! - [`crate::reader::Parser::read_guid`] - Read a 16-byte identifier in wire format
//! - [`crate::reader::Parser::peek_byte`] / [`crate::reader::Parser::peek_le`] - Look ahead without advancing
//!
//! # Bounds
//!
//! A parser never reads past its end, which is the end of the buffer for a parser created
//! with [`crate::reader::Parser::new`] and the end of the restricted window for one created
//! with [`crate::reader::Parser::limit`]. Declared size fields inside the blob only ever
//! shrink that window, they never widen it.
//!
//! # Usage Examples
//!
//! ```rust
//! use sdscope::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! let first = parser.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! parser.seek(6)?;
//! let last = parser.read_le::<u16>()?;
//! assert_eq!(last, 0x0807);
//! # Ok::<(), sdscope::Error>(())
//! ```

use crate::{
    reader::io::{read_be_at, read_le_at, ByteIO},
    Result,
};

/// A bounds-checked cursor over a byte buffer.
///
/// `Parser` is cheap to copy: it only borrows the buffer. Sub-structures are decoded by
/// deriving a restricted parser with [`Parser::limit`], which shares the same buffer and the
/// same absolute coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    /// The complete blob being decoded
    data: &'a [u8],
    /// Current absolute position within `data`
    position: usize,
    /// Exclusive absolute end of the readable window
    end: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] over the whole of `data`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            position: 0,
            end: data.len(),
        }
    }

    /// Returns the absolute end of the readable window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end
    }

    /// Returns `true` if the readable window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    /// Returns `true` if there is more data available before the end of the window.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.end
    }

    /// Number of bytes left between the current position and the end of the window.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.position)
    }

    /// Get the current absolute position of the parser.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move the current position to the absolute index `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if `pos` is at or beyond the end of the window.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.end {
            return Err(self.truncated(pos, 1));
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if advancing would pass the end of the window.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let end = self.calc_end_position(step)?;
        self.position = end;
        Ok(())
    }

    /// Derive a parser restricted to the next `length` bytes.
    ///
    /// The derived parser starts at the current position and keeps absolute coordinates.
    /// The current parser is not advanced.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `length` bytes remain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    /// parser.advance_by(1)?;
    ///
    /// let mut window = parser.limit(2)?;
    /// assert_eq!(window.read_le::<u16>()?, 0x0302);
    /// assert!(window.read_le::<u8>().is_err());
    /// # Ok::<(), sdscope::Error>(())
    /// ```
    pub fn limit(&self, length: usize) -> Result<Parser<'a>> {
        let end = self.calc_end_position(length)?;
        Ok(Parser {
            data: self.data,
            position: self.position,
            end,
        })
    }

    /// Derive a parser over `length` bytes starting at the absolute position `offset`.
    ///
    /// Used to follow the offsets stored in a descriptor header. The range must lie within
    /// the window of this parser; the current parser is not moved.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the range is not fully inside the window.
    pub fn sub_parser(&self, offset: usize, length: usize) -> Result<Parser<'a>> {
        let mut parser = Parser {
            data: self.data,
            position: offset,
            end: self.end,
        };
        if offset > self.end {
            return Err(self.truncated(offset, length));
        }
        parser.end = parser.calc_end_position(length)?;
        Ok(parser)
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the position is at the end of the window.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.end {
            return Err(self.truncated(self.position, 1));
        }
        Ok(self.data[self.position])
    }

    /// Peek at a little-endian value of type `T` without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if reading `T` would pass the end of the window.
    pub fn peek_le<T: ByteIO>(&self) -> Result<T> {
        let mut temp_position = self.position;
        read_le_at::<T>(self.window(), &mut temp_position)
    }

    /// Read a little-endian value of type `T` and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if reading would pass the end of the window.
    pub fn read_le<T: ByteIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.window(), &mut self.position)
    }

    /// Read a big-endian value of type `T` and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if reading would pass the end of the window.
    pub fn read_be<T: ByteIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.window(), &mut self.position)
    }

    /// Borrow `length` raw bytes from the current position and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a 16-byte identifier in its mixed-endian wire format.
    ///
    /// The first three groups are little-endian on the wire, the last two are stored as
    /// plain bytes; [`uguid::Guid::from_bytes`] performs exactly this interpretation.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than 16 bytes remain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdscope::Parser;
    /// let data = [
    ///     0x70, 0x95, 0x29, 0x00, 0x6d, 0x24, 0xd0, 0x11,
    ///     0xa7, 0x68, 0x00, 0xaa, 0x00, 0x6e, 0x05, 0x29,
    /// ];
    /// let mut parser = Parser::new(&data);
    /// let guid = parser.read_guid()?;
    /// assert_eq!(guid.to_string(), "00299570-246d-11d0-a768-00aa006e0529");
    /// # Ok::<(), sdscope::Error>(())
    /// ```
    pub fn read_guid(&mut self) -> Result<uguid::Guid> {
        let bytes = self.read_bytes(16)?;

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(bytes);
        Ok(uguid::Guid::from_bytes(buffer))
    }

    fn window(&self) -> &'a [u8] {
        &self.data[..self.end]
    }

    fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(self.truncated(self.position, length))?;

        if end > self.end {
            return Err(self.truncated(self.position, length));
        }

        Ok(end)
    }

    fn truncated(&self, offset: usize, needed: usize) -> crate::Error {
        truncated_error!(self.window(), offset, needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_sequence() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u8>().unwrap(), 0x01);
        assert_eq!(parser.read_le::<u16>().unwrap(), 0x0302);
        assert_eq!(parser.read_le::<u32>().unwrap(), 0x0706_0504);
        assert!(!parser.has_more_data());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0xAA, 0xBB];
        let parser = Parser::new(&data);
        assert_eq!(parser.peek_byte().unwrap(), 0xAA);
        assert_eq!(parser.peek_le::<u16>().unwrap(), 0xBBAA);
        assert_eq!(parser.pos(), 0);
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 4];
        let mut parser = Parser::new(&data);
        assert!(parser.seek(3).is_ok());
        assert_eq!(
            parser.seek(4),
            Err(Error::Truncated {
                offset: 4,
                needed: 1,
                available: 0
            })
        );
        assert_eq!(parser.pos(), 3);
    }

    #[test]
    fn limited_window_keeps_absolute_offsets() {
        let data = [0x00, 0x00, 0x11, 0x22, 0x33, 0x44];
        let mut parser = Parser::new(&data);
        parser.advance_by(2).unwrap();

        let mut window = parser.limit(3).unwrap();
        assert_eq!(window.pos(), 2);
        assert_eq!(window.len(), 5);
        assert_eq!(window.read_le::<u16>().unwrap(), 0x2211);

        // The fourth byte exists in the buffer but lies outside the window
        let err = window.read_le::<u16>().unwrap_err();
        assert_eq!(
            err,
            Error::Truncated {
                offset: 4,
                needed: 2,
                available: 1
            }
        );
    }

    #[test]
    fn limit_cannot_widen() {
        let data = [0u8; 8];
        let parser = Parser::new(&data);
        let window = parser.limit(4).unwrap();
        assert!(matches!(
            window.limit(5),
            Err(Error::Truncated { offset: 0, needed: 5, .. })
        ));
        assert!(matches!(
            parser.limit(usize::MAX),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn sub_parser_ranges() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let parser = Parser::new(&data);

        let mut sub = parser.sub_parser(4, 2).unwrap();
        assert_eq!(sub.pos(), 4);
        assert_eq!(sub.read_le::<u16>().unwrap(), 0x0504);
        assert!(!sub.has_more_data());

        assert!(parser.sub_parser(6, 2).is_ok());
        assert_eq!(
            parser.sub_parser(6, 4).unwrap_err(),
            Error::Truncated {
                offset: 6,
                needed: 4,
                available: 2
            }
        );
        assert!(matches!(
            parser.sub_parser(12, 1),
            Err(Error::Truncated { offset: 12, available: 0, .. })
        ));
    }

    #[test]
    fn read_bytes_and_be() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0xFF];
        let mut parser = Parser::new(&data);
        let authority = parser.read_bytes(6).unwrap();
        assert_eq!(authority, &[0, 0, 0, 0, 0, 5]);
        assert_eq!(parser.read_be::<u8>().unwrap(), 0xFF);
        assert!(parser.read_bytes(1).is_err());
    }

    #[test]
    fn guid_wire_format() {
        #[rustfmt::skip]
        let data: [u8; 16] = [
            0xaa, 0xf6, 0x31, 0x11, 0x07, 0x9c, 0xd1, 0x11,
            0xf7, 0x9f, 0x00, 0xc0, 0x4f, 0xc2, 0xdc, 0xd2,
        ];
        let mut parser = Parser::new(&data);
        assert_eq!(
            parser.read_guid().unwrap(),
            uguid::guid!("1131f6aa-9c07-11d1-f79f-00c04fc2dcd2")
        );
        assert!(matches!(
            Parser::new(&data[..15]).read_guid(),
            Err(Error::Truncated { needed: 16, available: 15, .. })
        ));
    }
}
