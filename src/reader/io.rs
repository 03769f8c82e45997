//! Endian-aware, bounds-checked reading and writing of primitive integers.
//!
//! Security descriptors mix byte orders: every size, offset, mask and sub-authority is
//! little-endian, while the 48-bit identifier authority of a SID is big-endian. This module
//! provides the primitive layer used by [`crate::reader::Parser`] for reads and by the
//! structure encoders for writes.
//!
//! # Key Components
//!
//! - [`ByteIO`] - Trait implemented by the unsigned integer types used on the wire
//! - [`read_le_at`] / [`read_be_at`] - Read at an offset and advance it
//! - [`write_le_at`] / [`write_be_at`] - Write at an offset and advance it
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::Truncated`] carrying the offset of the failed access
//! if the buffer holds fewer bytes than the type requires. Nothing is read or written
//! partially, and the offset is left untouched on failure.
//!
//! # Thread Safety
//!
//! All functions are pure over their arguments and can be called concurrently; each caller
//! owns its offset variable.

use crate::Result;

/// Trait for unsigned integer types that can be read from and written to byte buffers.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait ByteIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_byte_io {
    ($($ty:ty),*) => {
        $(
            impl ByteIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_byte_io!(u8, u16, u32, u64);

/// Reads a little-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust,ignore
/// let data = [0x01, 0x00, 0x02, 0x00];
/// let mut offset = 0;
/// let first: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!((first, offset), (1, 2));
/// ```
pub fn read_le_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = take::<T>(data, *offset)?;
    *offset += std::mem::size_of::<T>();
    Ok(T::from_le_bytes(bytes))
}

/// Reads a big-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_be_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = take::<T>(data, *offset)?;
    *offset += std::mem::size_of::<T>();
    Ok(T::from_be_bytes(bytes))
}

fn take<T: ByteIO>(data: &[u8], offset: usize) -> Result<T::Bytes> {
    let type_len = std::mem::size_of::<T>();
    let end = offset
        .checked_add(type_len)
        .ok_or(truncated_error!(data, offset, type_len))?;
    if end > data.len() {
        return Err(truncated_error!(data, offset, type_len));
    }

    let Ok(read) = data[offset..end].try_into() else {
        return Err(truncated_error!(data, offset, type_len));
    };

    Ok(read)
}

/// Writes `value` in little-endian byte order at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if `data` is too small to hold the value.
pub fn write_le_at<T: ByteIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    put(data, offset, value.to_le_bytes())
}

/// Writes `value` in big-endian byte order at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if `data` is too small to hold the value.
pub fn write_be_at<T: ByteIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    put(data, offset, value.to_be_bytes())
}

/// Copies `bytes` into `data` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if `data` is too small.
pub fn write_bytes_at(data: &mut [u8], offset: &mut usize, bytes: &[u8]) -> Result<()> {
    put(data, offset, bytes)
}

fn put<B: AsRef<[u8]>>(data: &mut [u8], offset: &mut usize, bytes: B) -> Result<()> {
    let bytes = bytes.as_ref();
    let end = offset
        .checked_add(bytes.len())
        .ok_or(truncated_error!(data, *offset, bytes.len()))?;
    if end > data.len() {
        return Err(truncated_error!(data, *offset, bytes.len()));
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_values() {
        assert_eq!(read_le_at::<u8>(&TEST_BUFFER, &mut 0).unwrap(), 0x01);
        assert_eq!(read_le_at::<u16>(&TEST_BUFFER, &mut 0).unwrap(), 0x0201);
        assert_eq!(read_le_at::<u32>(&TEST_BUFFER, &mut 0).unwrap(), 0x0403_0201);
        assert_eq!(read_le_at::<u64>(&TEST_BUFFER, &mut 0).unwrap(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn read_be_values() {
        let mut offset = 2;
        assert_eq!(read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0304);
        assert_eq!(offset, 4);
        assert_eq!(read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x0506_0708);
        assert_eq!(offset, 8);
    }

    #[test]
    fn sequential_offsets() {
        let mut offset = 0;
        let a: u16 = read_le_at(&TEST_BUFFER, &mut offset).unwrap();
        let b: u16 = read_le_at(&TEST_BUFFER, &mut offset).unwrap();
        let c: u32 = read_le_at(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!((a, b, c), (0x0201, 0x0403, 0x0807_0605));
        assert_eq!(offset, 8);
    }

    #[test]
    fn truncated_read_reports_offset() {
        let mut offset = 6;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);
        assert_eq!(
            result,
            Err(Error::Truncated {
                offset: 6,
                needed: 4,
                available: 2
            })
        );
        assert_eq!(offset, 6);
    }

    #[test]
    fn offset_past_end() {
        let mut offset = 100;
        let result = read_le_at::<u8>(&TEST_BUFFER, &mut offset);
        assert!(matches!(
            result,
            Err(Error::Truncated {
                offset: 100,
                available: 0,
                ..
            })
        ));
    }

    #[test]
    fn write_values() {
        let mut buffer = [0u8; 8];
        let mut offset = 0;
        write_le_at(&mut buffer, &mut offset, 0x1234u16).unwrap();
        write_be_at(&mut buffer, &mut offset, 0x5678u16).unwrap();
        write_bytes_at(&mut buffer, &mut offset, &[0xAA, 0xBB]).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(buffer, [0x34, 0x12, 0x56, 0x78, 0xAA, 0xBB, 0x00, 0x00]);
    }

    #[test]
    fn write_errors() {
        let mut buffer = [0u8; 2];
        let mut offset = 0;
        let result = write_le_at(&mut buffer, &mut offset, 0x1234_5678u32);
        assert!(matches!(result, Err(Error::Truncated { needed: 4, .. })));
        assert_eq!(offset, 0);
        assert_eq!(buffer, [0, 0]);
    }
}
