//! Little-endian primitive reading and writing for the table format.
//!
//! The format stores every scalar in little-endian byte order at its natural alignment. This
//! module provides the [`crate::buffer::io::Primitive`] trait describing such scalars together
//! with bounds-checked helpers to move them in and out of byte slices.
//!
//! # Key Components
//!
//! - [`crate::buffer::io::Primitive`] - Fixed-size scalar with a little-endian representation
//! - [`crate::buffer::io::read_le`] / [`crate::buffer::io::read_le_at`] - Bounds-checked reads
//! - [`crate::buffer::io::write_le`] / [`crate::buffer::io::write_le_at`] - Bounds-checked writes
//!
//! ## Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//! - **Boolean**: `bool`, stored as a single byte
//!
//! # Examples
//!
//! ```rust
//! use flatscope::buffer::io::{read_le_at, write_le_at};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_le_at(&mut data, &mut offset, 1u16)?;
//! write_le_at(&mut data, &mut offset, 2u32)?;
//! assert_eq!(data, [0x01, 0x00, 0x02, 0x00, 0x00, 0x00]);
//!
//! offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 2, 6));
//! # Ok::<(), flatscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All helpers return [`crate::Error::OutOfBounds`] if the slice is too short for the
//! requested value.

use crate::{Error::OutOfBounds, Result};

/// A scalar that the format stores inline with a fixed little-endian layout.
///
/// Each implementation names the byte array that holds its encoded form. The natural
/// alignment of every primitive equals its size, which is what the writer pads to before
/// placing the value inside a table or vector.
pub trait Primitive: Copy + Sized {
    /// Byte array holding the encoded value
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Encoded size in bytes
    const SIZE: usize;

    /// Natural alignment in bytes
    const ALIGN: usize = Self::SIZE;

    /// Decode the value from little-endian bytes
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Encode the value as little-endian bytes
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_primitive {
    ($($ty:ty => $size:expr),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; $size];
                const SIZE: usize = $size;

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

// Booleans are a single byte, any non-zero value reads back as true
impl Primitive for bool {
    type Bytes = [u8; 1];
    const SIZE: usize = 1;

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        bytes[0] != 0
    }

    fn to_le_bytes(self) -> Self::Bytes {
        [u8::from(self)]
    }
}

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le<T: Primitive>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: Primitive>(data: &[u8], offset: &mut usize) -> Result<T> {
    let Some(end) = offset.checked_add(T::SIZE) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Safely writes a value of type `T` in little-endian byte order to the start of a buffer.
///
/// # Arguments
///
/// * `data` - The byte buffer to write to
/// * `value` - The value to write
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le<T: Primitive>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_le_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes written.
///
/// # Arguments
///
/// * `data` - The byte buffer to write to
/// * `offset` - Mutable reference to the offset position (will be advanced after writing)
/// * `value` - The value to write
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too small.
pub fn write_le_at<T: Primitive>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let Some(end) = offset.checked_add(T::SIZE) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    *offset = end;

    Ok(())
}
