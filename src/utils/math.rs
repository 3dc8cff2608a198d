//! Checked narrowing and alignment arithmetic.

use crate::Result;

/// Converts a `usize` to `u32` for offset serialization, returning an error if the value
/// exceeds `u32::MAX`. Every position and length in the format is a 32-bit quantity.
///
/// # Errors
///
/// Returns an error if `value` exceeds `u32::MAX`.
pub fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| contract_error!("value {value} exceeds the 32-bit offset space"))
}

/// Converts a `usize` to `u16` for vtable serialization, returning an error if the value
/// exceeds `u16::MAX`. VTable entries and table sizes are 16-bit quantities.
///
/// # Errors
///
/// Returns an error if `value` exceeds `u16::MAX`.
pub fn to_u16(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| contract_error!("value {value} exceeds the 16-bit vtable range"))
}

/// Number of zero bytes needed so that `size + padding` is a multiple of `alignment`.
///
/// `alignment` must be a power of two; an alignment of 0 or 1 never requires padding.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(padding_for(5, 4), 3);
/// assert_eq!(padding_for(8, 4), 0);
/// ```
#[must_use]
pub fn padding_for(size: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    size.wrapping_neg() & (alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0, 4), 0);
        assert_eq!(padding_for(1, 4), 3);
        assert_eq!(padding_for(2, 4), 2);
        assert_eq!(padding_for(3, 4), 1);
        assert_eq!(padding_for(4, 4), 0);
        assert_eq!(padding_for(13, 8), 3);
        assert_eq!(padding_for(7, 1), 0);
        assert_eq!(padding_for(7, 0), 0);
    }

    #[test]
    fn test_to_u32_valid() {
        assert_eq!(to_u32(0).unwrap(), 0);
        assert_eq!(to_u32(1).unwrap(), 1);
        assert_eq!(to_u32(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_to_u32_overflow() {
        assert!(to_u32(u32::MAX as usize + 1).is_err());
        assert!(to_u32(usize::MAX).is_err());
    }

    #[test]
    fn test_to_u16() {
        assert_eq!(to_u16(65535).unwrap(), u16::MAX);
        assert!(to_u16(65536).is_err());
    }
}
