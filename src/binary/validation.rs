//! Range validation shared by every backend.
//!
//! Backends never zero-fill: any byte range that does not fit inside the
//! accessor's length is rejected before the medium is touched.

use crate::error::{BinaryError, Result};
use std::ops::Range;

/// Largest buffer a single in-memory allocation can address on this platform
pub const MAX_BUFFER_LEN: u64 = isize::MAX as u64;

/// Convert a 64-bit length into a buffer length, rejecting values that cannot
/// be materialized as one contiguous allocation
pub fn buffer_len(length: u64) -> Result<usize> {
    if length > MAX_BUFFER_LEN {
        return Err(BinaryError::LengthTooLarge { length });
    }
    usize::try_from(length).map_err(|_| BinaryError::LengthTooLarge { length })
}

/// Validate that `offset..offset + length` lies within `available` bytes
///
/// # Returns
/// * The range as `usize` indices, ready for slicing an in-memory buffer
///
/// # Errors
/// * `OutOfBounds` when the range ends past `available` or overflows
pub fn checked_range(offset: u64, length: usize, available: u64) -> Result<Range<usize>> {
    let end = offset
        .checked_add(length as u64)
        .filter(|end| *end <= available)
        .ok_or_else(|| BinaryError::out_of_bounds(offset, length as u64, available))?;

    Ok(buffer_len(offset)?..buffer_len(end)?)
}

/// Add a view-relative offset to a base offset without wrapping
pub fn offset_add(base: u64, offset: u64) -> Result<u64> {
    base.checked_add(offset).ok_or_else(|| {
        BinaryError::invalid_argument(format!("offset {base} + {offset} overflows"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_inside_bounds() {
        assert_eq!(checked_range(2, 3, 5).unwrap(), 2..5);
        assert_eq!(checked_range(5, 0, 5).unwrap(), 5..5);
    }

    #[test]
    fn test_range_past_end_is_rejected() {
        let err = checked_range(4, 2, 5).unwrap_err();
        match err {
            BinaryError::OutOfBounds {
                offset,
                length,
                available,
            } => {
                assert_eq!((offset, length, available), (4, 2, 5));
            }
            other => panic!("Expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn test_range_overflow_is_rejected() {
        assert!(checked_range(u64::MAX, 1, u64::MAX).is_err());
    }

    #[test]
    fn test_buffer_len_ceiling() {
        assert_eq!(buffer_len(16).unwrap(), 16);
        assert!(matches!(
            buffer_len(MAX_BUFFER_LEN + 1),
            Err(BinaryError::LengthTooLarge { .. })
        ));
    }

    #[test]
    fn test_offset_add_overflow() {
        assert_eq!(offset_add(3, 4).unwrap(), 7);
        assert!(matches!(
            offset_add(u64::MAX, 1),
            Err(BinaryError::InvalidArgument { .. })
        ));
    }
}
