//! Fixed-width bit-vector helpers.
//!
//! Signals are carried in the smallest native unsigned integer covering their width and masked
//! explicitly. [`check_width`] is the range check applied where external values enter the core.

use super::error::SimError;

/// Returns a mask with the low `width` bits set.
#[inline]
pub const fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

/// Sign-extends the low `width` bits of `value` to 64 bits.
#[inline]
pub const fn sign_extend(value: u64, width: u32) -> u64 {
    if width == 0 || width >= 64 {
        return value;
    }
    let shift = 64 - width;
    (((value << shift) as i64) >> shift) as u64
}

/// Extracts bits `[hi:lo]` of an instruction word.
#[inline]
pub const fn field(word: u32, hi: u32, lo: u32) -> u32 {
    (word >> lo) & ((1u32 << (hi - lo + 1)) - 1)
}

/// Verifies that `value` fits in `width` bits.
///
/// # Errors
///
/// Returns [`SimError::WidthViolation`] naming the offending signal.
pub fn check_width(signal: &'static str, value: u64, width: u32) -> Result<(), SimError> {
    if value & !mask(width) != 0 {
        return Err(SimError::WidthViolation {
            signal,
            value,
            width,
        });
    }
    Ok(())
}
