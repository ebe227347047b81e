//! Canonical NaN propagation for double-precision results.
//!
//! Any NaN produced by an arithmetic operation is replaced with the canonical quiet NaN,
//! discarding payload bits. `FMIN`/`FMAX` follow IEEE 754-2008 `minNum`/`maxNum`.

/// Canonical quiet NaN for IEEE 754 double-precision (positive, quiet, zero payload).
pub const CANONICAL_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

const NEG_ZERO: u64 = 0x8000_0000_0000_0000;

/// Replaces any NaN with the canonical quiet NaN.
#[inline]
pub fn canonicalize_f64(f: f64) -> f64 {
    if f.is_nan() {
        f64::from_bits(CANONICAL_NAN_F64)
    } else {
        f
    }
}

/// Checks if an f64 value is a signaling NaN.
pub fn is_snan_f64(f: f64) -> bool {
    let bits = f.to_bits();
    let exp = (bits >> 52) & 0x7FF;
    let mantissa = bits & 0x000F_FFFF_FFFF_FFFF;
    let quiet_bit = bits & 0x0008_0000_0000_0000;
    exp == 0x7FF && mantissa != 0 && quiet_bit == 0
}

/// IEEE 754-2008 `minNum` (RISC-V `FMIN.D`). `-0.0` orders below `+0.0`.
#[inline]
pub fn fmin_f64(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            if a.to_bits() == NEG_ZERO && b.to_bits() == 0 {
                a
            } else if b.to_bits() == NEG_ZERO && a.to_bits() == 0 {
                b
            } else {
                a.min(b)
            }
        }
    }
}

/// IEEE 754-2008 `maxNum` (RISC-V `FMAX.D`). `+0.0` orders above `-0.0`.
#[inline]
pub fn fmax_f64(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::from_bits(CANONICAL_NAN_F64),
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            if a.to_bits() == 0 && b.to_bits() == NEG_ZERO {
                a
            } else if b.to_bits() == 0 && a.to_bits() == NEG_ZERO {
                b
            } else {
                a.max(b)
            }
        }
    }
}
