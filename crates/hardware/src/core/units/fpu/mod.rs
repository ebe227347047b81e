//! Floating-Point Unit (FPU).
//!
//! This module implements the double-precision arithmetic evaluated by the multi-cycle FPU
//! model: add, subtract, multiply, divide, min/max, compares, integer conversions and raw
//! moves. Every operation returns the result together with the IEEE 754 exception flags it
//! raised; Execute turns those into exception pulses.
//!
//! Operations are organized into submodules:
//! - [`nan_handling`]: Canonical NaN propagation and `minNum`/`maxNum`.
//! - [`exception_flags`]: Exception flag type.

/// Canonical NaN propagation and `minNum`/`maxNum`.
pub mod nan_handling;

/// Floating-point exception flag types.
pub mod exception_flags;

use crate::isa::opcode::Opcode;

use self::exception_flags::FpFlags;
use self::nan_handling::{canonicalize_f64, fmax_f64, fmin_f64, is_snan_f64};

/// Floating-Point Unit (FPU) for double-precision operations.
pub struct Fpu;

impl Fpu {
    /// Executes a floating-point operation and returns the result with its exception flags.
    ///
    /// Floating-point operands and results are raw IEEE 754 bit patterns; integer operands and
    /// results are two's complement, with 32-bit results sign-extended.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvpipe_core::core::units::fpu::Fpu;
    /// use rvpipe_core::core::units::fpu::exception_flags::FpFlags;
    /// use rvpipe_core::isa::opcode::Opcode;
    ///
    /// let (r, flags) = Fpu::execute(Opcode::FmulD, 2.0f64.to_bits(), 3.5f64.to_bits());
    /// assert_eq!(f64::from_bits(r), 7.0);
    /// assert!(flags.is_empty());
    ///
    /// let (_, flags) = Fpu::execute(Opcode::FdivD, 1.0f64.to_bits(), 0.0f64.to_bits());
    /// assert_eq!(flags, FpFlags::DZ);
    /// ```
    pub fn execute(op: Opcode, a: u64, b: u64) -> (u64, FpFlags) {
        let fa = f64::from_bits(a);
        let fb = f64::from_bits(b);
        let mut flags = FpFlags::NONE;
        let reads_b = op.info().reads_rs2;
        let float_in = op.info().fp_rs1 && op != Opcode::FmovXD;

        if float_in && (is_snan_f64(fa) || (reads_b && is_snan_f64(fb))) {
            flags |= FpFlags::NV;
        }

        let result = match op {
            Opcode::FaddD | Opcode::FsubD | Opcode::FmulD | Opcode::FdivD => {
                let (r, f) = Self::arith(op, fa, fb);
                flags |= f;
                canonicalize_f64(r).to_bits()
            }
            Opcode::FminD => fmin_f64(fa, fb).to_bits(),
            Opcode::FmaxD => fmax_f64(fa, fb).to_bits(),
            Opcode::FeqD => u64::from(fa == fb),
            Opcode::FltD | Opcode::FleD => {
                if fa.is_nan() || fb.is_nan() {
                    flags |= FpFlags::NV;
                }
                let r = if op == Opcode::FltD { fa < fb } else { fa <= fb };
                u64::from(r)
            }
            Opcode::FcvtWD => {
                let t = Self::to_int(fa, f64::from(i32::MIN), f64::from(i32::MAX), &mut flags);
                t as i32 as i64 as u64
            }
            Opcode::FcvtWuD => {
                let t = Self::to_int(fa, 0.0, f64::from(u32::MAX), &mut flags);
                t as u32 as i32 as i64 as u64
            }
            Opcode::FcvtLD => {
                Self::to_int(fa, i64::MIN as f64, i64::MAX as f64, &mut flags) as i64 as u64
            }
            Opcode::FcvtLuD => Self::to_int(fa, 0.0, u64::MAX as f64, &mut flags) as u64,
            Opcode::FcvtDW => f64::from(a as i32).to_bits(),
            Opcode::FcvtDWu => f64::from(a as u32).to_bits(),
            Opcode::FcvtDL => {
                let r = a as i64 as f64;
                if r as i128 != i128::from(a as i64) {
                    flags |= FpFlags::NX;
                }
                r.to_bits()
            }
            Opcode::FcvtDLu => {
                let r = a as f64;
                if r as u128 != u128::from(a) {
                    flags |= FpFlags::NX;
                }
                r.to_bits()
            }
            Opcode::FmovDX | Opcode::FmovXD => a,
            _ => 0,
        };
        (result, flags)
    }

    /// Add, subtract, multiply or divide with overflow, underflow and inexact detection.
    fn arith(op: Opcode, a: f64, b: f64) -> (f64, FpFlags) {
        let mut flags = FpFlags::NONE;
        let r = match op {
            Opcode::FaddD => a + b,
            Opcode::FsubD => a - b,
            Opcode::FmulD => a * b,
            _ => {
                if b == 0.0 && !a.is_nan() {
                    flags |= if a == 0.0 { FpFlags::NV } else { FpFlags::DZ };
                }
                a / b
            }
        };
        if r.is_nan() && !a.is_nan() && !b.is_nan() && !flags.contains(FpFlags::NV) {
            flags |= FpFlags::NV;
        }
        if !r.is_finite() || !a.is_finite() || !b.is_finite() {
            if r.is_infinite() && a.is_finite() && b.is_finite() && !flags.contains(FpFlags::DZ) {
                flags |= FpFlags::OF | FpFlags::NX;
            }
            return (r, flags);
        }
        let exact = match op {
            Opcode::FaddD | Opcode::FsubD => {
                let b = if op == Opcode::FsubD { -b } else { b };
                // Two-sum error term.
                let bv = r - a;
                let av = r - bv;
                (a - av) + (b - bv) == 0.0
            }
            Opcode::FmulD => a.mul_add(b, -r) == 0.0,
            _ => r.mul_add(b, -a) == 0.0,
        };
        if !exact {
            flags |= FpFlags::NX;
            if r.abs() < f64::MIN_POSITIVE {
                flags |= FpFlags::UF;
            }
        }
        (r, flags)
    }

    /// Rounds toward zero and saturates into `[lo, hi]`. NaN saturates high.
    fn to_int(f: f64, lo: f64, hi: f64, flags: &mut FpFlags) -> f64 {
        if f.is_nan() {
            *flags |= FpFlags::NV;
            return hi;
        }
        let t = f.trunc();
        if t < lo {
            *flags |= FpFlags::NV;
            return lo;
        }
        if t > hi {
            *flags |= FpFlags::NV;
            return hi;
        }
        if t != f {
            *flags |= FpFlags::NX;
        }
        t
    }
}
