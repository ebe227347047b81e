//! Floating-point exception (accrued) flags.
//!
//! RISC-V defines five exception flags in `fcsr.fflags`:
//!
//! | Bit | Flag | Description         |
//! |-----|------|---------------------|
//! |  4  | NV   | Invalid Operation   |
//! |  3  | DZ   | Divide by Zero      |
//! |  2  | OF   | Overflow            |
//! |  1  | UF   | Underflow           |
//! |  0  | NX   | Inexact             |
//!
//! Execute turns these into individual exception pulses when an FPU result is accepted.

use std::ops::{BitOr, BitOrAssign};

/// Floating-point exception flags (RISC-V `fcsr.fflags`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpFlags(u8);

impl FpFlags {
    /// No exceptions raised.
    pub const NONE: Self = Self(0);
    /// Invalid Operation.
    pub const NV: Self = Self(1 << 4);
    /// Divide by Zero.
    pub const DZ: Self = Self(1 << 3);
    /// Overflow.
    pub const OF: Self = Self(1 << 2);
    /// Underflow.
    pub const UF: Self = Self(1 << 1);
    /// Inexact.
    pub const NX: Self = Self(1 << 0);

    /// Builds flags from the low five bits of `bits`.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Returns the raw 5-bit flag value for writing into `fcsr`.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the specified flag is set.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for FpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
