//! Control signal encodings shared between stages.
//!
//! This module defines the small fixed-width control fields that cross stage boundaries:
//! 1. **Memory Operation Size:** The 2-bit size code carried by memory requests.
//! 2. **Multi-cycle Slots:** The functional unit kinds Execute can dispatch to.
//! 3. **CSR Commands:** The 9-bit command bitfield of a CSR bus transaction.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::common::constants::CSR_CMD_WIDTH;

/// Encoded memory transaction size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemopSize {
    /// 1 byte.
    Byte = 0,
    /// 2 bytes.
    Half = 1,
    /// 4 bytes.
    Word = 2,
    /// 8 bytes.
    #[default]
    Double = 3,
}

impl MemopSize {
    /// Decodes the 2-bit size field.
    pub const fn from_code(code: u8) -> Self {
        match code & 0x3 {
            0 => Self::Byte,
            1 => Self::Half,
            2 => Self::Word,
            _ => Self::Double,
        }
    }

    /// Returns the 2-bit size code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Access size in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        1 << (self as u64)
    }

    /// Access size in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        8 << (self as u32)
    }

    /// True when `addr` is naturally aligned for this size.
    #[inline]
    pub const fn is_aligned(self, addr: u64) -> bool {
        addr & (self.bytes() - 1) == 0
    }
}

/// Multi-cycle functional unit kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MultiSlot {
    /// Integer multiplier.
    Mul = 0,
    /// Integer divider.
    Div = 1,
    /// Floating-point unit.
    Fpu = 2,
}

impl MultiSlot {
    /// Every slot in index order.
    pub const ALL: [Self; 3] = [Self::Mul, Self::Div, Self::Fpu];

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short lowercase name used in logs and traces.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Fpu => "fpu",
        }
    }
}

/// CSR bus command bitfield.
///
/// Bits may be combined; a read-then-write CSR instruction issues `READ` and `WRITE`
/// as separate transactions.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CsrCommand(u16);

impl CsrCommand {
    /// No command.
    pub const NONE: Self = Self(0);
    /// Read the addressed CSR.
    pub const READ: Self = Self(1 << 0);
    /// Write the addressed CSR.
    pub const WRITE: Self = Self(1 << 1);
    /// Return from trap; the response carries the return address.
    pub const TRAP_RETURN: Self = Self(1 << 2);
    /// Record an exception; the response carries the trap vector.
    pub const EXCEPTION: Self = Self(1 << 3);
    /// Record an interrupt; the response carries the trap vector.
    pub const INTERRUPT: Self = Self(1 << 4);
    /// Breakpoint entry.
    pub const BREAKPOINT: Self = Self(1 << 5);
    /// Halt request.
    pub const HALT: Self = Self(1 << 6);
    /// Resume request.
    pub const RESUME: Self = Self(1 << 7);
    /// Wait for interrupt.
    pub const WFI: Self = Self(1 << 8);

    const NAMES: [&'static str; CSR_CMD_WIDTH as usize] = [
        "READ",
        "WRITE",
        "TRAP_RETURN",
        "EXCEPTION",
        "INTERRUPT",
        "BREAKPOINT",
        "HALT",
        "RESUME",
        "WFI",
    ];

    /// Builds a command from raw bits, dropping bits above the command width.
    #[inline]
    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & ((1 << CSR_CMD_WIDTH) - 1))
    }

    /// Raw command bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// True when no command bit is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CsrCommand {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CsrCommand {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for CsrCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "CsrCommand(NONE)");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();
        write!(f, "CsrCommand({})", names.join("|"))
    }
}
