//! Bitwise logic block.
//!
//! The logic unit computes AND, OR or XOR of two 64-bit operands under a 3-bit one-hot mode
//! (bit 0 AND, bit 1 OR, bit 2 XOR). It exists in two forms:
//! 1. **Combinational:** [`execute`] evaluates a validated [`LogicMode`] directly; Execute uses
//!    this for single-cycle `AND`/`OR`/`XOR` and their immediate forms.
//! 2. **Registered:** [`AluLogic`] samples mode and operands each cycle and presents the result
//!    one cycle later, matching a stand-alone pipelined logic block.

use crate::core::pipeline::traits::{ClockedStage, Registers};
use crate::isa::opcode::Opcode;

/// One-hot logic operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogicMode(u8);

impl LogicMode {
    /// Bitwise AND.
    pub const AND: Self = Self(1 << 0);
    /// Bitwise OR.
    pub const OR: Self = Self(1 << 1);
    /// Bitwise XOR.
    pub const XOR: Self = Self(1 << 2);

    /// Validates a raw 3-bit mode. Returns `None` unless exactly one bit is set.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !0x7 == 0 && bits.count_ones() == 1 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Raw mode bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Logic mode used by a single-cycle logic instruction.
    pub const fn for_opcode(op: Opcode) -> Option<Self> {
        match op {
            Opcode::And | Opcode::Andi => Some(Self::AND),
            Opcode::Or | Opcode::Ori => Some(Self::OR),
            Opcode::Xor | Opcode::Xori => Some(Self::XOR),
            _ => None,
        }
    }
}

/// Evaluates the logic function selected by `mode`.
#[inline]
pub const fn execute(mode: LogicMode, a1: u64, a2: u64) -> u64 {
    match mode.0 {
        1 => a1 & a2,
        2 => a1 | a2,
        _ => a1 ^ a2,
    }
}

/// Sampled inputs of the registered logic block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogicInput {
    /// Raw 3-bit mode; must be one-hot.
    pub mode: u8,
    /// First operand.
    pub a1: u64,
    /// Second operand.
    pub a2: u64,
}

/// Registered logic block: `res` is the result of the inputs sampled on the previous edge.
#[derive(Clone, Debug, Default)]
pub struct AluLogic {
    regs: Registers<u64>,
}

impl AluLogic {
    /// Creates the block with a zero output register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output register.
    #[inline]
    pub fn res(&self) -> u64 {
        *self.regs.r()
    }
}

impl ClockedStage for AluLogic {
    type Input = LogicInput;
    type Output = u64;

    /// # Panics
    ///
    /// Panics when `input.mode` is not one-hot; the encoding has no defined result otherwise.
    fn comb(&mut self, input: &LogicInput) -> u64 {
        let res = *self.regs.r();
        let Some(mode) = LogicMode::from_bits(input.mode) else {
            panic!("logic mode {:#05b} is not one-hot", input.mode);
        };
        *self.regs.begin() = execute(mode, input.a1, input.a2);
        res
    }

    fn clock(&mut self, reset: bool) {
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}
