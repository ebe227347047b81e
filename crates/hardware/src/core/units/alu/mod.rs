//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the single-cycle integer datapath used by Execute, plus the
//! M-extension arithmetic evaluated by the multi-cycle multiplier and divider models.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Slt, Sltu, and the Mul/Div/Rem family
//! - [`logic`]:      And, Or, Xor under a one-hot mode, combinational and registered
//! - [`shifts`]:     Sll, Srl, Sra

/// Integer arithmetic operations (add, subtract, compare, multiply, divide).
pub mod arithmetic;

/// Bitwise logic block (and, or, xor).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::isa::opcode::{ExecClass, Opcode};

use self::logic::LogicMode;

/// Arithmetic Logic Unit (ALU) for single-cycle integer operations.
pub struct Alu;

impl Alu {
    /// Executes a single-cycle ALU or shift operation.
    ///
    /// `a` is the first operand and `b` the second operand, already selected by encoding format
    /// (register, immediate, or shift amount). `LUI` returns `b`; `AUIPC` adds `b` to `a`, so
    /// the caller passes the PC as `a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvpipe_core::core::units::alu::Alu;
    /// use rvpipe_core::isa::opcode::Opcode;
    ///
    /// assert_eq!(Alu::execute(Opcode::Add, 42, 8), 50);
    /// assert_eq!(Alu::execute(Opcode::Addw, 0xFFFF_FFFF, 1), 0);
    /// assert_eq!(Alu::execute(Opcode::Slli, 0x1, 4), 0x10);
    /// assert_eq!(Alu::execute(Opcode::Xori, 0xFF, 0x0F), 0xF0);
    /// ```
    pub fn execute(op: Opcode, a: u64, b: u64) -> u64 {
        if let Some(mode) = LogicMode::for_opcode(op) {
            return logic::execute(mode, a, b);
        }
        match op.class() {
            ExecClass::Shift => shifts::execute(op, a, b),
            _ => match op {
                Opcode::Lui => b,
                Opcode::Auipc => a.wrapping_add(b),
                _ => arithmetic::execute(op, a, b),
            },
        }
    }

    /// Evaluates a conditional branch.
    pub fn branch_taken(op: Opcode, a: u64, b: u64) -> bool {
        match op {
            Opcode::Beq => a == b,
            Opcode::Bne => a != b,
            Opcode::Blt => (a as i64) < (b as i64),
            Opcode::Bge => (a as i64) >= (b as i64),
            Opcode::Bltu => a < b,
            Opcode::Bgeu => a >= b,
            _ => false,
        }
    }
}
