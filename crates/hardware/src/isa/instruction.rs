//! Instruction field extraction.
//!
//! Provides bit extraction for the register indices, CSR address, and the five immediate
//! layouts of 32-bit RISC-V instruction words. Execute uses these to select operands once the
//! external decoder has classified the instruction.

use crate::common::bits::{field, sign_extend};

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for extracting a register index field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;

/// Field accessors for encoded instruction words.
pub trait InstructionBits {
    /// Extracts the major opcode (bits 0-6).
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    fn rd(&self) -> u8;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> u8;

    /// Extracts the second source register field (bits 20-24).
    fn rs2(&self) -> u8;

    /// Extracts the funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// Extracts the CSR address (bits 20-31).
    fn csr(&self) -> u16;

    /// I-type immediate, sign-extended.
    fn imm_i(&self) -> u64;

    /// S-type immediate, sign-extended.
    fn imm_s(&self) -> u64;

    /// SB-type (branch) immediate, sign-extended. Bit 0 is always zero.
    fn imm_b(&self) -> u64;

    /// U-type immediate with the low 12 bits cleared, sign-extended from bit 31.
    fn imm_u(&self) -> u64;

    /// UJ-type (jump) immediate, sign-extended. Bit 0 is always zero.
    fn imm_j(&self) -> u64;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> u8 {
        ((self >> 7) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rs1(&self) -> u8 {
        ((self >> 15) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rs2(&self) -> u8 {
        ((self >> 20) & REG_MASK) as u8
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        field(*self, 14, 12)
    }

    #[inline(always)]
    fn csr(&self) -> u16 {
        ((self >> 20) & CSR_MASK) as u16
    }

    fn imm_i(&self) -> u64 {
        sign_extend(u64::from(field(*self, 31, 20)), 12)
    }

    fn imm_s(&self) -> u64 {
        let v = (field(*self, 31, 25) << 5) | field(*self, 11, 7);
        sign_extend(u64::from(v), 12)
    }

    fn imm_b(&self) -> u64 {
        let v = (field(*self, 31, 31) << 12)
            | (field(*self, 7, 7) << 11)
            | (field(*self, 30, 25) << 5)
            | (field(*self, 11, 8) << 1);
        sign_extend(u64::from(v), 13)
    }

    fn imm_u(&self) -> u64 {
        sign_extend(u64::from(self & 0xFFFF_F000), 32)
    }

    fn imm_j(&self) -> u64 {
        let v = (field(*self, 31, 31) << 20)
            | (field(*self, 19, 12) << 12)
            | (field(*self, 20, 20) << 11)
            | (field(*self, 30, 21) << 1);
        sign_extend(u64::from(v), 21)
    }
}
