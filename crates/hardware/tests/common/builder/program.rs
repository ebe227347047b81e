//! Fluent construction of test programs.

use rvpipe_core::common::constants::RESET_VECTOR;
use rvpipe_core::isa::opcode::Opcode;
use rvpipe_core::sim::ProgramFeed;

/// Builds a [`ProgramFeed`] one instruction at a time.
///
/// Register arguments are architectural indices; floating-point operands select the FP bank
/// through the opcode.
pub struct ProgramBuilder {
    feed: ProgramFeed,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::at(RESET_VECTOR)
    }

    pub fn at(base: u64) -> Self {
        Self {
            feed: ProgramFeed::new(base),
        }
    }

    /// PC the next instruction will get.
    pub fn pc(&self) -> u64 {
        self.feed.end()
    }

    fn op(mut self, op: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> Self {
        let _ = self.feed.push(op, rd, rs1, rs2, imm);
        self
    }

    pub fn addi(self, rd: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Addi, rd, rs1, 0, imm)
    }

    pub fn add(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Add, rd, rs1, rs2, 0)
    }

    pub fn sub(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Sub, rd, rs1, rs2, 0)
    }

    pub fn and(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::And, rd, rs1, rs2, 0)
    }

    pub fn or(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Or, rd, rs1, rs2, 0)
    }

    pub fn xori(self, rd: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Xori, rd, rs1, 0, imm)
    }

    pub fn lui(self, rd: u8, imm: i64) -> Self {
        self.op(Opcode::Lui, rd, 0, 0, imm)
    }

    pub fn ld(self, rd: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Ld, rd, rs1, 0, imm)
    }

    pub fn lw(self, rd: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Lw, rd, rs1, 0, imm)
    }

    pub fn sd(self, rs2: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Sd, 0, rs1, rs2, imm)
    }

    pub fn sb(self, rs2: u8, rs1: u8, imm: i64) -> Self {
        self.op(Opcode::Sb, 0, rs1, rs2, imm)
    }

    pub fn beq(self, rs1: u8, rs2: u8, offset: i64) -> Self {
        self.op(Opcode::Beq, 0, rs1, rs2, offset)
    }

    pub fn jal(self, rd: u8, offset: i64) -> Self {
        self.op(Opcode::Jal, rd, 0, 0, offset)
    }

    pub fn mul(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Mul, rd, rs1, rs2, 0)
    }

    pub fn div(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Div, rd, rs1, rs2, 0)
    }

    pub fn divu(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Divu, rd, rs1, rs2, 0)
    }

    pub fn rem(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::Rem, rd, rs1, rs2, 0)
    }

    pub fn fadd_d(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::FaddD, rd, rs1, rs2, 0)
    }

    pub fn fdiv_d(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::FdivD, rd, rs1, rs2, 0)
    }

    pub fn csrrw(self, rd: u8, csr: u16, rs1: u8) -> Self {
        self.op(Opcode::Csrrw, rd, rs1, 0, i64::from(csr))
    }

    pub fn csrrs(self, rd: u8, csr: u16, rs1: u8) -> Self {
        self.op(Opcode::Csrrs, rd, rs1, 0, i64::from(csr))
    }

    pub fn csrrci(self, rd: u8, csr: u16, zimm: u8) -> Self {
        self.op(Opcode::Csrrci, rd, zimm, 0, i64::from(csr))
    }

    pub fn mret(self) -> Self {
        self.op(Opcode::Mret, 0, 0, 0, 0)
    }

    pub fn ecall(self) -> Self {
        self.op(Opcode::Ecall, 0, 0, 0, 0)
    }

    pub fn ebreak(self) -> Self {
        self.op(Opcode::Ebreak, 0, 0, 0, 0)
    }

    pub fn amoadd_w(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.op(Opcode::AmoaddW, rd, rs1, rs2, 0)
    }

    pub fn nop(self) -> Self {
        self.addi(0, 0, 0)
    }

    pub fn build(self) -> ProgramFeed {
        self.feed
    }
}
