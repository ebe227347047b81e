//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct addressed by the core's 6-bit register index:
//! 1. **Unified Storage:** Indices 0..32 are integer registers, 32..64 floating-point registers.
//! 2. **Hardwired Zero:** Index 0 always reads zero and ignores writes.
//! 3. **Observability:** A dump routine for end-of-run inspection.

use super::constants::{FPUREGS_OFFSET, INTREGS_TOTAL, REGS_TOTAL};

/// ABI names of the integer registers.
const ABI_NAMES: [&str; INTREGS_TOTAL] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Unified register file with 32 integer and 32 floating-point registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u64; REGS_TOTAL],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register cleared.
    pub const fn new() -> Self {
        Self {
            regs: [0; REGS_TOTAL],
        }
    }

    /// Reads a register by unified index. Out-of-range indices wrap to the 6-bit field.
    #[inline]
    pub const fn read(&self, idx: u8) -> u64 {
        self.regs[(idx as usize) % REGS_TOTAL]
    }

    /// Writes a register by unified index. Writes to `x0` are ignored.
    #[inline]
    pub fn write(&mut self, idx: u8, val: u64) {
        let idx = (idx as usize) % REGS_TOTAL;
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Reads floating-point register `f{idx}`.
    #[inline]
    pub const fn read_f(&self, idx: u8) -> u64 {
        self.read(FPUREGS_OFFSET + (idx & 0x1f))
    }

    /// Writes floating-point register `f{idx}`.
    #[inline]
    pub fn write_f(&mut self, idx: u8, val: u64) {
        self.write(FPUREGS_OFFSET + (idx & 0x1f), val);
    }

    /// Prints the non-zero integer and floating-point registers to stdout.
    pub fn dump(&self) {
        for (i, name) in ABI_NAMES.iter().enumerate() {
            if self.regs[i] != 0 {
                println!("  x{i:<2} {name:<5} = {:#018x}", self.regs[i]);
            }
        }
        for i in 0..32 {
            let v = self.regs[FPUREGS_OFFSET as usize + i];
            if v != 0 {
                println!("  f{i:<2}       = {v:#018x} ({})", f64::from_bits(v));
            }
        }
    }
}
