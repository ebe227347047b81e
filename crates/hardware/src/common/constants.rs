//! Structural Constants.
//!
//! These parameters fix the shape of the modelled core and are not negotiated at runtime.
//! It includes:
//! 1. **Widths:** Architecture, address, register-index, CSR-address, and tag widths.
//! 2. **Depths:** Memory-access queue depth and hazard tracker depth.
//! 3. **Registers:** Integer/floating-point register counts and well-known indices.
//! 4. **Reset:** The reset vector loaded into the next-PC register.

/// Register width of the architecture in bits.
pub const RISCV_ARCH: u32 = 64;

/// Width of program counters and memory addresses in bits.
pub const CPU_ADDR_BITS: u32 = 64;

/// Width of a register-file index (32 integer + 32 floating-point registers).
pub const REGS_BUS_WIDTH: u32 = 6;

/// Total number of addressable registers.
pub const REGS_TOTAL: usize = 1 << REGS_BUS_WIDTH;

/// Number of integer registers.
pub const INTREGS_TOTAL: usize = 32;

/// Index of the first floating-point register in the unified register file.
pub const FPUREGS_OFFSET: u8 = 32;

/// Width of a CSR address in bits.
pub const CSR_ADDR_WIDTH: u32 = 12;

/// Width of the CSR command bitfield.
pub const CSR_CMD_WIDTH: u32 = 9;

/// Depth of the FIFO between Execute and Memory-Access.
pub const MEMACCESS_QUEUE_DEPTH: usize = 2;

/// Width of the write-back tag. Wider than the queue depth so tags never alias in flight.
pub const REG_TAG_WIDTH: u32 = 3;

/// Number of pending load destinations the hazard tracker can hold: every queued entry plus
/// the one Memory-Access has in flight.
pub const HAZARD_DEPTH: usize = MEMACCESS_QUEUE_DEPTH + 1;

/// Number of multi-cycle functional unit slots (multiplier, divider, FPU).
pub const MULTI_SLOT_TOTAL: usize = 3;

/// Address the next-PC register takes on reset.
pub const RESET_VECTOR: u64 = 0x10000;

/// Size of a standard instruction in bytes.
pub const INSTRUCTION_SIZE_32: u64 = 4;

/// Size of a compressed instruction in bytes.
pub const INSTRUCTION_SIZE_16: u64 = 2;

/// Hardwired zero register.
pub const REG_ZERO: u8 = 0;

/// Return-address register (`ra`).
pub const REG_RA: u8 = 1;

/// Stack pointer register (`sp`).
pub const REG_SP: u8 = 2;

/// Upper bound of delta iterations when settling combinational signals within one tick.
pub const MAX_DELTA_CYCLES: usize = 16;
