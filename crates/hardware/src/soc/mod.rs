//! System-on-Chip (SoC) Components.
//!
//! This module organizes the slaves and controllers around the modelled core: the CSR file and
//! the arbiter in front of it, the data memory, and the trap controller.

/// CSR file slave.
pub mod csr_file;

/// CSR bus arbiter (2 masters, 1 slave).
pub mod interconnect;

/// Data memory and its latency models.
pub mod memory;

/// Trap controller.
pub mod trap;

pub use csr_file::CsrFile;
pub use interconnect::CsrArbiter;
pub use memory::DataMemory;
pub use trap::TrapController;
