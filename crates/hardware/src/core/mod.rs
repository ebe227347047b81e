//! Core processor implementation.
//!
//! This module contains the modelled pipeline (Execute and Memory-Access with their signal
//! bundles), the datapath units, and the debug port.

/// Debug port: CSR, register file and run-control access for external tools.
pub mod debug;

/// Instruction pipeline implementation (stages, latches, hazards, signals).
pub mod pipeline;

/// Execution units (ALU, FPU, multi-cycle unit models).
pub mod units;
