//! RISC-V pipelined core model.
//!
//! This crate implements a cycle-accurate model of the back end of a 64-bit RISC-V core:
//! 1. **Core:** Execute controller, Memory-Access stage with its two-entry queue, ALU, and the
//!    debug port.
//! 2. **SoC:** CSR file behind a two-master arbiter, data memory, and trap controller.
//! 3. **ISA:** Instruction tags with their static decode table and an encoder for stimulus.
//! 4. **Simulation:** Program loader, fixed-point cycle scheduler, VCD trace, and statistics.

/// Common types and constants (widths, bit helpers, exceptions, register file).
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures).
pub mod config;
/// Modelled core (pipeline stages, units, debug port).
pub mod core;
/// Instruction tags and encoding.
pub mod isa;
/// Program loading, scheduling, and tracing.
pub mod sim;
/// Slaves and controllers around the core (CSR file, arbiter, memory, traps).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator; construct with `Simulator::new` or `Simulator::from_image`.
pub use crate::sim::Simulator;
