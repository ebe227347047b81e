//! Pipeline stage implementations.
//!
//! This module contains the two modelled stages of the back end. It includes:
//! 1. **Execute:** Issues instructions, resolves single-cycle operations, dispatches multi-cycle
//!    operations, and drives the CSR bus.
//! 2. **Memory-Access:** Queues memory operations and turns data memory responses into
//!    write-backs.

/// Instruction execute stage implementation.
pub mod execute;

/// Memory access stage implementation.
pub mod memaccess;

pub use execute::Execute;
pub use memaccess::MemAccess;
