//! Instruction pipeline implementation.
//!
//! This module contains the back end of the pipeline. It includes the following components:
//! 1. **Hazards:** Pending-load tracking against the register file.
//! 2. **Latches:** Signal bundles connecting stages, units, and slaves.
//! 3. **Queue:** The fixed-capacity FIFO between Execute and Memory-Access.
//! 4. **Signals:** Memory sizes, multi-cycle slots, and the CSR command bitfield.
//! 5. **Stages:** Execute and Memory-Access.
//! 6. **Traits:** Shadow registers and the two-phase stage interface.

/// Pending-load hazard tracker.
pub mod hazards;

/// Inter-stage signal bundles.
pub mod latches;

/// Fixed-capacity FIFO.
pub mod queue;

/// Control signals shared between stages.
pub mod signals;

/// Pipeline stage implementations (execute, memory access).
pub mod stages;

/// Traits for pipeline stage components.
pub mod traits;
