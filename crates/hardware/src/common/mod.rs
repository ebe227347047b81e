//! Common types and constants shared by every stage of the core model.
//!
//! This module provides the building blocks used across the pipeline. It includes:
//! 1. **Constants:** Structural widths, queue depths, register counts, and the reset vector.
//! 2. **Bit Helpers:** Masking, sign extension, and width checks for fixed-width signals.
//! 3. **Error Handling:** The architectural exception taxonomy and simulator-level errors.
//! 4. **Register Management:** A unified 64-entry integer plus floating-point register file.

/// Bit-vector helpers for fixed-width signals.
pub mod bits;

/// Structural constants of the core.
pub mod constants;

/// Exception taxonomy and simulator errors.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use error::{Exception, SimError};
pub use reg::RegisterFile;
