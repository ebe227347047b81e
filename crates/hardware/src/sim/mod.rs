//! Simulation harness.
//!
//! Provides the program loader, the cycle scheduler that drives the modelled core together
//! with its behavioural collaborators, and VCD trace output.

/// Program images and the instruction feed.
pub mod loader;

/// Cycle scheduler and top-level system.
pub mod simulator;

/// Value change dump output.
pub mod trace;

pub use loader::{ProgramFeed, ProgramImage};
pub use simulator::{Signals, Simulator, StopReason};
