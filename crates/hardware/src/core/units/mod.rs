//! Execution units and functional components.
//!
//! This module contains the single-cycle integer datapath used inside Execute and the
//! behavioural models of the multi-cycle units Execute dispatches to.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Floating-Point Unit for double-precision operations.
pub mod fpu;

/// Multi-cycle unit handshake and the fixed-latency behavioural model.
pub mod multi;
