//! Instruction Set Architecture (ISA) Definitions.
//!
//! Decode is external to the modelled core; this module carries what Execute needs from it: the
//! instruction tag with its static properties, and field extraction from instruction words.

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Instruction tags, their static table, and encoding for stimulus.
pub mod opcode;
