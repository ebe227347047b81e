//! Exception taxonomy and simulator errors.
//!
//! This module separates the two kinds of failure the model knows about:
//! 1. **Architectural exceptions:** Values the core reports to the external trap controller as
//!    one-cycle pulses. They are data, never Rust errors.
//! 2. **Simulator errors:** Conditions that make the model itself unable to proceed, such as an
//!    invalid configuration or a combinational loop that never settles.

use std::fmt;

use thiserror::Error;

/// Architectural exception causes reported by the core.
///
/// Discriminants are the RISC-V cause codes; code 14 is reserved. The stack overflow and
/// underflow causes are implementation-specific extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Exception {
    /// Instruction address misaligned.
    ///
    /// Raised when a jump or branch target is not aligned to the instruction size.
    InstrMisalign = 0,

    /// Instruction access fault.
    InstrFault = 1,

    /// Illegal instruction.
    ///
    /// Raised for unsupported encodings and for CSR accesses the CSR file rejects.
    InstrIllegal = 2,

    /// Breakpoint (`EBREAK`).
    Breakpoint = 3,

    /// Load address misaligned.
    LoadMisalign = 4,

    /// Load access fault, reported by the data memory response.
    LoadFault = 5,

    /// Store address misaligned.
    StoreMisalign = 6,

    /// Store access fault, reported by the data memory response.
    StoreFault = 7,

    /// Environment call from U-mode.
    CallFromUmode = 8,

    /// Environment call from S-mode.
    CallFromSmode = 9,

    /// Environment call from H-mode.
    CallFromHmode = 10,

    /// Environment call from M-mode.
    CallFromMmode = 11,

    /// Instruction page fault.
    InstrPageFault = 12,

    /// Load page fault.
    LoadPageFault = 13,

    /// Store page fault.
    StorePageFault = 15,

    /// Stack pointer crossed the configured overflow boundary.
    StackOverflow = 16,

    /// Stack pointer crossed the configured underflow boundary.
    StackUnderflow = 17,
}

impl Exception {
    /// All exception causes in ascending code order.
    pub const ALL: [Self; 17] = [
        Self::InstrMisalign,
        Self::InstrFault,
        Self::InstrIllegal,
        Self::Breakpoint,
        Self::LoadMisalign,
        Self::LoadFault,
        Self::StoreMisalign,
        Self::StoreFault,
        Self::CallFromUmode,
        Self::CallFromSmode,
        Self::CallFromHmode,
        Self::CallFromMmode,
        Self::InstrPageFault,
        Self::LoadPageFault,
        Self::StorePageFault,
        Self::StackOverflow,
        Self::StackUnderflow,
    ];

    /// Returns the cause code written to `mcause`.
    #[inline]
    pub const fn code(self) -> u64 {
        self as u64
    }

    /// Looks up an exception by cause code. Code 14 and codes above 17 have no exception.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InstrMisalign => "InstructionAddressMisaligned",
            Self::InstrFault => "InstructionAccessFault",
            Self::InstrIllegal => "IllegalInstruction",
            Self::Breakpoint => "Breakpoint",
            Self::LoadMisalign => "LoadAddressMisaligned",
            Self::LoadFault => "LoadAccessFault",
            Self::StoreMisalign => "StoreAddressMisaligned",
            Self::StoreFault => "StoreAccessFault",
            Self::CallFromUmode => "EnvironmentCallFromUMode",
            Self::CallFromSmode => "EnvironmentCallFromSMode",
            Self::CallFromHmode => "EnvironmentCallFromHMode",
            Self::CallFromMmode => "EnvironmentCallFromMMode",
            Self::InstrPageFault => "InstructionPageFault",
            Self::LoadPageFault => "LoadPageFault",
            Self::StorePageFault => "StorePageFault",
            Self::StackOverflow => "StackOverflow",
            Self::StackUnderflow => "StackUnderflow",
        };
        write!(f, "{name}({})", self.code())
    }
}

/// Errors raised by the simulator itself rather than by the modelled program.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A value entering the core does not fit its declared signal width.
    #[error("signal `{signal}` value {value:#x} exceeds {width} bits")]
    WidthViolation {
        /// Name of the offending signal.
        signal: &'static str,
        /// Value that was presented.
        value: u64,
        /// Declared width in bits.
        width: u32,
    },

    /// Combinational signals did not reach a fixed point within the delta-cycle budget.
    #[error("combinational logic did not settle after {iterations} delta cycles at cycle {cycle}")]
    CombinationalLoop {
        /// Clock cycle at which settling failed.
        cycle: u64,
        /// Number of delta iterations attempted.
        iterations: usize,
    },

    /// A handshake was not completed within its cycle budget.
    #[error("{what} did not complete within {cycles} cycles")]
    Timeout {
        /// Operation that timed out.
        what: &'static str,
        /// Cycles waited.
        cycles: u64,
    },

    /// The debug port answered with an error.
    #[error("debug access rejected: {0}")]
    DebugRejected(String),

    /// A program image could not be assembled.
    #[error("program error: {0}")]
    Program(String),

    /// Underlying I/O failure (trace files, configuration files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a configuration or program file.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
