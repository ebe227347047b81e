//! Program Loading.
//!
//! This module turns a program description into the stimulus the simulator feeds to Execute. It
//! performs:
//! 1. **Parsing:** Reads a JSON program image (instructions by mnemonic, initial registers and
//!    initial memory doublewords).
//! 2. **Encoding:** Builds each instruction word with [`Opcode::encode`] and checks every field
//!    against its signal width.
//! 3. **Feeding:** [`ProgramFeed`] presents the decoded instruction at a given PC, standing in
//!    for fetch and decode.
//!
//! ```
//! use rvpipe_core::sim::loader::ProgramImage;
//!
//! let json = r#"{
//!     "instructions": [
//!         { "op": "addi", "rd": 5, "rs1": 0, "imm": 7 },
//!         { "op": "add", "rd": 6, "rs1": 5, "rs2": 5 }
//!     ],
//!     "registers": { "1": 42 }
//! }"#;
//!
//! let image = ProgramImage::from_json(json).unwrap();
//! let feed = image.feed().unwrap();
//! assert_eq!(feed.len(), 2);
//! assert!(feed.at(image.base).is_some());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::bits::check_width;
use crate::common::constants::{INSTRUCTION_SIZE_32, REGS_BUS_WIDTH, RESET_VECTOR};
use crate::common::error::SimError;
use crate::core::pipeline::latches::DecodedInstr;
use crate::isa::opcode::Opcode;

/// One instruction of a program image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InstrSpec {
    /// Mnemonic, case-insensitive (`addi`, `fcvt.d.l`).
    pub op: String,
    /// Destination register.
    #[serde(default)]
    pub rd: u8,
    /// First source register (or CSR immediate).
    #[serde(default)]
    pub rs1: u8,
    /// Second source register.
    #[serde(default)]
    pub rs2: u8,
    /// Immediate (CSR address for CSR instructions).
    #[serde(default)]
    pub imm: i64,
}

/// An initial memory doubleword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MemInit {
    /// Byte address, 8-byte aligned.
    pub addr: u64,
    /// Value.
    pub value: u64,
}

/// Program image as read from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProgramImage {
    /// Address of the first instruction.
    #[serde(default = "ProgramImage::default_base")]
    pub base: u64,
    /// Instructions in program order.
    pub instructions: Vec<InstrSpec>,
    /// Initial register values by unified index (0..64).
    #[serde(default)]
    pub registers: BTreeMap<u8, u64>,
    /// Initial memory contents.
    #[serde(default)]
    pub memory: Vec<MemInit>,
}

impl ProgramImage {
    const fn default_base() -> u64 {
        RESET_VECTOR
    }

    /// Parses a JSON program image.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON program image.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`ProgramImage::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Encodes the instructions into a feed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Program`] for unknown mnemonics and [`SimError::WidthViolation`] for
    /// register fields that do not fit.
    pub fn feed(&self) -> Result<ProgramFeed, SimError> {
        let mut feed = ProgramFeed::new(self.base);
        for (n, spec) in self.instructions.iter().enumerate() {
            let op = Opcode::from_mnemonic(&spec.op)
                .ok_or_else(|| SimError::Program(format!("instruction {n}: unknown `{}`", spec.op)))?;
            check_width("rd", u64::from(spec.rd), 5)?;
            check_width("rs1", u64::from(spec.rs1), 5)?;
            check_width("rs2", u64::from(spec.rs2), 5)?;
            let _ = feed.push(op, spec.rd, spec.rs1, spec.rs2, spec.imm);
        }
        Ok(feed)
    }

    /// Initial register values, validated against the register index width.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthViolation`] for an index outside the register file.
    pub fn initial_registers(&self) -> Result<Vec<(u8, u64)>, SimError> {
        self.registers
            .iter()
            .map(|(&idx, &value)| {
                check_width("register index", u64::from(idx), REGS_BUS_WIDTH)?;
                Ok((idx, value))
            })
            .collect()
    }
}

/// Decoded instructions laid out from a base address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramFeed {
    base: u64,
    instrs: Vec<DecodedInstr>,
}

impl ProgramFeed {
    /// Creates an empty feed starting at `base`.
    pub const fn new(base: u64) -> Self {
        Self {
            base,
            instrs: Vec::new(),
        }
    }

    /// Appends an instruction.
    pub fn push(&mut self, op: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> &mut Self {
        let pc = self.end();
        self.instrs
            .push(DecodedInstr::new(pc, op.encode(rd, rs1, rs2, imm), op));
        self
    }

    /// Appends an already decoded instruction at the next address.
    pub fn push_decoded(&mut self, mut d: DecodedInstr) -> &mut Self {
        d.pc = self.end();
        self.instrs.push(d);
        self
    }

    /// Address of the first instruction.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Address one past the last instruction.
    pub fn end(&self) -> u64 {
        self.base + self.instrs.len() as u64 * INSTRUCTION_SIZE_32
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    /// True for an empty program.
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// True if `pc` addresses an instruction of the program.
    pub fn contains(&self, pc: u64) -> bool {
        self.at(pc).is_some()
    }

    /// Decoded instruction at `pc`.
    pub fn at(&self, pc: u64) -> Option<DecodedInstr> {
        let off = pc.checked_sub(self.base)?;
        if off % INSTRUCTION_SIZE_32 != 0 {
            return None;
        }
        let idx = usize::try_from(off / INSTRUCTION_SIZE_32).ok()?;
        self.instrs.get(idx).copied()
    }
}
