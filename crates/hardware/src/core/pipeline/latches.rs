//! Inter-stage signal bundles.
//!
//! Every connection between modelled components is one of the plain structs below. A component
//! reads an input bundle and drives an output bundle; nothing reaches into another component's
//! registers. All bundles derive `PartialEq` so the scheduler can detect when combinational
//! signals have settled.

use crate::common::constants::{FPUREGS_OFFSET, INSTRUCTION_SIZE_16, INSTRUCTION_SIZE_32};
use crate::core::pipeline::signals::{CsrCommand, MemopSize, MultiSlot};
use crate::core::units::fpu::exception_flags::FpFlags;
use crate::isa::instruction::InstructionBits;
use crate::isa::opcode::{Opcode, OpcodeInfo};

/// Decoded instruction presented by the decode stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedInstr {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Raw instruction word.
    pub instr: u32,
    /// Instruction tag.
    pub opcode: Opcode,
    /// Instruction is a 16-bit compressed encoding.
    pub compressed: bool,
    /// Decoder could not classify the instruction.
    pub unsup_exception: bool,
}

impl DecodedInstr {
    /// Builds a decoded instruction for a 32-bit encoding.
    pub const fn new(pc: u64, instr: u32, opcode: Opcode) -> Self {
        Self {
            pc,
            instr,
            opcode,
            compressed: false,
            unsup_exception: false,
        }
    }

    /// Static table entry of the tag.
    #[inline]
    pub fn info(&self) -> &'static OpcodeInfo {
        self.opcode.info()
    }

    /// Instruction length in bytes.
    #[inline]
    pub const fn len(&self) -> u64 {
        if self.compressed {
            INSTRUCTION_SIZE_16
        } else {
            INSTRUCTION_SIZE_32
        }
    }

    /// Unified index of the first source operand.
    pub fn radr1(&self) -> u8 {
        let bank = if self.info().fp_rs1 { FPUREGS_OFFSET } else { 0 };
        bank + self.instr.rs1()
    }

    /// Unified index of the second source operand.
    pub fn radr2(&self) -> u8 {
        let bank = if self.info().fp_rs2 { FPUREGS_OFFSET } else { 0 };
        bank + self.instr.rs2()
    }

    /// Unified index of the destination, or 0 when nothing is written.
    pub fn waddr(&self) -> u8 {
        let info = self.info();
        if !info.writes_rd {
            return 0;
        }
        if info.fp_rd {
            FPUREGS_OFFSET + self.instr.rd()
        } else {
            self.instr.rd()
        }
    }

    /// Registers this instruction depends on: sources that are read and a written destination.
    pub fn hazard_regs(&self) -> [Option<u8>; 3] {
        let info = self.info();
        let pick = |used: bool, idx: u8| (used && idx != 0).then_some(idx);
        [
            pick(info.reads_rs1, self.radr1()),
            pick(info.reads_rs2, self.radr2()),
            pick(true, self.waddr()),
        ]
    }
}

/// Register-file write port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WbPort {
    /// Write enable.
    pub wena: bool,
    /// Unified destination index.
    pub waddr: u8,
    /// Value to write.
    pub wdata: u64,
    /// Write-back tag; meaningful for results returned by Memory-Access.
    pub wtag: u8,
}

/// A write that retired from Memory-Access, used to clear the hazard tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WbCommit {
    /// Unified destination index.
    pub waddr: u8,
    /// Write-back tag.
    pub wtag: u8,
}

/// Memory operation pushed from Execute into the Memory-Access queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemopRequest {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Raw instruction word.
    pub instr: u32,
    /// Destination register for loads, 0 for stores.
    pub waddr: u8,
    /// Write-back tag.
    pub wtag: u8,
    /// Register value to store.
    pub wdata: u64,
    /// Sign-extend the loaded value.
    pub sign_ext: bool,
    /// Store (`true`) or load (`false`).
    pub store: bool,
    /// Access size.
    pub size: MemopSize,
    /// Effective address.
    pub addr: u64,
}

/// Request channel towards the data memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataMemRequest {
    /// Request valid.
    pub valid: bool,
    /// Write request.
    pub write: bool,
    /// Byte address.
    pub addr: u64,
    /// Lane-aligned write data.
    pub wdata: u64,
    /// Byte strobes within the 8-byte lane.
    pub wstrb: u8,
    /// Access size.
    pub size: MemopSize,
    /// Ready to accept a response.
    pub resp_ready: bool,
}

/// Response channel from the data memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataMemResponse {
    /// Memory can accept a request this cycle.
    pub req_ready: bool,
    /// Response valid.
    pub data_valid: bool,
    /// Address of the request being answered.
    pub data_addr: u64,
    /// The 8-byte aligned doubleword containing `data_addr`.
    pub data: u64,
    /// Load access fault.
    pub load_fault: bool,
    /// Store access fault.
    pub store_fault: bool,
}

/// Master-side CSR bus signals (request and response-ready).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsrRequest {
    /// Request valid.
    pub req_valid: bool,
    /// Command bitfield.
    pub req_type: CsrCommand,
    /// 12-bit CSR address.
    pub req_addr: u16,
    /// Write data or command argument.
    pub req_data: u64,
    /// Master can accept the response.
    pub resp_ready: bool,
}

/// Slave-side CSR bus signals (request-ready and response).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsrResponse {
    /// Slave accepts the request.
    pub req_ready: bool,
    /// Response valid.
    pub resp_valid: bool,
    /// Response data.
    pub resp_data: u64,
    /// Access rejected.
    pub resp_exception: bool,
}

/// Trigger side of a multi-cycle functional unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitRequest {
    /// One-shot enable.
    pub ena: bool,
    /// Operation latched in the slot.
    pub op: Option<Opcode>,
    /// First operand.
    pub a1: u64,
    /// Second operand.
    pub a2: u64,
}

/// Result side of a multi-cycle functional unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitResponse {
    /// Operation in progress.
    pub busy: bool,
    /// Result valid this cycle.
    pub valid: bool,
    /// Result value.
    pub result: u64,
    /// Floating-point exception flags accompanying the result.
    pub flags: FpFlags,
}

/// Exception pulses raised by Execute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionPulses {
    /// PC of the faulting instruction.
    pub pc: u64,
    /// Next PC at the time of the fault.
    pub npc: u64,
    /// Illegal or unsupported instruction.
    pub illegal_instr: bool,
    /// Misaligned load.
    pub unalign_load: bool,
    /// Misaligned store.
    pub unalign_store: bool,
    /// `EBREAK`.
    pub breakpoint: bool,
    /// `ECALL`.
    pub ecall: bool,
    /// FPU invalid operation, divide-by-zero, overflow, underflow, inexact.
    pub fpu: FpFlags,
}

impl ExceptionPulses {
    /// True when any pulse is asserted.
    pub fn any(&self) -> bool {
        self.illegal_instr
            || self.unalign_load
            || self.unalign_store
            || self.breakpoint
            || self.ecall
            || !self.fpu.is_empty()
    }
}

/// Inputs sampled by Execute each cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteInput {
    /// Decoded instruction, `None` when decode has nothing valid.
    pub d: Option<DecodedInstr>,
    /// External hold (halted core, upstream stall).
    pub pipeline_hold: bool,
    /// Integer operand 1.
    pub rdata1: u64,
    /// Integer operand 2.
    pub rdata2: u64,
    /// Floating-point operand 1. The register file is unified, so this port reads the same index
    /// as `rdata1`; Execute takes it for sources in the floating-point bank.
    pub rfdata1: u64,
    /// Floating-point operand 2, read at the index of `rdata2`.
    pub rfdata2: u64,
    /// Write-back port free this cycle.
    pub wb_ready: bool,
    /// Memory-Access queue can accept a request.
    pub memop_ready: bool,
    /// Memory-Access write retired this cycle.
    pub memop_commit: Option<WbCommit>,
    /// CSR bus response for master 0.
    pub csr: CsrResponse,
    /// Functional unit results, indexed by [`MultiSlot`].
    pub units: [UnitResponse; 3],
    /// Asynchronous trap: target PC.
    pub trap: Option<u64>,
    /// Debug-port write of the next PC.
    pub dport_npc: Option<u64>,
}

/// Outputs driven by Execute each cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteOutput {
    /// Unified register index of operand 1.
    pub radr1: u8,
    /// Unified register index of operand 2.
    pub radr2: u8,
    /// Write-back candidate.
    pub wb: WbPort,
    /// Upstream must keep presenting the current instruction.
    pub pipeline_hold: bool,
    /// Controller is waiting on a functional unit or a parked result.
    pub busy: bool,
    /// Memory operation pushed this cycle.
    pub memop: Option<MemopRequest>,
    /// Trap redirect: squash queued memory write-backs.
    pub flush: bool,
    /// CSR bus master 0.
    pub csr: CsrRequest,
    /// Functional unit triggers, indexed by [`MultiSlot`].
    pub units: [UnitRequest; 3],
    /// Exception pulses.
    pub exceptions: ExceptionPulses,
    /// FPU result accepted this cycle.
    pub fpu_valid: bool,
    /// Trap request accepted.
    pub trap_ready: bool,
    /// An instruction was accepted this cycle.
    pub valid: bool,
    /// PC of the accepted instruction.
    pub pc: u64,
    /// Registered next PC.
    pub npc: u64,
    /// Accepted instruction word.
    pub instr: u32,
    /// `CALL` pseudo-instruction accepted.
    pub call: bool,
    /// `RET` pseudo-instruction accepted.
    pub ret: bool,
    /// `MRET` accepted.
    pub mret: bool,
    /// `URET` accepted.
    pub uret: bool,
}

impl ExecuteOutput {
    /// Trigger of a single slot.
    #[inline]
    pub const fn unit(&self, slot: MultiSlot) -> &UnitRequest {
        &self.units[slot.index()]
    }
}

/// Inputs sampled by Memory-Access each cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemAccessInput {
    /// Request pushed by Execute.
    pub memop: Option<MemopRequest>,
    /// Mark every queued and in-flight entry as squashed.
    pub flush: bool,
    /// Write-back port accepts the result.
    pub wb_ready: bool,
    /// Data memory response channel.
    pub mem: DataMemResponse,
}

/// Outputs driven by Memory-Access each cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemAccessOutput {
    /// Queue can accept a request.
    pub memop_ready: bool,
    /// Write-back tuple.
    pub wb: WbPort,
    /// Data memory request channel.
    pub mem: DataMemRequest,
    /// Load access fault pulse.
    pub load_fault: bool,
    /// Store access fault pulse.
    pub store_fault: bool,
    /// PC of the faulting access.
    pub fault_pc: u64,
    /// Faulting address.
    pub fault_addr: u64,
}
