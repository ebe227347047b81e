//! Execute stage controller.
//!
//! Execute accepts one decoded instruction per cycle when the instruction's PC matches the
//! registered next-PC, resolves single-cycle operations in place, dispatches multi-cycle
//! operations to external units, pushes memory operations into the Memory-Access queue, and runs
//! CSR transactions over the CSR bus. It performs the following:
//! 1. **Issue:** Operand selection by encoding format, hazard check against pending loads, and
//!    next-PC update for branches and jumps.
//! 2. **Completion:** Write-back of single-cycle and multi-cycle results through the shared
//!    write-back port, parking a result while the port is busy.
//! 3. **Traps:** Redirect to the trap vector, discard parked and in-flight results, and squash
//!    queued loads.
//! 4. **Exceptions:** One-cycle pulses for illegal instructions, misaligned accesses, `ECALL`,
//!    `EBREAK`, and FPU flags.

use crate::common::bits::mask;
use crate::common::constants::{MULTI_SLOT_TOTAL, REG_RA, REG_TAG_WIDTH, REG_ZERO, RESET_VECTOR};
use crate::core::pipeline::hazards::HazardTracker;
use crate::core::pipeline::latches::{
    CsrRequest, CsrResponse, DecodedInstr, ExceptionPulses, ExecuteInput, ExecuteOutput,
    MemopRequest, UnitRequest, WbPort,
};
use crate::core::pipeline::signals::{CsrCommand, MultiSlot};
use crate::core::pipeline::traits::{ClockedStage, Registers};
use crate::core::units::alu::Alu;
use crate::isa::instruction::InstructionBits;
use crate::isa::opcode::{ExecClass, IsaType, Opcode};
use crate::soc::csr_file::addr as csr_addr;

/// Execute controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecState {
    /// Ready to accept an instruction.
    #[default]
    WaitInstr,
    /// Completing a single-issue operation: a parked result or a CSR transaction.
    SingleCycle,
    /// Waiting for a multi-cycle unit.
    MultiCycle,
    /// Structural stall: queue full or unit slot busy.
    Hold,
    /// Data hazard against a pending load.
    Hazard,
}

/// Phase of the CSR bus transaction owned by Execute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum CsrPhase {
    #[default]
    Idle,
    Request,
    Response,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CsrXfer {
    phase: CsrPhase,
    cmd: CsrCommand,
    addr: u16,
    data: u64,
    /// Response is consumed but ignored (trap arrived mid-transaction).
    discard: bool,
}

/// Latched operands and status of one multi-cycle slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SlotRegs {
    busy: bool,
    ena: bool,
    suppress_wb: bool,
    op: Option<Opcode>,
    a1: u64,
    a2: u64,
}

/// Instruction whose completion is pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct InFlight {
    pc: u64,
    instr: u32,
    opcode: Option<Opcode>,
    waddr: u8,
    res: u64,
    operand: u64,
    write_pending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ExecRegs {
    state: ExecState,
    npc: u64,
    cur: InFlight,
    slots: [SlotRegs; MULTI_SLOT_TOTAL],
    hazard: HazardTracker,
    tag: u8,
    csr: CsrXfer,
}

impl Default for ExecRegs {
    fn default() -> Self {
        Self {
            state: ExecState::WaitInstr,
            npc: RESET_VECTOR,
            cur: InFlight::default(),
            slots: [SlotRegs::default(); MULTI_SLOT_TOTAL],
            hazard: HazardTracker::new(),
            tag: 0,
            csr: CsrXfer::default(),
        }
    }
}

/// Execute stage.
#[derive(Clone, Debug)]
pub struct Execute {
    regs: Registers<ExecRegs>,
    fpu_enabled: bool,
}

impl Default for Execute {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Return-address CSR read by a trap-return instruction.
const fn xepc(op: Opcode) -> u16 {
    match op {
        Opcode::Uret => csr_addr::UEPC,
        Opcode::Sret => csr_addr::SEPC,
        Opcode::Hret => csr_addr::HEPC,
        _ => csr_addr::MEPC,
    }
}

impl Execute {
    /// Creates the controller. With `fpu_enabled` false, floating-point instructions raise
    /// illegal-instruction.
    pub fn new(fpu_enabled: bool) -> Self {
        Self {
            regs: Registers::new(),
            fpu_enabled,
        }
    }

    /// Registered next PC.
    pub fn npc(&self) -> u64 {
        self.regs.r().npc
    }

    /// Registered controller state.
    pub fn state(&self) -> ExecState {
        self.regs.r().state
    }

    /// Pending load destinations.
    pub fn hazards(&self) -> &HazardTracker {
        &self.regs.r().hazard
    }

    /// True when a slot is computing.
    pub fn slot_busy(&self, slot: MultiSlot) -> bool {
        self.regs.r().slots[slot.index()].busy
    }

    /// True when nothing is in flight inside the controller.
    pub fn is_quiescent(&self) -> bool {
        let r = self.regs.r();
        matches!(r.state, ExecState::WaitInstr | ExecState::Hold | ExecState::Hazard)
            && r.csr.phase == CsrPhase::Idle
            && r.slots.iter().all(|s| !s.busy)
    }

    /// Drives the CSR bus for the outstanding transaction. Returns the response once it is
    /// consumed, unless the transaction was discarded by a trap.
    fn drive_csr(
        r: &ExecRegs,
        v: &mut ExecRegs,
        i: &ExecuteInput,
        o: &mut ExecuteOutput,
    ) -> Option<CsrResponse> {
        match r.csr.phase {
            CsrPhase::Idle => None,
            CsrPhase::Request => {
                o.csr = CsrRequest {
                    req_valid: true,
                    req_type: r.csr.cmd,
                    req_addr: r.csr.addr,
                    req_data: r.csr.data,
                    resp_ready: false,
                };
                if i.csr.req_ready {
                    v.csr.phase = CsrPhase::Response;
                }
                None
            }
            CsrPhase::Response => {
                o.csr.resp_ready = true;
                if !i.csr.resp_valid {
                    return None;
                }
                v.csr.phase = CsrPhase::Idle;
                v.csr.discard = false;
                (!r.csr.discard).then_some(i.csr)
            }
        }
    }

    /// Trap redirect: the pending state is abandoned and queued loads are squashed.
    fn take_trap(v: &mut ExecRegs, target: u64, o: &mut ExecuteOutput) {
        o.trap_ready = true;
        o.pipeline_hold = true;
        o.flush = true;
        v.npc = target;
        v.state = ExecState::WaitInstr;
        v.cur = InFlight::default();
        if v.csr.phase != CsrPhase::Idle {
            v.csr.discard = true;
        }
        for slot in &mut v.slots {
            if slot.busy {
                slot.suppress_wb = true;
            }
        }
        v.hazard.flush();
    }

    /// Writes `result` to the pending destination, or parks it while the port is busy.
    fn complete(v: &mut ExecRegs, i: &ExecuteInput, o: &mut ExecuteOutput, waddr: u8, result: u64) {
        if waddr == REG_ZERO {
            v.state = ExecState::WaitInstr;
        } else if i.wb_ready {
            o.wb = WbPort {
                wena: true,
                waddr,
                wdata: result,
                wtag: 0,
            };
            v.state = ExecState::WaitInstr;
        } else {
            v.cur.waddr = waddr;
            v.cur.res = result;
            v.state = ExecState::SingleCycle;
        }
    }

    /// Marks `d` as accepted and advances the next PC.
    fn accept(v: &mut ExecRegs, o: &mut ExecuteOutput, d: &DecodedInstr, npc: u64) {
        let w = d.instr;
        o.valid = true;
        o.pc = d.pc;
        o.npc = npc;
        o.instr = w;
        o.call = matches!(d.opcode, Opcode::Jal | Opcode::Jalr) && w.rd() == REG_RA;
        o.ret = d.opcode == Opcode::Jalr && w.rs1() == REG_RA && w.rd() == REG_ZERO;
        o.mret = d.opcode == Opcode::Mret;
        o.uret = d.opcode == Opcode::Uret;
        v.npc = npc;
        v.state = ExecState::WaitInstr;
    }

    fn pulse(o: &mut ExecuteOutput, pc: u64, npc: u64) -> &mut ExceptionPulses {
        o.exceptions.pc = pc;
        o.exceptions.npc = npc;
        &mut o.exceptions
    }

    fn stall(v: &mut ExecRegs, o: &mut ExecuteOutput, state: ExecState) {
        v.state = state;
        o.pipeline_hold = true;
    }

    fn uses_fpu(d: &DecodedInstr) -> bool {
        let info = d.info();
        info.class == ExecClass::Fpu || info.fp_rd || info.fp_rs1 || info.fp_rs2
    }

    fn try_issue(&self, r: &ExecRegs, v: &mut ExecRegs, i: &ExecuteInput, o: &mut ExecuteOutput) {
        v.state = ExecState::WaitInstr;
        let Some(d) = i.d else {
            return;
        };
        if d.pc != r.npc || i.dport_npc.is_some() {
            return;
        }
        if i.pipeline_hold {
            o.pipeline_hold = true;
            return;
        }
        if r.csr.phase != CsrPhase::Idle {
            Self::stall(v, o, ExecState::Hold);
            return;
        }
        // The registered tracker: a load retiring this cycle writes the register file at the
        // edge, so its dependants issue one cycle later.
        if r.hazard.conflicts(&d.hazard_regs()) {
            Self::stall(v, o, ExecState::Hazard);
            return;
        }

        let info = d.info();
        let w = d.instr;
        let next = d.pc.wrapping_add(d.len());

        if d.unsup_exception
            || info.class == ExecClass::Atomic
            || (!self.fpu_enabled && Self::uses_fpu(&d))
        {
            Self::pulse(o, d.pc, next).illegal_instr = true;
            Self::accept(v, o, &d, next);
            return;
        }

        let rs1v = if info.fp_rs1 { i.rfdata1 } else { i.rdata1 };
        let rs2v = if info.fp_rs2 { i.rfdata2 } else { i.rdata2 };

        match info.class {
            ExecClass::Alu | ExecClass::Shift => {
                let (a, b) = match info.isa_type {
                    IsaType::I => (rs1v, w.imm_i()),
                    IsaType::U => (d.pc, w.imm_u()),
                    _ => (rs1v, rs2v),
                };
                Self::accept(v, o, &d, next);
                Self::complete(v, i, o, d.waddr(), Alu::execute(d.opcode, a, b));
            }
            ExecClass::Branch => {
                let target = if Alu::branch_taken(d.opcode, rs1v, rs2v) {
                    d.pc.wrapping_add(w.imm_b())
                } else {
                    next
                };
                Self::accept(v, o, &d, target);
            }
            ExecClass::Jump => {
                let target = if d.opcode == Opcode::Jal {
                    d.pc.wrapping_add(w.imm_j())
                } else {
                    rs1v.wrapping_add(w.imm_i()) & !1
                };
                Self::accept(v, o, &d, target);
                Self::complete(v, i, o, d.waddr(), next);
            }
            ExecClass::Load | ExecClass::Store => {
                let store = info.class == ExecClass::Store;
                let imm = if store { w.imm_s() } else { w.imm_i() };
                let addr = rs1v.wrapping_add(imm);
                if !info.memop_size.is_aligned(addr) {
                    let p = Self::pulse(o, d.pc, next);
                    p.unalign_load = !store;
                    p.unalign_store = store;
                    Self::accept(v, o, &d, next);
                    return;
                }
                let waddr = d.waddr();
                if !i.memop_ready || (waddr != REG_ZERO && v.hazard.is_full()) {
                    Self::stall(v, o, ExecState::Hold);
                    return;
                }
                let tag = r.tag;
                v.tag = (tag + 1) & mask(REG_TAG_WIDTH) as u8;
                o.memop = Some(MemopRequest {
                    pc: d.pc,
                    instr: w,
                    waddr,
                    wtag: tag,
                    wdata: rs2v,
                    sign_ext: info.sign_ext,
                    store,
                    size: info.memop_size,
                    addr,
                });
                if !store {
                    let _ = v.hazard.issue(waddr, tag);
                }
                Self::accept(v, o, &d, next);
            }
            ExecClass::Mul | ExecClass::Div | ExecClass::Fpu => {
                let Some(slot) = info.class.slot() else {
                    return;
                };
                let busy = MultiSlot::ALL
                    .iter()
                    .any(|s| r.slots[s.index()].busy || i.units[s.index()].busy);
                if busy {
                    Self::stall(v, o, ExecState::Hold);
                    return;
                }
                v.slots[slot.index()] = SlotRegs {
                    busy: true,
                    ena: true,
                    suppress_wb: false,
                    op: Some(d.opcode),
                    a1: rs1v,
                    a2: rs2v,
                };
                v.cur = InFlight {
                    pc: d.pc,
                    instr: w,
                    opcode: Some(d.opcode),
                    waddr: d.waddr(),
                    ..InFlight::default()
                };
                Self::accept(v, o, &d, next);
                v.state = ExecState::MultiCycle;
            }
            ExecClass::Csr => {
                let rs1 = w.rs1();
                let operand = if info.reads_rs1 { rs1v } else { u64::from(rs1) };
                let swap = matches!(d.opcode, Opcode::Csrrw | Opcode::Csrrwi);
                let needs_write = swap || rs1 != REG_ZERO;
                let needs_read = !(swap && w.rd() == REG_ZERO);
                v.csr = CsrXfer {
                    phase: CsrPhase::Request,
                    cmd: if needs_read {
                        CsrCommand::READ
                    } else {
                        CsrCommand::WRITE
                    },
                    addr: w.csr(),
                    data: if needs_read { 0 } else { operand },
                    discard: false,
                };
                v.cur = InFlight {
                    pc: d.pc,
                    instr: w,
                    opcode: Some(d.opcode),
                    waddr: d.waddr(),
                    res: 0,
                    operand,
                    write_pending: needs_read && needs_write,
                };
                Self::accept(v, o, &d, next);
                v.state = ExecState::SingleCycle;
            }
            ExecClass::TrapReturn | ExecClass::Wfi => {
                let (cmd, addr) = if info.class == ExecClass::Wfi {
                    (CsrCommand::WFI, 0)
                } else {
                    (CsrCommand::TRAP_RETURN, xepc(d.opcode))
                };
                v.csr = CsrXfer {
                    phase: CsrPhase::Request,
                    cmd,
                    addr,
                    data: 0,
                    discard: false,
                };
                v.cur = InFlight {
                    pc: d.pc,
                    instr: w,
                    opcode: Some(d.opcode),
                    ..InFlight::default()
                };
                Self::accept(v, o, &d, next);
                v.state = ExecState::SingleCycle;
            }
            ExecClass::Ecall => {
                Self::pulse(o, d.pc, next).ecall = true;
                Self::accept(v, o, &d, next);
            }
            ExecClass::Ebreak => {
                Self::pulse(o, d.pc, next).breakpoint = true;
                Self::accept(v, o, &d, next);
            }
            ExecClass::Fence | ExecClass::Atomic => Self::accept(v, o, &d, next),
        }
    }

    /// Consumes a CSR response for the pending instruction.
    fn csr_response(
        r: &ExecRegs,
        v: &mut ExecRegs,
        i: &ExecuteInput,
        o: &mut ExecuteOutput,
        resp: CsrResponse,
    ) {
        let Some(op) = r.cur.opcode else {
            v.state = ExecState::WaitInstr;
            return;
        };
        if resp.resp_exception {
            Self::pulse(o, r.cur.pc, r.npc).illegal_instr = true;
            v.state = ExecState::WaitInstr;
            return;
        }
        match op.class() {
            ExecClass::TrapReturn => {
                v.npc = resp.resp_data;
                v.state = ExecState::WaitInstr;
            }
            ExecClass::Csr if r.csr.cmd == CsrCommand::READ && r.cur.write_pending => {
                let old = resp.resp_data;
                let operand = r.cur.operand;
                let new = match op {
                    Opcode::Csrrs | Opcode::Csrrsi => old | operand,
                    Opcode::Csrrc | Opcode::Csrrci => old & !operand,
                    _ => operand,
                };
                v.cur.res = old;
                v.cur.write_pending = false;
                v.csr = CsrXfer {
                    phase: CsrPhase::Request,
                    cmd: CsrCommand::WRITE,
                    addr: r.csr.addr,
                    data: new,
                    discard: false,
                };
            }
            ExecClass::Csr => {
                let old = if r.csr.cmd == CsrCommand::READ {
                    resp.resp_data
                } else {
                    r.cur.res
                };
                Self::complete(v, i, o, r.cur.waddr, old);
            }
            _ => v.state = ExecState::WaitInstr,
        }
    }
}

impl ClockedStage for Execute {
    type Input = ExecuteInput;
    type Output = ExecuteOutput;

    fn comb(&mut self, i: &ExecuteInput) -> ExecuteOutput {
        let r = *self.regs.r();
        let mut v = r;
        let mut o = ExecuteOutput {
            npc: r.npc,
            ..ExecuteOutput::default()
        };
        if let Some(d) = &i.d {
            o.radr1 = d.radr1();
            o.radr2 = d.radr2();
        }

        for slot in MultiSlot::ALL {
            let k = slot.index();
            let s = &r.slots[k];
            o.units[k] = UnitRequest {
                ena: s.ena,
                op: s.op,
                a1: s.a1,
                a2: s.a2,
            };
            v.slots[k].ena = false;
        }

        if let Some(c) = i.memop_commit {
            let _ = v.hazard.commit(c.waddr, c.wtag);
        }

        let mut unit_done = None;
        for slot in MultiSlot::ALL {
            let k = slot.index();
            if r.slots[k].busy && i.units[k].valid {
                v.slots[k].busy = false;
                v.slots[k].suppress_wb = false;
                if !r.slots[k].suppress_wb {
                    unit_done = Some((slot, i.units[k]));
                }
            }
        }

        let csr_done = Self::drive_csr(&r, &mut v, i, &mut o);

        if let Some(target) = i.trap {
            Self::take_trap(&mut v, target, &mut o);
        } else {
            if let Some(npc) = i.dport_npc {
                v.npc = npc;
            }
            match r.state {
                ExecState::MultiCycle => {
                    o.busy = true;
                    o.pipeline_hold = true;
                    if let Some((slot, resp)) = unit_done {
                        if slot == MultiSlot::Fpu {
                            o.fpu_valid = true;
                            if !resp.flags.is_empty() {
                                Self::pulse(&mut o, r.cur.pc, r.npc).fpu = resp.flags;
                            }
                        }
                        Self::complete(&mut v, i, &mut o, r.cur.waddr, resp.result);
                    }
                }
                ExecState::SingleCycle => {
                    o.busy = true;
                    o.pipeline_hold = true;
                    if r.csr.phase == CsrPhase::Idle {
                        Self::complete(&mut v, i, &mut o, r.cur.waddr, r.cur.res);
                    } else if let Some(resp) = csr_done {
                        Self::csr_response(&r, &mut v, i, &mut o, resp);
                    }
                }
                ExecState::WaitInstr | ExecState::Hold | ExecState::Hazard => {
                    self.try_issue(&r, &mut v, i, &mut o);
                }
            }
        }

        *self.regs.begin() = v;
        o
    }

    fn clock(&mut self, reset: bool) {
        let (from, to) = (self.regs.r().state, self.regs.v().state);
        if from != to && !reset {
            tracing::trace!(?from, ?to, "execute state");
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}
