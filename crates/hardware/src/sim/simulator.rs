//! Simulator: the modelled core and its behavioural collaborators on one clock.
//!
//! Every cycle runs in two phases:
//! 1. **Settle:** Each component's `comb` is evaluated against the current signal set, and the
//!    whole set is re-evaluated until it stops changing. A set that has not settled after
//!    [`MAX_DELTA_CYCLES`] evaluations is a combinational loop.
//! 2. **Commit:** The register file write port, the CSR side effects of a taken trap, statistics
//!    and the VCD trace are updated from the settled signals, then every component is clocked.
//!
//! Reset is a level: with [`ResetMode::Sync`] it takes effect at the next edge, with
//! [`ResetMode::Async`] as soon as it is asserted.

use std::fs::File;
use std::io::BufWriter;

use crate::common::constants::MAX_DELTA_CYCLES;
use crate::common::error::SimError;
use crate::common::reg::RegisterFile;
use crate::config::Config;
use crate::core::debug::{DebugInput, DebugOutput, DebugPort, DportRequest};
use crate::core::pipeline::latches::{
    CsrResponse, DataMemResponse, ExecuteInput, ExecuteOutput, MemAccessInput, MemAccessOutput,
    UnitResponse,
};
use crate::core::pipeline::signals::MultiSlot;
use crate::core::pipeline::stages::execute::{ExecState, Execute};
use crate::core::pipeline::stages::memaccess::MemAccess;
use crate::core::pipeline::traits::{ClockedStage, ResetMode};
use crate::core::units::multi::{FunctionalUnit, LatencyUnit};
use crate::isa::opcode::ExecClass;
use crate::sim::loader::{ProgramFeed, ProgramImage};
use crate::sim::trace::VcdWriter;
use crate::soc::csr_file::CsrFile;
use crate::soc::interconnect::{CsrArbiter, CsrBusInput, CsrBusOutput};
use crate::soc::memory::DataMemory;
use crate::soc::trap::{TrapController, TrapInput, TrapOutput};
use crate::stats::SimStats;

/// Cycles a debug access may take before it is abandoned.
const DEBUG_TIMEOUT: u64 = 1_000;

/// Ports dumped to the VCD trace, in sample order.
const TRACE_PORTS: &[(&str, u32)] = &[
    ("reset", 1),
    ("exec_valid", 1),
    ("exec_pc", 64),
    ("exec_npc", 64),
    ("exec_instr", 32),
    ("exec_state", 3),
    ("exec_hold", 1),
    ("wb_wena", 1),
    ("wb_waddr", 6),
    ("wb_wdata", 64),
    ("memop_valid", 1),
    ("memop_ready", 1),
    ("dmem_req_valid", 1),
    ("dmem_req_addr", 64),
    ("dmem_resp_valid", 1),
    ("memacc_wena", 1),
    ("csr_req_valid", 1),
    ("csr_req_type", 9),
    ("csr_req_addr", 12),
    ("csr_resp_valid", 1),
    ("csr_owner", 1),
    ("trap_valid", 1),
    ("trap_ready", 1),
    ("exception", 1),
];

/// Settled signals of one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// Execute outputs.
    pub exec: ExecuteOutput,
    /// Memory-Access outputs.
    pub mem: MemAccessOutput,
    /// Functional unit responses, indexed by [`MultiSlot`].
    pub units: [UnitResponse; 3],
    /// CSR arbiter outputs.
    pub bus: CsrBusOutput,
    /// CSR file response.
    pub csr: CsrResponse,
    /// Data memory response.
    pub dmem: DataMemResponse,
    /// Trap controller outputs.
    pub trap: TrapOutput,
    /// Debug port outputs.
    pub dport: DebugOutput,
}

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Execute left the program image with nothing in flight.
    Finished,
    /// The cycle limit was reached.
    CycleLimit,
}

/// Top-level simulator.
pub struct Simulator {
    program: ProgramFeed,
    regfile: RegisterFile,
    execute: Execute,
    memaccess: MemAccess,
    units: Vec<Box<dyn FunctionalUnit>>,
    arbiter: CsrArbiter,
    csr: CsrFile,
    dmem: DataMemory,
    trap: TrapController,
    dport: DebugPort,
    dport_req: Option<DportRequest>,
    dport_resp: Option<DebugOutput>,
    signals: Signals,
    stats: SimStats,
    vcd: Option<VcdWriter<BufWriter<File>>>,
    reset_mode: ResetMode,
    reset: bool,
    cycle: u64,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("cycle", &self.cycle)
            .field("npc", &self.execute.npc())
            .field("state", &self.execute.state())
            .field("reset", &self.reset)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Builds the system from `config` with `program` presented to Execute.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for an invalid configuration and [`SimError::Io`] if the
    /// VCD trace cannot be created.
    pub fn new(config: &Config, program: ProgramFeed) -> Result<Self, SimError> {
        config.validate()?;
        let u = &config.units;
        let units: Vec<Box<dyn FunctionalUnit>> = vec![
            Box::new(LatencyUnit::new(MultiSlot::Mul, u.mul_latency)),
            Box::new(LatencyUnit::new(MultiSlot::Div, u.div_latency)),
            Box::new(LatencyUnit::new(MultiSlot::Fpu, u.fpu_latency)),
        ];
        let vcd = match &config.general.trace_vcd {
            Some(path) => Some(VcdWriter::create(path, "rvpipe", TRACE_PORTS)?),
            None => None,
        };
        Ok(Self {
            program,
            regfile: RegisterFile::new(),
            execute: Execute::new(config.general.fpu_enabled),
            memaccess: MemAccess::new(),
            units,
            arbiter: CsrArbiter::new(),
            csr: CsrFile::new(&config.csr),
            dmem: DataMemory::new(&config.memory),
            trap: TrapController::new(),
            dport: DebugPort::new(),
            dport_req: None,
            dport_resp: None,
            signals: Signals::default(),
            stats: SimStats::default(),
            vcd,
            reset_mode: config.general.reset_mode(),
            reset: false,
            cycle: 0,
        })
    }

    /// Builds the system and loads `image`: instructions, initial registers and memory.
    ///
    /// # Errors
    ///
    /// As [`Simulator::new`] and [`ProgramImage::feed`]; [`SimError::Program`] for memory
    /// contents outside the data memory.
    pub fn from_image(config: &Config, image: &ProgramImage) -> Result<Self, SimError> {
        let mut sim = Self::new(config, image.feed()?)?;
        for (idx, value) in image.initial_registers()? {
            sim.regfile.write(idx, value);
        }
        for m in &image.memory {
            if m.addr % 8 != 0 || !sim.dmem.poke(m.addr, m.value) {
                return Err(SimError::Program(format!(
                    "memory word at {:#x} is unaligned or outside the data memory",
                    m.addr
                )));
            }
        }
        Ok(sim)
    }

    /// Replaces the unit serving `unit.slot()`.
    #[must_use]
    pub fn with_unit(mut self, unit: Box<dyn FunctionalUnit>) -> Self {
        let k = unit.slot().index();
        self.units[k] = unit;
        self
    }

    /// Clock cycles elapsed.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Signals settled in the last cycle.
    pub const fn signals(&self) -> &Signals {
        &self.signals
    }

    /// Register file.
    pub const fn regs(&self) -> &RegisterFile {
        &self.regfile
    }

    /// Register file, for stimulus.
    pub fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regfile
    }

    /// CSR file.
    pub const fn csr(&self) -> &CsrFile {
        &self.csr
    }

    /// Data memory.
    pub const fn memory(&self) -> &DataMemory {
        &self.dmem
    }

    /// Data memory, for stimulus.
    pub fn memory_mut(&mut self) -> &mut DataMemory {
        &mut self.dmem
    }

    /// Execute stage.
    pub const fn execute(&self) -> &Execute {
        &self.execute
    }

    /// Memory-Access stage.
    pub const fn memaccess(&self) -> &MemAccess {
        &self.memaccess
    }

    /// CSR bus arbiter.
    pub const fn arbiter(&self) -> &CsrArbiter {
        &self.arbiter
    }

    /// Collected statistics.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Requests an external interrupt.
    pub fn raise_interrupt(&mut self, code: u64) {
        self.trap.raise_interrupt(code);
    }

    /// Drives the reset line.
    pub fn set_reset(&mut self, level: bool) {
        self.reset = level;
        if level && self.reset_mode == ResetMode::Async {
            self.reset_all();
        }
    }

    fn reset_all(&mut self) {
        self.execute.reset();
        self.memaccess.reset();
        for u in &mut self.units {
            u.reset();
        }
        self.arbiter.reset();
        self.csr.reset();
        self.dmem.reset();
        self.trap.reset();
        self.dport.reset();
        self.signals = Signals::default();
    }

    /// True once Execute has left the program with nothing in flight.
    pub fn finished(&self) -> bool {
        !self.program.contains(self.execute.npc())
            && self.execute.is_quiescent()
            && self.memaccess.is_drained()
            && self.trap.pending().is_none()
            && self.dport.is_idle()
    }

    /// One evaluation of every component against `w`.
    fn evaluate(&mut self, w: &Signals) -> Signals {
        let npc = self.execute.npc();
        let halted = self.csr.halted();
        let rf = &self.regfile;

        let exec = self.execute.comb(&ExecuteInput {
            d: self.program.at(npc),
            pipeline_hold: halted,
            rdata1: rf.read(w.exec.radr1),
            rdata2: rf.read(w.exec.radr2),
            rfdata1: rf.read(w.exec.radr1),
            rfdata2: rf.read(w.exec.radr2),
            wb_ready: !w.mem.wb.wena,
            memop_ready: w.mem.memop_ready,
            memop_commit: MemAccess::commit_of(&w.mem, true),
            csr: w.bus.m[0],
            units: w.units,
            trap: w.trap.trap,
            dport_npc: w.dport.npc_write,
        });

        let mem = self.memaccess.comb(&MemAccessInput {
            memop: w.exec.memop,
            flush: w.exec.flush,
            wb_ready: true,
            mem: w.dmem,
        });

        let mut units = [UnitResponse::default(); 3];
        for unit in &mut self.units {
            let k = unit.slot().index();
            units[k] = unit.comb(&w.exec.units[k]);
        }

        let bus = self.arbiter.comb(&CsrBusInput {
            m: [w.exec.csr, w.dport.csr],
            s0: w.csr,
        });
        let csr = self.csr.comb(&w.bus.s0);
        let dmem = self.dmem.comb(&w.mem.mem);

        let trap = self.trap.comb(&TrapInput {
            exceptions: w.exec.exceptions,
            load_fault: w.mem.load_fault,
            store_fault: w.mem.store_fault,
            fault_pc: w.mem.fault_pc,
            fault_addr: w.mem.fault_addr,
            trap_ready: w.exec.trap_ready,
            vector: self.csr.trap_vector(),
            npc,
        });

        let dport = self.dport.comb(&DebugInput {
            req: self.dport_req,
            resp_ready: true,
            csr: w.bus.m[1],
            rdata: self.regfile.read(w.dport.reg_raddr),
            reg_wready: !w.mem.wb.wena && !w.exec.wb.wena,
            npc,
            halted,
        });

        Signals {
            exec,
            mem,
            units,
            bus,
            csr,
            dmem,
            trap,
            dport,
        }
    }

    /// Iterates the evaluation to a fixed point.
    fn settle(&mut self) -> Result<Signals, SimError> {
        let mut w = Signals::default();
        for _ in 0..MAX_DELTA_CYCLES {
            let next = self.evaluate(&w);
            if next == w {
                return Ok(w);
            }
            w = next;
        }
        Err(SimError::CombinationalLoop {
            cycle: self.cycle,
            iterations: MAX_DELTA_CYCLES,
        })
    }

    /// Advances the system by one clock cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CombinationalLoop`] if the signals do not settle and
    /// [`SimError::Io`] if the trace cannot be written.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let w = self.settle()?;
        self.signals = w;

        if !self.reset {
            if w.mem.wb.wena {
                self.regfile.write(w.mem.wb.waddr, w.mem.wb.wdata);
            } else if w.exec.wb.wena {
                self.regfile.write(w.exec.wb.waddr, w.exec.wb.wdata);
            } else if let Some((idx, value)) = w.dport.reg_write {
                self.regfile.write(idx, value);
            }
            if let Some(t) = w.trap.taken {
                self.csr.record_trap(t.cause, t.epc, t.tval);
            }
            if !w.exec.exceptions.fpu.is_empty() {
                self.csr.accrue_fflags(w.exec.exceptions.fpu);
            }
            if w.exec.valid {
                self.csr.retire();
            }
            if w.dport.req_ready && self.dport_req.is_some() {
                self.dport_req = None;
            }
            if w.dport.resp_valid {
                self.dport_resp = Some(w.dport);
            }
            self.count(&w);
        }

        if let Some(vcd) = &mut self.vcd {
            let values = Self::trace_values(self.reset, self.execute.state(), &w);
            vcd.sample(self.cycle, &values)?;
        }

        let reset = self.reset;
        self.execute.clock(reset);
        self.memaccess.clock(reset);
        for u in &mut self.units {
            u.clock(reset);
        }
        self.arbiter.clock(reset);
        self.csr.clock(reset);
        self.dmem.clock(reset);
        self.trap.clock(reset);
        self.dport.clock(reset);

        self.stats.arbiter_grants = self.arbiter.grants();
        self.stats.mem_requests = self.dmem.requests();
        self.stats.traps = self.trap.taken();
        self.cycle += 1;
        Ok(())
    }

    fn count(&mut self, w: &Signals) {
        let s = &mut self.stats;
        s.cycles += 1;
        match self.execute.state() {
            ExecState::Hazard => s.stalls_hazard += 1,
            ExecState::Hold => s.stalls_hold += 1,
            _ if w.exec.pipeline_hold && self.csr.halted() => s.stalls_hold += 1,
            _ => {}
        }
        if !w.mem.memop_ready {
            s.queue_full += 1;
        }
        if w.exec.csr.req_valid || w.exec.csr.resp_ready {
            s.csr_wait += 1;
        }
        if w.exec.exceptions.any() || w.mem.load_fault || w.mem.store_fault {
            s.exceptions += 1;
        }
        if w.exec.valid {
            s.instructions += 1;
            let class = self.program.at(w.exec.pc).map(|d| d.opcode.class());
            match class {
                Some(ExecClass::Mul | ExecClass::Div | ExecClass::Fpu) => s.inst_multi += 1,
                _ => s.inst_single += 1,
            }
            match class {
                Some(ExecClass::Load) => s.inst_load += 1,
                Some(ExecClass::Store) => s.inst_store += 1,
                Some(ExecClass::Branch | ExecClass::Jump) => s.inst_branch += 1,
                Some(ExecClass::Csr | ExecClass::TrapReturn | ExecClass::Wfi) => s.inst_csr += 1,
                _ => {}
            }
        }
    }

    fn trace_values(reset: bool, state: ExecState, w: &Signals) -> Vec<u64> {
        let e = &w.exec;
        vec![
            u64::from(reset),
            u64::from(e.valid),
            e.pc,
            e.npc,
            u64::from(e.instr),
            state as u64,
            u64::from(e.pipeline_hold),
            u64::from(e.wb.wena),
            u64::from(e.wb.waddr),
            e.wb.wdata,
            u64::from(e.memop.is_some()),
            u64::from(w.mem.memop_ready),
            u64::from(w.mem.mem.valid),
            w.mem.mem.addr,
            u64::from(w.dmem.data_valid),
            u64::from(w.mem.wb.wena),
            u64::from(w.bus.s0.req_valid),
            u64::from(w.bus.s0.req_type.bits()),
            u64::from(w.bus.s0.req_addr),
            u64::from(w.csr.resp_valid),
            w.bus.owner as u64,
            u64::from(w.trap.trap.is_some()),
            u64::from(e.trap_ready),
            u64::from(e.exceptions.any()),
        ]
    }

    /// Runs until the program finishes or `max_cycles` cycles have elapsed in this call.
    ///
    /// # Errors
    ///
    /// As [`Simulator::tick`].
    pub fn run(&mut self, max_cycles: u64) -> Result<StopReason, SimError> {
        for _ in 0..max_cycles {
            if self.finished() {
                tracing::debug!("program finished at cycle {}", self.cycle);
                return Ok(StopReason::Finished);
            }
            self.tick()?;
        }
        Ok(if self.finished() {
            StopReason::Finished
        } else {
            StopReason::CycleLimit
        })
    }

    /// Performs a debug-port access, clocking the system until it is answered.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if no response arrives, [`SimError::DebugRejected`] if the
    /// port reports an error, and anything [`Simulator::tick`] returns.
    pub fn debug_access(&mut self, req: DportRequest) -> Result<u64, SimError> {
        self.dport_req = Some(req);
        self.dport_resp = None;
        for _ in 0..DEBUG_TIMEOUT {
            self.tick()?;
            if let Some(resp) = self.dport_resp.take() {
                if resp.error {
                    return Err(SimError::DebugRejected(format!("{req:?}")));
                }
                return Ok(resp.rdata);
            }
        }
        self.dport_req = None;
        Err(SimError::Timeout {
            what: "debug access",
            cycles: DEBUG_TIMEOUT,
        })
    }

    /// Flushes the VCD trace, if one is being written.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if flushing fails.
    pub fn finish_trace(&mut self) -> Result<(), SimError> {
        if let Some(vcd) = self.vcd.take() {
            let _ = vcd.finish()?;
        }
        Ok(())
    }
}
