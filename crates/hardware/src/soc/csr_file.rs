//! CSR register file (bus slave).
//!
//! The CSR file sits behind the CSR bus arbiter and answers one command at a time. A request is
//! accepted when the file is idle; the response becomes valid a configured number of cycles
//! later and is held until the master takes it. Commands:
//! 1. **READ / WRITE:** Return the current value; a write takes effect at the clock edge.
//!    Unknown addresses, and writes to the read-only range (`0xC00..=0xFFF`), respond with an
//!    exception.
//! 2. **TRAP_RETURN:** Returns the return address held in the addressed `xepc`.
//! 3. **EXCEPTION / INTERRUPT:** Records `mepc` (request data) and `mcause` (request address)
//!    and returns `mtvec`.
//! 4. **BREAKPOINT / HALT / RESUME:** Debug run control through the `halted` flag.
//! 5. **WFI:** Completes immediately; no interrupt source is modelled behind it.

use std::collections::HashMap;

use crate::config::CsrConfig;
use crate::core::pipeline::latches::{CsrRequest, CsrResponse};
use crate::core::pipeline::signals::CsrCommand;
use crate::core::pipeline::traits::{ClockedStage, Registers};
use crate::core::units::fpu::exception_flags::FpFlags;

/// CSR addresses implemented by the file.
pub mod addr {
    /// Accrued floating-point exception flags.
    pub const FFLAGS: u16 = 0x001;
    /// Floating-point rounding mode.
    pub const FRM: u16 = 0x002;
    /// Floating-point control and status (`frm` and `fflags`).
    pub const FCSR: u16 = 0x003;
    /// User exception program counter.
    pub const UEPC: u16 = 0x041;
    /// Supervisor exception program counter.
    pub const SEPC: u16 = 0x141;
    /// Hypervisor exception program counter.
    pub const HEPC: u16 = 0x241;
    /// Machine status.
    pub const MSTATUS: u16 = 0x300;
    /// ISA and extensions.
    pub const MISA: u16 = 0x301;
    /// Machine interrupt enable.
    pub const MIE: u16 = 0x304;
    /// Machine trap vector.
    pub const MTVEC: u16 = 0x305;
    /// Machine scratch.
    pub const MSCRATCH: u16 = 0x340;
    /// Machine exception program counter.
    pub const MEPC: u16 = 0x341;
    /// Machine trap cause.
    pub const MCAUSE: u16 = 0x342;
    /// Machine trap value.
    pub const MTVAL: u16 = 0x343;
    /// Machine interrupt pending.
    pub const MIP: u16 = 0x344;
    /// Debug control and status.
    pub const DCSR: u16 = 0x7B0;
    /// Debug program counter.
    pub const DPC: u16 = 0x7B1;
    /// Machine cycle counter.
    pub const MCYCLE: u16 = 0xB00;
    /// Machine retired-instruction counter.
    pub const MINSTRET: u16 = 0xB02;
    /// Cycle counter (read-only shadow).
    pub const CYCLE: u16 = 0xC00;
    /// Retired-instruction counter (read-only shadow).
    pub const INSTRET: u16 = 0xC02;
    /// Vendor ID.
    pub const MVENDORID: u16 = 0xF11;
    /// Architecture ID.
    pub const MARCHID: u16 = 0xF12;
    /// Implementation ID.
    pub const MIMPID: u16 = 0xF13;
    /// Hart ID.
    pub const MHARTID: u16 = 0xF14;
}

/// `misa` for RV64IMFD.
const MISA_RV64IMFD: u64 = (2 << 62) | (1 << 8) | (1 << 12) | (1 << 5) | (1 << 3);

/// True for addresses the privileged architecture marks read-only (`csr[11:10] == 0b11`).
#[inline]
pub const fn is_read_only(a: u16) -> bool {
    (a >> 10) & 0x3 == 0x3
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum CsrState {
    #[default]
    Idle,
    Busy(u32),
    Respond,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CsrRegs {
    state: CsrState,
    resp_data: u64,
    resp_exception: bool,
    halted: bool,
}

/// A write scheduled by the command accepted this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingWrite {
    addr: u16,
    value: u64,
}

/// CSR register file slave.
#[derive(Clone, Debug)]
pub struct CsrFile {
    regs: Registers<CsrRegs>,
    storage: HashMap<u16, u64>,
    /// Writes of the command accepted this cycle, applied at the edge.
    pending: Vec<PendingWrite>,
    latency: u32,
    reset_storage: HashMap<u16, u64>,
}

impl CsrFile {
    /// Creates the file with reset values derived from `config`.
    pub fn new(config: &CsrConfig) -> Self {
        let storage: HashMap<u16, u64> = [
            (addr::FFLAGS, 0),
            (addr::FRM, 0),
            (addr::UEPC, 0),
            (addr::SEPC, 0),
            (addr::HEPC, 0),
            (addr::MSTATUS, 0),
            (addr::MISA, MISA_RV64IMFD),
            (addr::MIE, 0),
            (addr::MTVEC, config.trap_vector),
            (addr::MSCRATCH, 0),
            (addr::MEPC, 0),
            (addr::MCAUSE, 0),
            (addr::MTVAL, 0),
            (addr::MIP, 0),
            (addr::DCSR, 0),
            (addr::DPC, 0),
            (addr::MCYCLE, 0),
            (addr::MINSTRET, 0),
            (addr::MVENDORID, 0),
            (addr::MARCHID, 0),
            (addr::MIMPID, 0),
            (addr::MHARTID, config.hart_id),
        ]
        .into_iter()
        .collect();
        Self {
            regs: Registers::new(),
            reset_storage: storage.clone(),
            storage,
            pending: Vec::new(),
            latency: config.latency.max(1),
        }
    }

    /// Current value of a CSR, or `None` for an unimplemented address.
    pub fn read(&self, a: u16) -> Option<u64> {
        match a {
            addr::FCSR => {
                let frm = self.storage.get(&addr::FRM).copied().unwrap_or(0);
                let fflags = self.storage.get(&addr::FFLAGS).copied().unwrap_or(0);
                Some((frm << 5) | fflags)
            }
            addr::CYCLE => self.storage.get(&addr::MCYCLE).copied(),
            addr::INSTRET => self.storage.get(&addr::MINSTRET).copied(),
            _ => self.storage.get(&a).copied(),
        }
    }

    /// Writes a CSR directly, bypassing the bus. Unknown addresses are ignored.
    pub fn poke(&mut self, a: u16, value: u64) {
        match a {
            addr::FCSR => {
                let _ = self.storage.insert(addr::FRM, (value >> 5) & 0x7);
                let _ = self.storage.insert(addr::FFLAGS, value & 0x1F);
            }
            addr::FFLAGS => {
                let _ = self.storage.insert(a, value & 0x1F);
            }
            addr::FRM => {
                let _ = self.storage.insert(a, value & 0x7);
            }
            _ => {
                if let Some(slot) = self.storage.get_mut(&a) {
                    *slot = value;
                }
            }
        }
    }

    /// Registered run-control state.
    pub fn halted(&self) -> bool {
        self.regs.r().halted
    }

    /// Trap vector from `mtvec` (direct mode).
    pub fn trap_vector(&self) -> u64 {
        self.read(addr::MTVEC).unwrap_or(0) & !0x3
    }

    /// Records a taken trap in `mepc`, `mcause` and `mtval`.
    pub fn record_trap(&mut self, cause: u64, epc: u64, tval: u64) {
        self.poke(addr::MEPC, epc);
        self.poke(addr::MCAUSE, cause);
        self.poke(addr::MTVAL, tval);
    }

    /// ORs floating-point exception flags into `fflags`.
    pub fn accrue_fflags(&mut self, flags: FpFlags) {
        let old = self.read(addr::FFLAGS).unwrap_or(0);
        self.poke(addr::FFLAGS, old | u64::from(flags.bits()));
    }

    /// Increments `minstret`.
    pub fn retire(&mut self) {
        let n = self.read(addr::MINSTRET).unwrap_or(0);
        self.poke(addr::MINSTRET, n.wrapping_add(1));
    }

    /// Executes an accepted command. Returns `(data, exception)` and schedules its writes.
    fn execute(&mut self, req: &CsrRequest, v: &mut CsrRegs) -> (u64, bool) {
        let cmd = req.req_type;
        let a = req.req_addr;
        if cmd.contains(CsrCommand::READ) || cmd.contains(CsrCommand::WRITE) {
            let Some(old) = self.read(a) else {
                return (0, true);
            };
            if cmd.contains(CsrCommand::WRITE) {
                if is_read_only(a) {
                    return (0, true);
                }
                self.pending.push(PendingWrite {
                    addr: a,
                    value: req.req_data,
                });
            }
            return (old, false);
        }
        if cmd.contains(CsrCommand::TRAP_RETURN) {
            return self.read(a).map_or((0, true), |epc| (epc, false));
        }
        if cmd.contains(CsrCommand::EXCEPTION) || cmd.contains(CsrCommand::INTERRUPT) {
            let mut cause = u64::from(a);
            if cmd.contains(CsrCommand::INTERRUPT) {
                cause |= 1 << 63;
            }
            self.pending.push(PendingWrite {
                addr: addr::MEPC,
                value: req.req_data,
            });
            self.pending.push(PendingWrite {
                addr: addr::MCAUSE,
                value: cause,
            });
            return (self.trap_vector(), false);
        }
        if cmd.contains(CsrCommand::BREAKPOINT) {
            v.halted = true;
            self.pending.push(PendingWrite {
                addr: addr::DPC,
                value: req.req_data,
            });
            return (0, false);
        }
        if cmd.contains(CsrCommand::HALT) {
            v.halted = true;
        } else if cmd.contains(CsrCommand::RESUME) {
            v.halted = false;
        } else if !cmd.contains(CsrCommand::WFI) {
            return (0, true);
        }
        (0, false)
    }
}

impl ClockedStage for CsrFile {
    type Input = CsrRequest;
    type Output = CsrResponse;

    fn comb(&mut self, i: &CsrRequest) -> CsrResponse {
        let r = *self.regs.r();
        let mut v = r;
        self.pending.clear();
        let o = CsrResponse {
            req_ready: r.state == CsrState::Idle,
            resp_valid: r.state == CsrState::Respond,
            resp_data: if r.state == CsrState::Respond {
                r.resp_data
            } else {
                0
            },
            resp_exception: r.state == CsrState::Respond && r.resp_exception,
        };

        match r.state {
            CsrState::Idle => {
                if i.req_valid {
                    let (data, exception) = self.execute(i, &mut v);
                    v.resp_data = data;
                    v.resp_exception = exception;
                    v.state = if self.latency <= 1 {
                        CsrState::Respond
                    } else {
                        CsrState::Busy(self.latency - 1)
                    };
                }
            }
            CsrState::Busy(n) => {
                v.state = if n <= 1 {
                    CsrState::Respond
                } else {
                    CsrState::Busy(n - 1)
                };
            }
            CsrState::Respond => {
                if i.resp_ready {
                    v.state = CsrState::Idle;
                }
            }
        }

        *self.regs.begin() = v;
        o
    }

    fn clock(&mut self, reset: bool) {
        if reset {
            self.storage.clone_from(&self.reset_storage);
            self.pending.clear();
        } else {
            for w in std::mem::take(&mut self.pending) {
                tracing::trace!("csr write: {:#05x} <= {:#x}", w.addr, w.value);
                self.poke(w.addr, w.value);
            }
            let cycles = self.read(addr::MCYCLE).unwrap_or(0);
            self.poke(addr::MCYCLE, cycles.wrapping_add(1));
            let (was, now) = (self.regs.r().halted, self.regs.v().halted);
            if was != now {
                tracing::debug!(halted = now, "csr run control");
            }
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.storage.clone_from(&self.reset_storage);
        self.pending.clear();
        self.regs.reset();
    }
}
