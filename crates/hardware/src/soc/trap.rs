//! Trap controller.
//!
//! Collects the exception pulses raised by Execute and Memory-Access and requests a trap one
//! cycle later. It performs the following:
//! 1. **Prioritization:** Memory faults belong to older instructions and win over Execute's
//!    pulses; among those, illegal instruction, breakpoint, environment call, then misalignment.
//! 2. **Request:** Drives `trap` with the vector until Execute acknowledges with `trap_ready`.
//! 3. **Reporting:** On acknowledgement, reports the cause so the CSR file can record it.
//!
//! Pulses arriving while a trap is pending are dropped; they belong to instructions the trap
//! squashes. FPU flags are accrued by the CSR file and never trap.

use crate::common::error::Exception;
use crate::core::pipeline::latches::ExceptionPulses;
use crate::core::pipeline::traits::{ClockedStage, Registers};

/// Interrupt bit of `mcause`.
pub const CAUSE_INTERRUPT: u64 = 1 << 63;

/// A trap taken by the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapCause {
    /// Cause code as written to `mcause`.
    pub cause: u64,
    /// Exception program counter.
    pub epc: u64,
    /// Trap value (faulting address, or zero).
    pub tval: u64,
}

impl TrapCause {
    /// True for interrupts.
    pub const fn is_interrupt(&self) -> bool {
        self.cause & CAUSE_INTERRUPT != 0
    }
}

/// Inputs sampled by the trap controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapInput {
    /// Pulses from Execute.
    pub exceptions: ExceptionPulses,
    /// Load access fault from Memory-Access.
    pub load_fault: bool,
    /// Store access fault from Memory-Access.
    pub store_fault: bool,
    /// PC of the faulting memory operation.
    pub fault_pc: u64,
    /// Faulting address.
    pub fault_addr: u64,
    /// Execute accepted the trap.
    pub trap_ready: bool,
    /// Trap target.
    pub vector: u64,
    /// Execute's next PC; the return address of an interrupt.
    pub npc: u64,
}

/// Outputs driven by the trap controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapOutput {
    /// Trap request carrying the target PC.
    pub trap: Option<u64>,
    /// Trap acknowledged this cycle.
    pub taken: Option<TrapCause>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TrapRegs {
    pending: Option<TrapCause>,
}

/// Trap controller.
#[derive(Debug, Default)]
pub struct TrapController {
    regs: Registers<TrapRegs>,
    irq: Option<u64>,
    taken: u64,
}

/// Highest-priority cause among this cycle's pulses.
pub fn prioritize(i: &TrapInput) -> Option<TrapCause> {
    let at = |e: Exception, epc: u64, tval: u64| {
        Some(TrapCause {
            cause: e.code(),
            epc,
            tval,
        })
    };
    let x = &i.exceptions;
    if i.load_fault {
        at(Exception::LoadFault, i.fault_pc, i.fault_addr)
    } else if i.store_fault {
        at(Exception::StoreFault, i.fault_pc, i.fault_addr)
    } else if x.illegal_instr {
        at(Exception::InstrIllegal, x.pc, 0)
    } else if x.breakpoint {
        at(Exception::Breakpoint, x.pc, x.pc)
    } else if x.ecall {
        at(Exception::CallFromMmode, x.pc, 0)
    } else if x.unalign_load {
        at(Exception::LoadMisalign, x.pc, 0)
    } else if x.unalign_store {
        at(Exception::StoreMisalign, x.pc, 0)
    } else {
        None
    }
}

impl TrapController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests interrupt `code`; it is raised at the next edge with no trap pending.
    pub fn raise_interrupt(&mut self, code: u64) {
        self.irq = Some(code & !CAUSE_INTERRUPT);
    }

    /// Trap pending acknowledgement.
    pub fn pending(&self) -> Option<TrapCause> {
        self.regs.r().pending
    }

    /// Traps taken since construction.
    pub const fn taken(&self) -> u64 {
        self.taken
    }
}

impl ClockedStage for TrapController {
    type Input = TrapInput;
    type Output = TrapOutput;

    fn comb(&mut self, i: &TrapInput) -> TrapOutput {
        let r = *self.regs.r();
        let v = self.regs.begin();
        match r.pending {
            Some(cause) => {
                if i.trap_ready {
                    v.pending = None;
                    let epc = if cause.is_interrupt() { i.npc } else { cause.epc };
                    return TrapOutput {
                        trap: Some(i.vector),
                        taken: Some(TrapCause { epc, ..cause }),
                    };
                }
                TrapOutput {
                    trap: Some(i.vector),
                    taken: None,
                }
            }
            None => {
                v.pending = prioritize(i);
                TrapOutput::default()
            }
        }
    }

    fn clock(&mut self, reset: bool) {
        if !reset {
            let was = self.regs.r().pending;
            let mut next = self.regs.v().pending;
            if was.is_some() && next.is_none() {
                self.taken += 1;
            }
            if was.is_none()
                && next.is_none()
                && let Some(code) = self.irq.take()
            {
                next = Some(TrapCause {
                    cause: CAUSE_INTERRUPT | code,
                    epc: 0,
                    tval: 0,
                });
            }
            if was.is_none()
                && let Some(cause) = next
            {
                tracing::debug!(
                    "trap raised: cause = {:#x}, epc = {:#x}, tval = {:#x}",
                    cause.cause,
                    cause.epc,
                    cause.tval
                );
            }
            self.regs.v_mut().pending = next;
        } else {
            self.irq = None;
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.irq = None;
        self.regs.reset();
    }
}
