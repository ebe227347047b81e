//! Multi-cycle functional unit models.
//!
//! Execute dispatches multiply, divide and floating-point instructions to external units over a
//! one-shot enable handshake: the unit samples `ena` with the latched operands, reports `busy`
//! while computing, and pulses `valid` with the result for exactly one cycle.
//!
//! [`LatencyUnit`] is the behavioural model used by the simulator: it evaluates the operation
//! immediately and releases the result after a configured number of cycles.

use crate::core::pipeline::latches::{UnitRequest, UnitResponse};
use crate::core::pipeline::signals::MultiSlot;
use crate::core::pipeline::traits::{ClockedStage, Registers};
use crate::core::units::alu::arithmetic;
use crate::core::units::fpu::Fpu;
use crate::core::units::fpu::exception_flags::FpFlags;
use crate::isa::opcode::Opcode;

/// A multi-cycle unit as seen by the scheduler.
///
/// Mirrors [`ClockedStage`] with fixed signal types so units can be boxed and swapped.
#[cfg_attr(test, mockall::automock)]
pub trait FunctionalUnit {
    /// Slot this unit serves.
    fn slot(&self) -> MultiSlot;

    /// Computes outputs and next state from registered state and the trigger.
    fn comb(&mut self, req: &UnitRequest) -> UnitResponse;

    /// Clock edge.
    fn clock(&mut self, reset: bool);

    /// Immediate reset.
    fn reset(&mut self);
}

/// Evaluates `op` for a slot's datapath.
pub fn evaluate(slot: MultiSlot, op: Opcode, a1: u64, a2: u64) -> (u64, FpFlags) {
    match slot {
        MultiSlot::Mul | MultiSlot::Div => (arithmetic::muldiv(op, a1, a2), FpFlags::NONE),
        MultiSlot::Fpu => Fpu::execute(op, a1, a2),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct UnitRegs {
    busy: bool,
    remaining: u32,
    valid: bool,
    result: u64,
    flags: FpFlags,
}

/// Fixed-latency behavioural unit.
///
/// With latency `L`, an enable sampled in cycle `t` produces `valid` in cycle `t + L`.
#[derive(Clone, Debug)]
pub struct LatencyUnit {
    slot: MultiSlot,
    latency: u32,
    regs: Registers<UnitRegs>,
}

impl LatencyUnit {
    /// Creates a unit for `slot` with the given latency (clamped to at least one cycle).
    pub fn new(slot: MultiSlot, latency: u32) -> Self {
        Self {
            slot,
            latency: latency.max(1),
            regs: Registers::new(),
        }
    }

    /// Configured latency in cycles.
    pub const fn latency(&self) -> u32 {
        self.latency
    }
}

impl ClockedStage for LatencyUnit {
    type Input = UnitRequest;
    type Output = UnitResponse;

    fn comb(&mut self, req: &UnitRequest) -> UnitResponse {
        let r = *self.regs.r();
        let latency = self.latency;
        let slot = self.slot;
        let v = self.regs.begin();

        v.valid = false;
        if r.busy {
            if r.remaining <= 1 {
                v.busy = false;
                v.valid = true;
            } else {
                v.remaining = r.remaining - 1;
            }
        } else if req.ena
            && let Some(op) = req.op
        {
            let (result, flags) = evaluate(slot, op, req.a1, req.a2);
            v.result = result;
            v.flags = flags;
            if latency == 1 {
                v.valid = true;
            } else {
                v.busy = true;
                v.remaining = latency - 1;
            }
        }

        UnitResponse {
            busy: r.busy,
            valid: r.valid,
            result: if r.valid { r.result } else { 0 },
            flags: if r.valid { r.flags } else { FpFlags::NONE },
        }
    }

    fn clock(&mut self, reset: bool) {
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}

impl FunctionalUnit for LatencyUnit {
    fn slot(&self) -> MultiSlot {
        self.slot
    }

    fn comb(&mut self, req: &UnitRequest) -> UnitResponse {
        ClockedStage::comb(self, req)
    }

    fn clock(&mut self, reset: bool) {
        ClockedStage::clock(self, reset);
    }

    fn reset(&mut self) {
        ClockedStage::reset(self);
    }
}
