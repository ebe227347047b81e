//! Memory-Access stage.
//!
//! Drains the memory-operation queue one entry at a time over a valid/ready data bus and writes
//! load results back through the shared register-file port. The stage moves through four
//! states:
//! 1. **Idle:** Presents the queue head to memory; leaves as soon as one is queued.
//! 2. **WaitReqAccept:** Holds the request until memory accepts it.
//! 3. **WaitResponse:** Accepts the response, checks it against the in-flight address, narrows
//!    and extends load data, and raises access faults.
//! 4. **Hold:** A load result is waiting for the write-back port.
//!
//! Entries marked squashed by a trap still complete on the bus but never write back and never
//! raise faults.

use crate::common::bits::{mask, sign_extend};
use crate::core::pipeline::latches::{
    DataMemRequest, MemAccessInput, MemAccessOutput, WbCommit, WbPort,
};
use crate::core::pipeline::queue::{MemQueue, MemQueueEntry};
use crate::core::pipeline::traits::{ClockedStage, Registers};

/// Memory-Access controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemState {
    /// No access in flight.
    #[default]
    Idle,
    /// Request presented, not yet accepted.
    WaitReqAccept,
    /// Request accepted, response pending.
    WaitResponse,
    /// Load result waiting for the write-back port.
    Hold,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MemRegs {
    state: MemState,
    queue: MemQueue,
    /// Entry currently on the bus.
    memop: MemQueueEntry,
    /// Load result parked in `Hold`.
    hold_rdata: u64,
}

/// Memory-Access stage.
#[derive(Clone, Debug, Default)]
pub struct MemAccess {
    regs: Registers<MemRegs>,
}

/// Extracts a load result from the aligned doubleword containing it.
pub fn extract_load(dword: u64, entry: &MemQueueEntry) -> u64 {
    let shift = (entry.addr & 7) * 8;
    let bits = entry.size.bits();
    let raw = (dword >> shift) & mask(bits);
    if entry.sign_ext {
        sign_extend(raw, bits)
    } else {
        raw
    }
}

/// Bus request for `e`. `resp_ready` stays high while a response is being accepted in the
/// same cycle.
fn bus_request(e: &MemQueueEntry, resp_ready: bool) -> DataMemRequest {
    DataMemRequest {
        valid: true,
        write: e.store,
        addr: e.addr,
        wdata: e.wdata,
        wstrb: if e.store { e.wstrb } else { 0 },
        size: e.size,
        resp_ready,
    }
}

impl MemAccess {
    /// Creates the stage with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered controller state.
    pub fn state(&self) -> MemState {
        self.regs.r().state
    }

    /// Number of queued (not yet issued) entries.
    pub fn queued(&self) -> usize {
        self.regs.r().queue.len()
    }

    /// True when nothing is queued or in flight.
    pub fn is_drained(&self) -> bool {
        let r = self.regs.r();
        r.state == MemState::Idle && r.queue.is_empty()
    }

    /// Moves the registered queue head onto the bus, or returns to `Idle` when nothing is queued.
    /// A push made this cycle is not visible until the next one.
    fn issue_next(r: &MemRegs, v: &mut MemRegs, i: &MemAccessInput, o: &mut MemAccessOutput) {
        let resp_ready = o.mem.resp_ready;
        if r.queue.is_empty() {
            v.state = MemState::Idle;
            return;
        }
        if let Some(head) = v.queue.pop() {
            o.mem = bus_request(&head, resp_ready);
            v.memop = head;
            v.state = if i.mem.req_ready {
                MemState::WaitResponse
            } else {
                MemState::WaitReqAccept
            };
        }
    }

    /// Write-back that retires this cycle, for the hazard tracker.
    pub fn commit_of(out: &MemAccessOutput, wb_ready: bool) -> Option<WbCommit> {
        (out.wb.wena && wb_ready).then_some(WbCommit {
            waddr: out.wb.waddr,
            wtag: out.wb.wtag,
        })
    }
}

impl ClockedStage for MemAccess {
    type Input = MemAccessInput;
    type Output = MemAccessOutput;

    fn comb(&mut self, i: &MemAccessInput) -> MemAccessOutput {
        let r = *self.regs.r();
        let v = self.regs.begin();
        let mut o = MemAccessOutput {
            memop_ready: !r.queue.is_full(),
            ..MemAccessOutput::default()
        };

        match r.state {
            MemState::Idle => Self::issue_next(&r, v, i, &mut o),
            MemState::WaitReqAccept => {
                o.mem = bus_request(&r.memop, false);
                if i.mem.req_ready {
                    v.state = MemState::WaitResponse;
                }
            }
            MemState::WaitResponse => {
                o.mem.resp_ready = true;
                if i.mem.data_valid {
                    let matched = (i.mem.data_addr & !7) == (r.memop.addr & !7);
                    if !matched {
                        tracing::warn!(
                            "memory response for {:#x} does not match request {:#x} (pc = {:#x})",
                            i.mem.data_addr,
                            r.memop.addr,
                            r.memop.pc
                        );
                    }
                    let squashed = r.memop.flushed || i.flush || !matched;
                    let fault = if r.memop.store {
                        i.mem.store_fault
                    } else {
                        i.mem.load_fault
                    };
                    if fault && !squashed {
                        o.load_fault = !r.memop.store;
                        o.store_fault = r.memop.store;
                        o.fault_pc = r.memop.pc;
                        o.fault_addr = r.memop.addr;
                    }
                    let wena = !r.memop.store && !squashed && !fault && r.memop.waddr != 0;
                    if wena {
                        let wdata = extract_load(i.mem.data, &r.memop);
                        o.wb = WbPort {
                            wena: true,
                            waddr: r.memop.waddr,
                            wdata,
                            wtag: r.memop.wtag,
                        };
                        if i.wb_ready {
                            Self::issue_next(&r, v, i, &mut o);
                        } else {
                            v.hold_rdata = wdata;
                            v.state = MemState::Hold;
                        }
                    } else {
                        Self::issue_next(&r, v, i, &mut o);
                    }
                }
            }
            MemState::Hold => {
                if i.flush {
                    Self::issue_next(&r, v, i, &mut o);
                } else {
                    o.wb = WbPort {
                        wena: true,
                        waddr: r.memop.waddr,
                        wdata: r.hold_rdata,
                        wtag: r.memop.wtag,
                    };
                    if i.wb_ready {
                        Self::issue_next(&r, v, i, &mut o);
                    }
                }
            }
        }

        if let Some(req) = &i.memop
            && !r.queue.is_full()
        {
            let _ = v.queue.push(MemQueueEntry::from_request(req));
        }

        if i.flush {
            v.queue.flush();
            v.memop.flushed = true;
        }

        o
    }

    fn clock(&mut self, reset: bool) {
        let (from, to) = (self.regs.r().state, self.regs.v().state);
        if from != to && !reset {
            tracing::trace!(?from, ?to, "memaccess state");
        }
        if to == MemState::WaitResponse && from != to && !reset {
            let m = &self.regs.v().memop;
            tracing::debug!(
                "memory request accepted: addr = {:#x}, store = {}, pc = {:#x}",
                m.addr,
                m.store,
                m.pc
            );
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}
