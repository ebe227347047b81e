//! Data memory model.
//!
//! This module implements the slave behind Memory-Access's data bus. It provides:
//! 1. **Buffer:** Byte storage for the mapped region.
//! 2. **Controller:** Latency models (fixed or row-buffer).
//! 3. **DataMemory:** The valid/ready request and response channels. One request is served at a
//!    time; the response carries the aligned doubleword containing the address and is held
//!    until the master asserts `resp_ready`. Accesses outside the mapped region complete with a
//!    load or store fault.

/// Byte storage backing the memory.
pub mod buffer;

/// Memory controller implementations for access latency modeling.
pub mod controller;

use self::buffer::RamBuffer;
use self::controller::MemoryController;
use crate::config::MemoryConfig;
use crate::core::pipeline::latches::{DataMemRequest, DataMemResponse};
use crate::core::pipeline::traits::{ClockedStage, Registers};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum MemState {
    #[default]
    Idle,
    Busy(u64),
    Respond,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MemRegs {
    state: MemState,
    tick: u32,
    resp: DataMemResponse,
}

/// Data memory slave.
#[derive(Debug)]
pub struct DataMemory {
    regs: Registers<MemRegs>,
    ram: RamBuffer,
    base: u64,
    ready_period: u32,
    controller: Box<dyn MemoryController>,
    /// Request accepted by the current evaluation; performed at the clock edge.
    accepted: Option<DataMemRequest>,
    requests: u64,
}

impl DataMemory {
    /// Creates the memory described by `config`.
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            regs: Registers::new(),
            ram: RamBuffer::new(config.size),
            base: config.base,
            ready_period: config.ready_period.max(1),
            controller: controller::from_config(config),
            accepted: None,
            requests: 0,
        }
    }

    /// Replaces the latency model.
    pub fn with_controller(mut self, controller: Box<dyn MemoryController>) -> Self {
        self.controller = controller;
        self
    }

    /// Mapped region as `(base, size)`.
    pub const fn range(&self) -> (u64, u64) {
        (self.base, self.ram.len() as u64)
    }

    /// Requests accepted since construction.
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    fn offset(&self, addr: u64) -> Option<u64> {
        let off = addr.checked_sub(self.base)?;
        (off < self.ram.len() as u64).then_some(off)
    }

    /// Reads the aligned doubleword containing `addr`, bypassing the bus.
    pub fn peek(&self, addr: u64) -> Option<u64> {
        self.ram.read_u64(self.offset(addr & !7)?)
    }

    /// Writes an aligned doubleword, bypassing the bus. Returns `false` outside the region.
    pub fn poke(&mut self, addr: u64, value: u64) -> bool {
        self.offset(addr & !7)
            .is_some_and(|off| self.ram.write_masked(off, value, 0xFF))
    }

    /// Copies `data` to `addr`, bypassing the bus. Returns `false` if it does not fit.
    pub fn load(&mut self, addr: u64, data: &[u8]) -> bool {
        self.offset(addr)
            .is_some_and(|off| self.ram.write_slice(off, data))
    }

    /// Response to `req` against the current contents.
    fn respond(&self, req: &DataMemRequest) -> DataMemResponse {
        let word = self.peek(req.addr);
        let fault = word.is_none();
        DataMemResponse {
            req_ready: false,
            data_valid: true,
            data_addr: req.addr,
            data: if req.write { 0 } else { word.unwrap_or(0) },
            load_fault: fault && !req.write,
            store_fault: fault && req.write,
        }
    }
}

impl ClockedStage for DataMemory {
    type Input = DataMemRequest;
    type Output = DataMemResponse;

    fn comb(&mut self, i: &DataMemRequest) -> DataMemResponse {
        let r = *self.regs.r();
        self.accepted = None;
        let req_ready = r.state == MemState::Idle && r.tick % self.ready_period == 0;
        let mut next = r;
        next.tick = r.tick.wrapping_add(1);

        let o = match r.state {
            MemState::Idle => {
                if i.valid && req_ready {
                    self.accepted = Some(*i);
                    next.resp = self.respond(i);
                }
                DataMemResponse {
                    req_ready,
                    ..DataMemResponse::default()
                }
            }
            MemState::Busy(n) => {
                next.state = if n <= 1 {
                    MemState::Respond
                } else {
                    MemState::Busy(n - 1)
                };
                DataMemResponse::default()
            }
            MemState::Respond => {
                if i.resp_ready {
                    next.state = MemState::Idle;
                }
                r.resp
            }
        };

        *self.regs.begin() = next;
        o
    }

    fn clock(&mut self, reset: bool) {
        if reset {
            self.accepted = None;
            self.controller.reset();
        } else if let Some(req) = self.accepted.take() {
            self.requests += 1;
            if req.write
                && let Some(off) = self.offset(req.addr & !7)
            {
                let _ = self.ram.write_masked(off, req.wdata, req.wstrb);
            }
            let latency = self.controller.access_latency(req.addr).max(1);
            tracing::trace!(
                "dmem accept: addr = {:#x}, write = {}, latency = {}",
                req.addr,
                req.write,
                latency
            );
            self.regs.v_mut().state = if latency == 1 {
                MemState::Respond
            } else {
                MemState::Busy(latency - 1)
            };
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.accepted = None;
        self.controller.reset();
        self.regs.reset();
    }
}
