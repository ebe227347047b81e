//! CSR bus interconnect: two masters, one slave.
//!
//! Execute (master 0) and the debug port (master 1) share the CSR file. The arbiter grants the
//! bus to one master at a time and holds the grant for the whole transaction:
//! 1. **Arbitration:** With the bus free, a valid request from master 0 wins; otherwise master 1
//!    is granted. The winner is routed to the slave in the same cycle.
//! 2. **Ownership:** While acquired, only the owner's lines reach the slave. The other master
//!    sees `req_ready` and `resp_valid` low and zero response data.
//! 3. **Release:** The grant ends in the cycle the owner accepts the slave's response.

use crate::core::pipeline::latches::{CsrRequest, CsrResponse};
use crate::core::pipeline::traits::{ClockedStage, Registers};

/// Number of masters on the CSR bus.
pub const CSR_MASTERS: usize = 2;

/// Arbiter inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsrBusInput {
    /// Master-side requests, indexed by master id.
    pub m: [CsrRequest; CSR_MASTERS],
    /// Slave response.
    pub s0: CsrResponse,
}

/// Arbiter outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsrBusOutput {
    /// Responses routed back to each master.
    pub m: [CsrResponse; CSR_MASTERS],
    /// Request forwarded to the slave.
    pub s0: CsrRequest,
    /// Master routed to the slave this cycle.
    pub owner: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ArbRegs {
    acquired: bool,
    owner: usize,
}

/// Two-master CSR bus arbiter.
#[derive(Clone, Debug, Default)]
pub struct CsrArbiter {
    regs: Registers<ArbRegs>,
    grants: [u64; CSR_MASTERS],
}

impl CsrArbiter {
    /// Creates a released arbiter owned by master 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a transaction holds the bus.
    pub fn acquired(&self) -> bool {
        self.regs.r().acquired
    }

    /// Registered owner.
    pub fn owner(&self) -> usize {
        self.regs.r().owner
    }

    /// Number of grants per master since construction.
    pub const fn grants(&self) -> [u64; CSR_MASTERS] {
        self.grants
    }
}

impl ClockedStage for CsrArbiter {
    type Input = CsrBusInput;
    type Output = CsrBusOutput;

    fn comb(&mut self, i: &CsrBusInput) -> CsrBusOutput {
        let r = *self.regs.r();
        let v = self.regs.begin();

        let owner = if r.acquired {
            r.owner
        } else if i.m[0].req_valid {
            0
        } else if i.m[1].req_valid {
            1
        } else {
            r.owner
        };

        if !r.acquired && i.m[owner].req_valid {
            v.acquired = true;
            v.owner = owner;
        }
        if i.s0.resp_valid && i.m[owner].resp_ready {
            v.acquired = false;
        }

        let mut o = CsrBusOutput {
            s0: i.m[owner],
            owner,
            ..CsrBusOutput::default()
        };
        o.m[owner] = i.s0;
        o
    }

    fn clock(&mut self, reset: bool) {
        let (r, v) = (*self.regs.r(), *self.regs.v());
        if !reset && v.acquired && !r.acquired {
            self.grants[v.owner] += 1;
            tracing::trace!(owner = v.owner, "csr bus granted");
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}
