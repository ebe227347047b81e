//! Debug port.
//!
//! A request/response port for external tooling. Each request selects a region:
//! 1. **CSR:** Reads or writes a CSR through master 1 of the CSR bus.
//! 2. **Integer registers:** Reads or writes register file entries 0..63. Writes use the
//!    register file port only when neither pipeline stage is writing back.
//! 3. **Control:** Address 0 is run control (write 1 halts, 0 resumes, read returns the halted
//!    status); address 1 is the next PC (read Execute's next PC, write forces it).
//!
//! Halt and resume are CSR bus commands; the CSR file holds the run-control state.

use crate::common::constants::REGS_TOTAL;
use crate::core::pipeline::latches::{CsrRequest, CsrResponse};
use crate::core::pipeline::signals::CsrCommand;
use crate::core::pipeline::traits::{ClockedStage, Registers};

/// Control-region address of the run-control register.
pub const DPORT_RUN_CONTROL: u16 = 0;

/// Control-region address of the next-PC register.
pub const DPORT_NPC: u16 = 1;

/// Target of a debug access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DportRegion {
    /// CSR file.
    #[default]
    Csr,
    /// Unified register file.
    IntRegs,
    /// Run control and next PC.
    Control,
}

/// A debug access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DportRequest {
    /// Target region.
    pub region: DportRegion,
    /// Address within the region.
    pub addr: u16,
    /// Write access.
    pub write: bool,
    /// Write data.
    pub wdata: u64,
}

/// Inputs of the debug port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugInput {
    /// Pending request.
    pub req: Option<DportRequest>,
    /// Requester accepts the response.
    pub resp_ready: bool,
    /// CSR bus response for master 1.
    pub csr: CsrResponse,
    /// Register file data at `reg_raddr`.
    pub rdata: u64,
    /// Register file write port is free this cycle.
    pub reg_wready: bool,
    /// Execute's registered next PC.
    pub npc: u64,
    /// Core is halted.
    pub halted: bool,
}

/// Outputs of the debug port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugOutput {
    /// Request accepted.
    pub req_ready: bool,
    /// Response valid.
    pub resp_valid: bool,
    /// Response data.
    pub rdata: u64,
    /// Access rejected (bad address, or CSR exception).
    pub error: bool,
    /// CSR bus master 1.
    pub csr: CsrRequest,
    /// Register file read address.
    pub reg_raddr: u8,
    /// Register file write.
    pub reg_write: Option<(u8, u64)>,
    /// Next-PC override.
    pub npc_write: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DportState {
    #[default]
    Idle,
    CsrRequest,
    CsrResponse,
    Access,
    Respond,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DportRegs {
    state: DportState,
    req: DportRequest,
    rdata: u64,
    error: bool,
}

/// Debug port controller.
#[derive(Clone, Debug, Default)]
pub struct DebugPort {
    regs: Registers<DportRegs>,
}

impl DebugPort {
    /// Creates an idle port.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no access is in progress.
    pub fn is_idle(&self) -> bool {
        self.regs.r().state == DportState::Idle
    }

    fn csr_command(req: &DportRequest) -> CsrCommand {
        match (req.region, req.write) {
            (DportRegion::Control, _) if req.wdata & 1 != 0 => CsrCommand::HALT,
            (DportRegion::Control, _) => CsrCommand::RESUME,
            (_, true) => CsrCommand::WRITE,
            (_, false) => CsrCommand::READ,
        }
    }
}

impl ClockedStage for DebugPort {
    type Input = DebugInput;
    type Output = DebugOutput;

    fn comb(&mut self, i: &DebugInput) -> DebugOutput {
        let r = *self.regs.r();
        let v = self.regs.begin();
        let mut o = DebugOutput::default();

        match r.state {
            DportState::Idle => {
                o.req_ready = true;
                if let Some(req) = i.req {
                    v.req = req;
                    v.rdata = 0;
                    v.error = false;
                    v.state = match (req.region, req.addr) {
                        (DportRegion::Csr, _) => DportState::CsrRequest,
                        (DportRegion::Control, DPORT_RUN_CONTROL) if req.write => {
                            DportState::CsrRequest
                        }
                        (DportRegion::IntRegs, a) if usize::from(a) < REGS_TOTAL => {
                            DportState::Access
                        }
                        (DportRegion::Control, DPORT_RUN_CONTROL | DPORT_NPC) => {
                            DportState::Access
                        }
                        _ => {
                            v.error = true;
                            DportState::Respond
                        }
                    };
                }
            }
            DportState::CsrRequest => {
                o.csr = CsrRequest {
                    req_valid: true,
                    req_type: Self::csr_command(&r.req),
                    req_addr: r.req.addr,
                    req_data: r.req.wdata,
                    resp_ready: false,
                };
                if r.req.region == DportRegion::Control {
                    o.csr.req_addr = 0;
                }
                if i.csr.req_ready {
                    v.state = DportState::CsrResponse;
                }
            }
            DportState::CsrResponse => {
                o.csr.resp_ready = true;
                if i.csr.resp_valid {
                    v.rdata = i.csr.resp_data;
                    v.error = i.csr.resp_exception;
                    v.state = DportState::Respond;
                }
            }
            DportState::Access => {
                let req = r.req;
                match req.region {
                    DportRegion::IntRegs => {
                        // Only the low six bits address the register file.
                        let idx = (req.addr & 0x3F) as u8;
                        o.reg_raddr = idx;
                        if !req.write {
                            v.rdata = i.rdata;
                            v.state = DportState::Respond;
                        } else if i.reg_wready {
                            o.reg_write = Some((idx, req.wdata));
                            v.state = DportState::Respond;
                        }
                    }
                    DportRegion::Control if req.addr == DPORT_NPC => {
                        if req.write {
                            o.npc_write = Some(req.wdata);
                        } else {
                            v.rdata = i.npc;
                        }
                        v.state = DportState::Respond;
                    }
                    _ => {
                        v.rdata = u64::from(i.halted);
                        v.state = DportState::Respond;
                    }
                }
            }
            DportState::Respond => {
                o.resp_valid = true;
                o.rdata = r.rdata;
                o.error = r.error;
                if i.resp_ready {
                    v.state = DportState::Idle;
                }
            }
        }
        o
    }

    fn clock(&mut self, reset: bool) {
        let (r, v) = (*self.regs.r(), *self.regs.v());
        if !reset && r.state == DportState::Idle && v.state != DportState::Idle {
            tracing::debug!(
                "dport access: region = {:?}, addr = {:#x}, write = {}",
                v.req.region,
                v.req.addr,
                v.req.write
            );
        }
        self.regs.commit(reset);
    }

    fn reset(&mut self) {
        self.regs.reset();
    }
}
