//! Memory controller implementations for latency modeling.
//!
//! This module provides:
//! 1. **SimpleController:** Fixed latency per access.
//! 2. **DramController:** Row-buffer-aware latency (CAS, RAS, precharge).
//!
//! The data memory asks its controller for a latency once per accepted request, at the clock
//! edge, so stateful controllers see each access exactly once.

use crate::config::{MemoryConfig, MemoryController as ControllerKind};

/// Latency model consulted for every accepted memory request.
pub trait MemoryController: std::fmt::Debug {
    /// Returns the number of cycles from acceptance to response for an access to `addr`.
    fn access_latency(&mut self, addr: u64) -> u64;

    /// Forgets any open-row state.
    fn reset(&mut self) {}
}

/// Builds the controller selected by `config`.
pub fn from_config(config: &MemoryConfig) -> Box<dyn MemoryController> {
    match config.controller {
        ControllerKind::Simple => Box::new(SimpleController::new(config.latency)),
        ControllerKind::Dram => Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        )),
    }
}

/// Fixed-latency memory controller; every access takes the same number of cycles.
#[derive(Clone, Copy, Debug)]
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a simple controller with the given fixed latency in cycles.
    pub const fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// Row-buffer controller; models CAS, RAS, and precharge latencies.
#[derive(Clone, Copy, Debug)]
pub struct DramController {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_mask: u64,
}

impl DramController {
    /// Creates a row-buffer controller with no row open.
    pub const fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_mask: !2047,
        }
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr & self.row_mask;
        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }

    fn reset(&mut self) {
        self.last_row = None;
    }
}
