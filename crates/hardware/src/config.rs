//! Configuration system for the core model.
//!
//! This module defines the runtime parameters of the simulated system. It provides:
//! 1. **Defaults:** Baseline latencies, memory map, and trap vector.
//! 2. **Structures:** Hierarchical config for general, units, memory, and CSR settings.
//! 3. **Enums:** Memory controller timing model.
//!
//! Structural parameters of the core (queue depth, tag width, reset vector, slot count) are
//! compile-time constants in [`crate::common::constants`]. Configuration is read from JSON, or
//! use `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::SimError;
use crate::core::pipeline::traits::ResetMode;

/// Default configuration constants.
mod defaults {
    /// Cycle limit for a run.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Multiplier latency in cycles.
    pub const MUL_LATENCY: u32 = 4;

    /// Divider latency in cycles.
    pub const DIV_LATENCY: u32 = 20;

    /// FPU latency in cycles.
    pub const FPU_LATENCY: u32 = 6;

    /// Base address of the data memory.
    ///
    /// Reachable with a single `LUI` without sign extension.
    pub const MEM_BASE: u64 = 0x1000_0000;

    /// Size of the data memory (1 MiB).
    pub const MEM_SIZE: usize = 1024 * 1024;

    /// Fixed access latency of the simple controller in cycles.
    pub const MEM_LATENCY: u64 = 2;

    /// CAS latency in cycles.
    pub const T_CAS: u64 = 4;

    /// RAS latency in cycles.
    pub const T_RAS: u64 = 4;

    /// Precharge latency in cycles.
    pub const T_PRE: u64 = 4;

    /// Memory accepts a request every N cycles.
    pub const READY_PERIOD: u32 = 1;

    /// CSR file response latency in cycles.
    pub const CSR_LATENCY: u32 = 1;

    /// Reset value of `mtvec`.
    pub const TRAP_VECTOR: u64 = 0x0002_0000;
}

/// Memory controller timing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every access takes `latency` cycles.
    #[default]
    Simple,
    /// Row-buffer model: CAS on a row hit, RAS + CAS on the first access, precharge added on a
    /// row miss.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root simulator configuration.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use rvpipe_core::config::{Config, MemoryController};
///
/// let json = r#"{
///     "general": { "async_reset": true },
///     "units": { "div_latency": 34 },
///     "memory": { "controller": "Dram", "t_cas": 6 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.async_reset);
/// assert_eq!(config.units.div_latency, 34);
/// assert_eq!(config.units.mul_latency, 4);
/// assert_eq!(config.memory.controller, MemoryController::Dram);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Multi-cycle unit latencies
    #[serde(default)]
    pub units: UnitsConfig,
    /// Data memory model
    #[serde(default)]
    pub memory: MemoryConfig,
    /// CSR file model
    #[serde(default)]
    pub csr: CsrConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed input and [`SimError::Config`] for out-of-range
    /// values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Rejects values the models cannot operate with.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        let bad = |msg: &str| Err(SimError::Config(msg.to_string()));
        let u = &self.units;
        if u.mul_latency == 0 || u.div_latency == 0 || u.fpu_latency == 0 {
            return bad("unit latencies must be at least one cycle");
        }
        let m = &self.memory;
        if m.size == 0 {
            return bad("memory.size must be non-zero");
        }
        if m.size % 8 != 0 || m.base % 8 != 0 {
            return bad("memory.base and memory.size must be 8-byte aligned");
        }
        if m.base.checked_add(m.size as u64).is_none() {
            return bad("memory region wraps the address space");
        }
        if m.ready_period == 0 {
            return bad("memory.ready_period must be at least one cycle");
        }
        let zero_latency = match m.controller {
            MemoryController::Simple => m.latency == 0,
            MemoryController::Dram => m.t_cas == 0,
        };
        if zero_latency {
            return bad("memory access latency must be at least one cycle");
        }
        if self.csr.latency == 0 {
            return bad("csr.latency must be at least one cycle");
        }
        if self.csr.trap_vector & 0x3 != 0 {
            return bad("csr.trap_vector must be 4-byte aligned");
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Apply reset as soon as it is asserted rather than at the next clock edge.
    #[serde(default)]
    pub async_reset: bool,

    /// Write a VCD trace of the core's ports to this path.
    #[serde(default)]
    pub trace_vcd: Option<String>,

    /// Cycle limit for a run.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Execute floating-point instructions; when false they raise illegal-instruction.
    #[serde(default = "GeneralConfig::default_fpu_enabled")]
    pub fpu_enabled: bool,
}

impl GeneralConfig {
    /// Returns the default cycle limit.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    /// The FPU is present by default.
    fn default_fpu_enabled() -> bool {
        true
    }

    /// Reset discipline selected by `async_reset`.
    pub const fn reset_mode(&self) -> ResetMode {
        if self.async_reset {
            ResetMode::Async
        } else {
            ResetMode::Sync
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            async_reset: false,
            trace_vcd: None,
            max_cycles: defaults::MAX_CYCLES,
            fpu_enabled: true,
        }
    }
}

/// Latencies of the behavioural multi-cycle units.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitsConfig {
    /// Multiplier latency in cycles
    #[serde(default = "UnitsConfig::default_mul")]
    pub mul_latency: u32,

    /// Divider latency in cycles
    #[serde(default = "UnitsConfig::default_div")]
    pub div_latency: u32,

    /// FPU latency in cycles
    #[serde(default = "UnitsConfig::default_fpu")]
    pub fpu_latency: u32,
}

impl UnitsConfig {
    fn default_mul() -> u32 {
        defaults::MUL_LATENCY
    }

    fn default_div() -> u32 {
        defaults::DIV_LATENCY
    }

    fn default_fpu() -> u32 {
        defaults::FPU_LATENCY
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            mul_latency: defaults::MUL_LATENCY,
            div_latency: defaults::DIV_LATENCY,
            fpu_latency: defaults::FPU_LATENCY,
        }
    }
}

/// Data memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Base byte address
    #[serde(default = "MemoryConfig::default_base")]
    pub base: u64,

    /// Size in bytes; accesses outside `[base, base + size)` fault
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,

    /// Timing model
    #[serde(default)]
    pub controller: MemoryController,

    /// Access latency of the simple controller
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// CAS latency
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,

    /// Requests are accepted only every `ready_period` cycles
    #[serde(default = "MemoryConfig::default_ready_period")]
    pub ready_period: u32,
}

impl MemoryConfig {
    fn default_base() -> u64 {
        defaults::MEM_BASE
    }

    fn default_size() -> usize {
        defaults::MEM_SIZE
    }

    fn default_latency() -> u64 {
        defaults::MEM_LATENCY
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    fn default_ready_period() -> u32 {
        defaults::READY_PERIOD
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::MEM_BASE,
            size: defaults::MEM_SIZE,
            controller: MemoryController::default(),
            latency: defaults::MEM_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            ready_period: defaults::READY_PERIOD,
        }
    }
}

/// CSR file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CsrConfig {
    /// Cycles from request acceptance to response valid
    #[serde(default = "CsrConfig::default_latency")]
    pub latency: u32,

    /// Reset value of `mtvec`
    #[serde(default = "CsrConfig::default_trap_vector")]
    pub trap_vector: u64,

    /// Value of `mhartid`
    #[serde(default)]
    pub hart_id: u64,
}

impl CsrConfig {
    fn default_latency() -> u32 {
        defaults::CSR_LATENCY
    }

    fn default_trap_vector() -> u64 {
        defaults::TRAP_VECTOR
    }
}

impl Default for CsrConfig {
    fn default() -> Self {
        Self {
            latency: defaults::CSR_LATENCY,
            trap_vector: defaults::TRAP_VECTOR,
            hart_id: 0,
        }
    }
}
