//! Configuration Tests.
//!
//! Defaults, partial JSON documents, file loading, and validation of out-of-range values.

use std::io::Write;

use rstest::rstest;
use rvpipe_core::common::SimError;
use rvpipe_core::config::{Config, MemoryController};
use rvpipe_core::core::pipeline::traits::ResetMode;

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.general.reset_mode(), ResetMode::Sync);
    assert!(config.general.fpu_enabled);
    assert_eq!(config.memory.controller, MemoryController::Simple);
    assert_eq!(config.csr.hart_id, 0);
}

#[test]
fn empty_document_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.units.mul_latency, Config::default().units.mul_latency);
    assert_eq!(config.memory.base, Config::default().memory.base);
}

#[test]
fn dram_alias_is_accepted() {
    let config = Config::from_json(r#"{ "memory": { "controller": "DRAM" } }"#).unwrap();
    assert_eq!(config.memory.controller, MemoryController::Dram);
}

#[rstest]
#[case(r#"{ "units": { "mul_latency": 0 } }"#)]
#[case(r#"{ "memory": { "size": 0 } }"#)]
#[case(r#"{ "memory": { "base": 4 } }"#)]
#[case(r#"{ "memory": { "ready_period": 0 } }"#)]
#[case(r#"{ "memory": { "latency": 0 } }"#)]
#[case(r#"{ "memory": { "controller": "Dram", "t_cas": 0 } }"#)]
#[case(r#"{ "csr": { "latency": 0 } }"#)]
#[case(r#"{ "csr": { "trap_vector": 2 } }"#)]
fn out_of_range_values_are_rejected(#[case] json: &str) {
    assert!(matches!(Config::from_json(json), Err(SimError::Config(_))));
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(Config::from_json("{ general: }"), Err(SimError::Json(_))));
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "general": {{ "async_reset": true, "max_cycles": 99 }} }}"#).unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.general.reset_mode(), ResetMode::Async);
    assert_eq!(config.general.max_cycles, 99);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(SimError::Io(_))));
}
