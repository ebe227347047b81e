//! VCD trace output of a simulated run.

use rvpipe_core::config::Config;

use crate::common::builder::program::ProgramBuilder;
use crate::common::harness::TestContext;

#[test]
fn trace_records_port_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.vcd");
    let mut config = Config::default();
    config.general.trace_vcd = Some(path.to_string_lossy().into_owned());

    let program = ProgramBuilder::new().addi(5, 0, 1).addi(6, 0, 2).build();
    let mut tc = TestContext::with_config(&config, program);
    let _ = tc.run();
    tc.sim.finish_trace().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("$timescale 1ns $end\n$scope module rvpipe $end\n"));
    assert!(text.contains(" exec_npc $end"));
    assert!(text.contains(" csr_req_type $end"));
    assert!(text.contains("$enddefinitions $end"));
    assert!(text.contains("\n#0\n"));
}

#[test]
fn no_trace_without_path() {
    let dir = tempfile::tempdir().unwrap();
    let program = ProgramBuilder::new().nop().build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    tc.sim.finish_trace().unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
