//! Statistics collection and rendering.

use pretty_assertions::assert_eq;
use rvpipe_core::stats::{STATS_SECTIONS, SimStats};

use crate::common::builder::program::ProgramBuilder;
use crate::common::harness::TestContext;

#[test]
fn defaults_are_zero() {
    let s = SimStats::default();
    assert_eq!(s.cycles, 0);
    assert_eq!(s.instructions, 0);
    assert_eq!(s.arbiter_grants, [0, 0]);
    assert_eq!(s.mem_requests, 0);
}

#[test]
fn sections_are_selectable() {
    let s = SimStats::default();
    let all = s.render_sections(&[]);
    for header in ["STATISTICS", "INSTRUCTION MIX", "STALLS", "SYSTEM"] {
        assert!(all.contains(header), "missing {header}");
    }

    let only = s.render_sections(&["stalls".to_string()]);
    assert!(only.contains("stalls.hazard"));
    assert!(!only.contains("sim_cycles"));
    assert!(!only.contains("mem.requests"));

    assert_eq!(STATS_SECTIONS, ["summary", "instruction_mix", "stalls", "system"]);
}

#[test]
fn run_is_counted() {
    let program = ProgramBuilder::new()
        .lui(1, 0x1000_0000)
        .sd(0, 1, 0)
        .ld(5, 1, 0)
        .mul(6, 5, 5)
        .beq(0, 0, 4)
        .csrrs(7, 0xF14, 0)
        .build();
    let mut tc = TestContext::new(program);
    let cycles = tc.run();
    let s = tc.sim.stats();

    assert_eq!(s.cycles, cycles);
    assert_eq!(s.instructions, 6);
    assert_eq!(s.inst_single + s.inst_multi, s.instructions);
    assert_eq!(s.inst_multi, 1);
    assert_eq!((s.inst_load, s.inst_store), (1, 1));
    assert_eq!(s.inst_branch, 1);
    assert_eq!(s.inst_csr, 1);
    assert_eq!(s.arbiter_grants, [1, 0]);
    assert!(s.mem_requests >= 2);
    assert!(s.stalls_hazard > 0);

    let text = s.render_sections(&["system".to_string()]);
    assert!(text.contains("csr.grants.execute     1"));
}
