//! Debug port accesses against a running system.

use pretty_assertions::assert_eq;
use rvpipe_core::common::SimError;
use rvpipe_core::common::constants::RESET_VECTOR;
use rvpipe_core::config::Config;
use rvpipe_core::core::debug::{DPORT_NPC, DPORT_RUN_CONTROL, DportRegion};
use rvpipe_core::sim::ProgramFeed;
use rvpipe_core::soc::csr_file::addr;

use crate::common::builder::program::ProgramBuilder;
use crate::common::harness::TestContext;

fn idle() -> TestContext {
    TestContext::new(ProgramFeed::new(RESET_VECTOR))
}

#[test]
fn register_write_then_read() {
    let mut tc = idle();
    let _ = tc.dport(DportRegion::IntRegs, 7, Some(0x1234)).unwrap();
    assert_eq!(tc.get_reg(7), 0x1234);
    assert_eq!(tc.dport(DportRegion::IntRegs, 7, None).unwrap(), 0x1234);
    // FP bank through the unified index.
    let _ = tc.dport(DportRegion::IntRegs, 40, Some(2.0f64.to_bits())).unwrap();
    assert_eq!(tc.sim.regs().read_f(8), 2.0f64.to_bits());
}

#[test]
fn csr_read_and_write_use_master1() {
    let mut config = Config::default();
    config.csr.hart_id = 9;
    let mut tc = TestContext::with_config(&config, ProgramFeed::new(RESET_VECTOR));
    assert_eq!(tc.dport(DportRegion::Csr, addr::MHARTID, None).unwrap(), 9);
    let _ = tc.dport(DportRegion::Csr, addr::MSCRATCH, Some(0xAB)).unwrap();
    assert_eq!(tc.csr(addr::MSCRATCH), 0xAB);
    assert_eq!(tc.sim.stats().arbiter_grants, [0, 2]);
}

#[test]
fn bad_addresses_are_rejected() {
    let mut tc = idle();
    assert!(matches!(
        tc.dport(DportRegion::IntRegs, 64, None),
        Err(SimError::DebugRejected(_))
    ));
    assert!(matches!(
        tc.dport(DportRegion::Csr, 0x7FF, None),
        Err(SimError::DebugRejected(_))
    ));
    assert!(matches!(
        tc.dport(DportRegion::Control, 2, None),
        Err(SimError::DebugRejected(_))
    ));
}

#[test]
fn halt_freezes_issue_until_resume() {
    let program = ProgramBuilder::new().addi(5, 0, 1).addi(6, 0, 2).addi(7, 0, 3).build();
    let mut tc = TestContext::new(program);
    let _ = tc.dport(DportRegion::Control, DPORT_RUN_CONTROL, Some(1)).unwrap();
    assert!(tc.sim.csr().halted());
    assert_eq!(tc.dport(DportRegion::Control, DPORT_RUN_CONTROL, None).unwrap(), 1);

    let frozen = tc.sim.execute().npc();
    tc.step(10);
    assert_eq!(tc.sim.execute().npc(), frozen);
    assert!(tc.sim.stats().stalls_hold >= 10);

    let _ = tc.dport(DportRegion::Control, DPORT_RUN_CONTROL, Some(0)).unwrap();
    assert!(!tc.sim.csr().halted());
    let _ = tc.run();
    assert_eq!((tc.get_reg(5), tc.get_reg(6), tc.get_reg(7)), (1, 2, 3));
}

#[test]
fn npc_read_and_redirect() {
    let program = (5..13).fold(ProgramBuilder::new(), |b, rd| b.addi(rd, 0, 1)).build();
    let mut tc = TestContext::new(program);
    let _ = tc.dport(DportRegion::Control, DPORT_RUN_CONTROL, Some(1)).unwrap();
    let npc = tc.dport(DportRegion::Control, DPORT_NPC, None).unwrap();
    assert_eq!(npc, tc.sim.execute().npc());
    assert!(npc < RESET_VECTOR + 24, "halt took too long: {npc:#x}");

    let _ = tc.dport(DportRegion::Control, DPORT_NPC, Some(npc + 8)).unwrap();
    assert_eq!(tc.sim.execute().npc(), npc + 8);
    let _ = tc.dport(DportRegion::Control, DPORT_RUN_CONTROL, Some(0)).unwrap();
    let _ = tc.run();

    let skipped = [npc, npc + 4].map(|pc| 5 + ((pc - RESET_VECTOR) / 4) as u8);
    for rd in 5..13u8 {
        let expected = u64::from(!skipped.contains(&rd));
        assert_eq!(tc.get_reg(rd), expected, "x{rd}");
    }
}
