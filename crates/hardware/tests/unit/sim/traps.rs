//! Trap entry through the trap controller.

use pretty_assertions::assert_eq;
use rvpipe_core::common::constants::RESET_VECTOR;
use rvpipe_core::config::Config;
use rvpipe_core::soc::csr_file::addr;
use rvpipe_core::soc::trap::CAUSE_INTERRUPT;

use crate::common::builder::program::ProgramBuilder;
use crate::common::harness::TestContext;

#[test]
fn ecall_redirects_to_trap_vector() {
    let program = ProgramBuilder::new().nop().ecall().nop().build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.csr(addr::MCAUSE), 11);
    assert_eq!(tc.csr(addr::MEPC), RESET_VECTOR + 4);
    assert_eq!(tc.sim.execute().npc(), tc.sim.csr().trap_vector());
    assert_eq!(tc.sim.stats().traps, 1);
    // The instruction after the ecall never issued.
    assert_eq!(tc.sim.stats().instructions, 2);
}

#[test]
fn ebreak_reports_pc_as_tval() {
    let program = ProgramBuilder::new().ebreak().build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.csr(addr::MCAUSE), 3);
    assert_eq!(tc.csr(addr::MTVAL), RESET_VECTOR);
}

#[test]
fn trap_squashes_queued_load() {
    let mut config = Config::default();
    config.memory.latency = 8;
    let program = ProgramBuilder::new()
        .lui(1, 0x1000_0000)
        .ld(5, 1, 0)
        .ecall()
        .build();
    let mut tc = TestContext::with_config(&config, program);
    let _ = tc.poke(0x1000_0000, 0xDEAD).set_reg(5, 0x77);
    let _ = tc.run();
    assert_eq!(tc.get_reg(5), 0x77);
    assert_eq!(tc.csr(addr::MCAUSE), 11);
    assert_eq!(tc.csr(addr::MEPC), RESET_VECTOR + 8);
    assert!(tc.sim.memaccess().is_drained());
    assert!(tc.sim.execute().hazards().is_empty());
}

#[test]
fn handler_inside_program_runs() {
    let program = ProgramBuilder::new()
        .lui(1, RESET_VECTOR as i64)
        .addi(1, 1, 0x14)
        .csrrw(0, addr::MTVEC, 1)
        .ecall()
        .addi(6, 0, 1)
        .csrrs(10, addr::MCAUSE, 0)
        .build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.get_reg(10), 11);
    assert_eq!(tc.get_reg(6), 0);
}

#[test]
fn interrupt_returns_to_next_instruction() {
    let program = ProgramBuilder::new().nop().nop().nop().build();
    let mut tc = TestContext::new(program);
    tc.sim.raise_interrupt(7);
    let _ = tc.run();
    assert_eq!(tc.csr(addr::MCAUSE), CAUSE_INTERRUPT | 7);
    assert_eq!(tc.csr(addr::MEPC), RESET_VECTOR + 4);
}

#[test]
fn trap_during_multiply_discards_result() {
    let mut config = Config::default();
    config.units.mul_latency = 10;
    let program = ProgramBuilder::new()
        .addi(1, 0, 3)
        .mul(5, 1, 1)
        .build();
    let mut tc = TestContext::with_config(&config, program);
    tc.step(3);
    tc.sim.raise_interrupt(3);
    let _ = tc.run();
    assert_eq!(tc.get_reg(5), 0);
    assert_eq!(tc.csr(addr::MCAUSE), CAUSE_INTERRUPT | 3);
}
