//! Execute controller scenarios.
//!
//! Runs short programs through the whole system and checks Execute's externally visible
//! behaviour: write-back timing, one-shot unit enables, load-use stalls, and exception pulses.

use pretty_assertions::assert_eq;
use rvpipe_core::common::constants::RESET_VECTOR;
use rvpipe_core::core::pipeline::latches::UnitResponse;
use rvpipe_core::core::pipeline::signals::MultiSlot;
use rvpipe_core::core::pipeline::stages::execute::ExecState;
use rvpipe_core::soc::csr_file::addr;

use crate::common::builder::program::ProgramBuilder;
use crate::common::harness::TestContext;
use crate::common::mocks::unit::{MockUnit, ScriptedUnit};

// ══════════════════════════════════════════════════════════
// Single-cycle operations
// ══════════════════════════════════════════════════════════

#[test]
fn dependent_alu_ops_issue_back_to_back() {
    let program = ProgramBuilder::new()
        .addi(5, 0, 7)
        .add(6, 5, 5)
        .xori(7, 6, 0xF)
        .build();
    let mut tc = TestContext::new(program);
    let cycles = tc.run();
    assert_eq!(tc.get_reg(5), 7);
    assert_eq!(tc.get_reg(6), 14);
    assert_eq!(tc.get_reg(7), 14 ^ 0xF);
    assert_eq!(cycles, 3);
    assert_eq!(tc.sim.stats().instructions, 3);
}

#[test]
fn taken_branch_skips_instruction() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 3)
        .beq(1, 1, 8)
        .addi(2, 0, 99)
        .addi(3, 0, 42)
        .build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.get_reg(2), 0);
    assert_eq!(tc.get_reg(3), 42);
    assert_eq!(tc.sim.stats().inst_branch, 1);
}

#[test]
fn jal_links_return_address() {
    let b = ProgramBuilder::new();
    let link = b.pc() + 4;
    let program = b.jal(1, 8).addi(2, 0, 1).addi(3, 0, 1).build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.get_reg(1), link);
    assert_eq!(tc.get_reg(2), 0);
    assert_eq!(tc.get_reg(3), 1);
}

// ══════════════════════════════════════════════════════════
// Multi-cycle dispatch
// ══════════════════════════════════════════════════════════

#[test]
fn multiply_enable_is_a_single_pulse() {
    let (unit, log) = ScriptedUnit::new(MultiSlot::Mul, 3, 99);
    let program = ProgramBuilder::new().mul(5, 1, 2).addi(6, 5, 1).build();
    let mut tc = TestContext::new(program);
    let _ = tc.set_reg(1, 6).set_reg(2, 7);
    tc.sim = tc.sim.with_unit(Box::new(unit));
    let _ = tc.run();

    assert_eq!(tc.get_reg(5), 99);
    assert_eq!(tc.get_reg(6), 100);
    let log = log.lock().unwrap();
    let enables: Vec<_> = log.iter().filter(|r| r.ena).collect();
    assert_eq!(enables.len(), 1);
    assert_eq!((enables[0].a1, enables[0].a2), (6, 7));
}

#[test]
fn execute_waits_in_multicycle() {
    let (unit, _log) = ScriptedUnit::new(MultiSlot::Mul, 5, 1);
    let program = ProgramBuilder::new().mul(5, 1, 2).build();
    let mut tc = TestContext::new(program);
    tc.sim = tc.sim.with_unit(Box::new(unit));
    tc.step(2);
    assert_eq!(tc.sim.execute().state(), ExecState::MultiCycle);
    assert!(tc.sim.execute().slot_busy(MultiSlot::Mul));
    assert!(tc.sim.signals().exec.pipeline_hold);
    let _ = tc.run();
    assert_eq!(tc.get_reg(5), 1);
    assert_eq!(tc.sim.stats().inst_multi, 1);
}

#[test]
fn idle_slots_never_see_an_enable() {
    let mut div = MockUnit::new();
    let _ = div.expect_slot().return_const(MultiSlot::Div);
    let _ = div
        .expect_comb()
        .withf(|req| !req.ena)
        .returning(|_| UnitResponse::default());
    let _ = div.expect_clock().return_const(());
    let _ = div.expect_reset().return_const(());

    let program = ProgramBuilder::new().addi(1, 0, 4).mul(2, 1, 1).build();
    let mut tc = TestContext::new(program);
    tc.sim = tc.sim.with_unit(Box::new(div));
    let _ = tc.run();
    assert_eq!(tc.get_reg(2), 16);
}

#[test]
fn divide_by_zero_follows_m_extension() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 17)
        .div(2, 1, 0)
        .divu(3, 1, 0)
        .rem(4, 1, 0)
        .build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.get_reg(2), u64::MAX);
    assert_eq!(tc.get_reg(3), u64::MAX);
    assert_eq!(tc.get_reg(4), 17);
}

#[test]
fn fp_add_reads_and_writes_fp_bank() {
    let program = ProgramBuilder::new().fadd_d(3, 1, 2).build();
    let mut tc = TestContext::new(program);
    let _ = tc.set_reg(33, 1.25f64.to_bits()).set_reg(34, 2.5f64.to_bits());
    let _ = tc.run();
    assert_eq!(f64::from_bits(tc.get_reg(35)), 3.75);
    assert_eq!(tc.get_reg(3), 0);
    assert_eq!(tc.csr(addr::FFLAGS), 0);
}

#[test]
fn fp_divide_by_zero_accrues_flags_without_trapping() {
    let program = ProgramBuilder::new().fdiv_d(3, 1, 2).build();
    let mut tc = TestContext::new(program);
    let _ = tc.set_reg(33, 1.0f64.to_bits());
    let _ = tc.run();
    assert_eq!(f64::from_bits(tc.get_reg(35)), f64::INFINITY);
    assert_eq!(tc.csr(addr::FFLAGS) & 0b01000, 0b01000);
    assert_eq!(tc.sim.stats().traps, 0);
}

// ══════════════════════════════════════════════════════════
// Loads and hazards
// ══════════════════════════════════════════════════════════

#[test]
fn load_use_stalls_until_data_returns() {
    let program = ProgramBuilder::new()
        .lui(1, 0x1000_0000)
        .ld(5, 1, 8)
        .addi(6, 5, 1)
        .build();
    let mut tc = TestContext::new(program);
    let _ = tc.poke(0x1000_0008, 41);
    let _ = tc.run();
    assert_eq!(tc.get_reg(5), 41);
    assert_eq!(tc.get_reg(6), 42);
    assert!(tc.sim.stats().stalls_hazard > 0);
    assert_eq!(tc.sim.stats().inst_load, 1);
}

#[test]
fn independent_work_overlaps_a_load() {
    let program = ProgramBuilder::new()
        .lui(1, 0x1000_0000)
        .ld(5, 1, 0)
        .addi(6, 0, 1)
        .addi(7, 0, 2)
        .build();
    let mut tc = TestContext::new(program);
    let _ = tc.poke(0x1000_0000, 0x55);
    let _ = tc.run();
    assert_eq!(tc.get_reg(5), 0x55);
    assert_eq!((tc.get_reg(6), tc.get_reg(7)), (1, 2));
    assert_eq!(tc.sim.stats().stalls_hazard, 0);
}

// ══════════════════════════════════════════════════════════
// Exceptions
// ══════════════════════════════════════════════════════════

#[test]
fn atomics_raise_illegal_instruction() {
    let program = ProgramBuilder::new().amoadd_w(5, 1, 2).build();
    let mut tc = TestContext::new(program);
    let _ = tc.run();
    assert_eq!(tc.csr(addr::MCAUSE), 2);
    assert_eq!(tc.csr(addr::MEPC), RESET_VECTOR);
}

#[test]
fn fp_disabled_makes_fp_ops_illegal() {
    let mut config = rvpipe_core::Config::default();
    config.general.fpu_enabled = false;
    let program = ProgramBuilder::new().fadd_d(3, 1, 2).build();
    let mut tc = TestContext::with_config(&config, program);
    let _ = tc.run();
    assert_eq!(tc.csr(addr::MCAUSE), 2);
    assert_eq!(tc.get_reg(35), 0);
}
