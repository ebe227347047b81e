//! Trap controller tests.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvpipe_core::core::pipeline::latches::ExceptionPulses;
use rvpipe_core::core::pipeline::traits::ClockedStage;
use rvpipe_core::core::units::fpu::exception_flags::FpFlags;
use rvpipe_core::soc::TrapController;
use rvpipe_core::soc::trap::{CAUSE_INTERRUPT, TrapInput, prioritize};

const VECTOR: u64 = 0x2_0000;

fn pulses(f: impl FnOnce(&mut ExceptionPulses)) -> TrapInput {
    let mut exceptions = ExceptionPulses {
        pc: 0x1_0008,
        npc: 0x1_000C,
        ..ExceptionPulses::default()
    };
    f(&mut exceptions);
    TrapInput {
        exceptions,
        vector: VECTOR,
        fault_pc: 0x1_0000,
        fault_addr: 0xBAD0,
        ..TrapInput::default()
    }
}

#[rstest]
#[case(pulses(|p| p.illegal_instr = true), 2)]
#[case(pulses(|p| p.breakpoint = true), 3)]
#[case(pulses(|p| p.ecall = true), 11)]
#[case(pulses(|p| p.unalign_load = true), 4)]
#[case(pulses(|p| p.unalign_store = true), 6)]
#[case(pulses(|p| { p.ecall = true; p.illegal_instr = true; }), 2)]
#[case(TrapInput { load_fault: true, ..pulses(|p| p.ecall = true) }, 5)]
#[case(TrapInput { store_fault: true, ..pulses(|p| p.breakpoint = true) }, 7)]
fn highest_priority_cause_wins(#[case] input: TrapInput, #[case] cause: u64) {
    assert_eq!(prioritize(&input).map(|c| c.cause), Some(cause));
}

#[test]
fn memory_fault_reports_address() {
    let t = prioritize(&TrapInput {
        load_fault: true,
        ..pulses(|_| {})
    });
    assert_eq!(t.map(|c| (c.epc, c.tval)), Some((0x1_0000, 0xBAD0)));
}

#[test]
fn fpu_flags_never_trap() {
    assert_eq!(prioritize(&pulses(|p| p.fpu = FpFlags::DZ | FpFlags::NX)), None);
}

#[test]
fn request_holds_until_acknowledged() {
    let mut t = TrapController::new();
    let o = t.comb(&pulses(|p| p.ecall = true));
    assert_eq!(o.trap, None);
    t.clock(false);

    for _ in 0..3 {
        let o = t.comb(&pulses(|p| p.illegal_instr = true));
        assert_eq!(o.trap, Some(VECTOR));
        assert_eq!(o.taken, None);
        t.clock(false);
    }

    let o = t.comb(&TrapInput {
        trap_ready: true,
        ..pulses(|_| {})
    });
    let taken = o.taken.unwrap();
    // The illegal-instruction pulses arrived while the ecall was pending.
    assert_eq!((taken.cause, taken.epc), (11, 0x1_0008));
    t.clock(false);
    assert_eq!(t.pending(), None);
    assert_eq!(t.taken(), 1);
}

#[test]
fn interrupt_returns_to_next_pc() {
    let mut t = TrapController::new();
    t.raise_interrupt(7);
    let _ = t.comb(&pulses(|_| {}));
    t.clock(false);
    let pending = t.pending().unwrap();
    assert!(pending.is_interrupt());
    assert_eq!(pending.cause, CAUSE_INTERRUPT | 7);

    let o = t.comb(&TrapInput {
        trap_ready: true,
        npc: 0x1_0020,
        ..pulses(|_| {})
    });
    assert_eq!(o.taken.map(|c| c.epc), Some(0x1_0020));
}
