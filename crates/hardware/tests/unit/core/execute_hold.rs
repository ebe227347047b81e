//! Execute structural stalls, driven directly through the stage ports.
//!
//! A dispatch that finds a multi-cycle slot busy, or a memory operation that finds the
//! Memory-Access queue full, parks Execute in `Hold` without consuming the instruction.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rvpipe_core::common::constants::RESET_VECTOR;
use rvpipe_core::core::pipeline::latches::{
    DecodedInstr, ExecuteInput, ExecuteOutput, UnitResponse,
};
use rvpipe_core::core::pipeline::signals::MultiSlot;
use rvpipe_core::core::pipeline::stages::Execute;
use rvpipe_core::core::pipeline::stages::execute::ExecState;
use rvpipe_core::core::pipeline::traits::ClockedStage;
use rvpipe_core::isa::opcode::Opcode;

const VECTOR: u64 = 0x20000;

fn instr(pc: u64, op: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> DecodedInstr {
    DecodedInstr::new(pc, op.encode(rd, rs1, rs2, imm), op)
}

fn ready() -> ExecuteInput {
    ExecuteInput {
        wb_ready: true,
        memop_ready: true,
        ..ExecuteInput::default()
    }
}

fn tick(e: &mut Execute, i: &ExecuteInput) -> ExecuteOutput {
    let o = e.comb(i);
    e.clock(false);
    o
}

fn busy_slots(e: &Execute) -> usize {
    MultiSlot::ALL.iter().filter(|s| e.slot_busy(**s)).count()
}

fn unit_valid(slot: MultiSlot, result: u64) -> [UnitResponse; 3] {
    let mut units = [UnitResponse::default(); 3];
    units[slot.index()] = UnitResponse {
        valid: true,
        result,
        ..UnitResponse::default()
    };
    units
}

#[test]
fn second_dispatch_waits_for_busy_slot() {
    let mut e = Execute::default();
    let _ = tick(
        &mut e,
        &ExecuteInput {
            d: Some(instr(RESET_VECTOR, Opcode::Mul, 5, 1, 2, 0)),
            ..ready()
        },
    );
    assert_eq!(e.state(), ExecState::MultiCycle);

    // A trap abandons the multiply but its slot keeps computing.
    let o = tick(
        &mut e,
        &ExecuteInput {
            trap: Some(VECTOR),
            ..ready()
        },
    );
    assert!(o.trap_ready);
    assert_eq!(e.state(), ExecState::WaitInstr);
    assert!(e.slot_busy(MultiSlot::Mul));

    let div = ExecuteInput {
        d: Some(instr(VECTOR, Opcode::Div, 6, 1, 2, 0)),
        ..ready()
    };
    let o = tick(&mut e, &div);
    assert_eq!(e.state(), ExecState::Hold);
    assert!(o.pipeline_hold && !o.valid);
    assert!(!o.units[MultiSlot::Div.index()].ena);
    assert_eq!(e.npc(), VECTOR);
    assert_eq!(busy_slots(&e), 1);

    // The abandoned result frees the slot without writing back.
    let o = tick(
        &mut e,
        &ExecuteInput {
            units: unit_valid(MultiSlot::Mul, 42),
            ..div
        },
    );
    assert!(!o.wb.wena);
    assert_eq!(e.state(), ExecState::Hold);
    assert_eq!(busy_slots(&e), 0);

    let o = tick(&mut e, &div);
    assert!(o.valid);
    assert_eq!(e.state(), ExecState::MultiCycle);
    assert!(e.slot_busy(MultiSlot::Div));
    assert_eq!(e.npc(), VECTOR + 4);
}

#[test]
fn full_memory_queue_holds_loads_and_stores() {
    for op in [Opcode::Ld, Opcode::Sd] {
        let mut e = Execute::default();
        let d = Some(instr(RESET_VECTOR, op, 5, 1, 2, 8));
        let o = tick(
            &mut e,
            &ExecuteInput {
                d,
                memop_ready: false,
                ..ready()
            },
        );
        assert_eq!(e.state(), ExecState::Hold, "{op:?}");
        assert!(o.pipeline_hold && !o.valid);
        assert!(o.memop.is_none());
        assert_eq!(e.npc(), RESET_VECTOR);

        let o = tick(&mut e, &ExecuteInput { d, ..ready() });
        assert!(o.valid);
        assert_eq!(o.memop.map(|m| m.addr), Some(8));
        assert_eq!(e.state(), ExecState::WaitInstr);
        assert_eq!(e.npc(), RESET_VECTOR + 4);
    }
}

fn multi_op() -> impl Strategy<Value = Opcode> {
    prop_oneof![
        Just(Opcode::Mul),
        Just(Opcode::Div),
        Just(Opcode::FaddD),
        Just(Opcode::Addi),
    ]
}

proptest! {
    #[test]
    fn at_most_one_slot_busy(
        steps in prop::collection::vec((multi_op(), 0u8..4, any::<bool>(), 0u8..8), 1..80)
    ) {
        let mut e = Execute::default();
        for (op, respond, trap, rd) in steps {
            let mut units = [UnitResponse::default(); 3];
            if let Some(slot) = MultiSlot::ALL.get(usize::from(respond)) {
                units[slot.index()] = UnitResponse {
                    valid: e.slot_busy(*slot),
                    result: 1,
                    ..UnitResponse::default()
                };
            }
            let i = ExecuteInput {
                d: Some(instr(e.npc(), op, rd + 1, 1, 2, 1)),
                units,
                trap: (trap && rd == 0).then_some(VECTOR),
                ..ready()
            };
            let _ = tick(&mut e, &i);
            prop_assert!(busy_slots(&e) <= 1);
        }
    }
}
