//! Memory-Access queue capacity tests.
//!
//! The stage holds up to two queued operations plus the one on the bus, and deasserts
//! `memop_ready` exactly when the queue is full.

use proptest::prelude::*;
use rvpipe_core::common::constants::MEMACCESS_QUEUE_DEPTH;
use rvpipe_core::core::pipeline::latches::{DataMemResponse, MemAccessInput, MemopRequest};
use rvpipe_core::core::pipeline::signals::MemopSize;
use rvpipe_core::core::pipeline::stages::memaccess::{MemAccess, MemState};
use rvpipe_core::core::pipeline::traits::ClockedStage;

fn load(addr: u64, waddr: u8) -> MemopRequest {
    MemopRequest {
        waddr,
        size: MemopSize::Double,
        addr,
        ..MemopRequest::default()
    }
}

#[test]
fn stalled_memory_fills_queue() {
    let mut m = MemAccess::new();
    let stalled = MemAccessInput {
        wb_ready: true,
        ..MemAccessInput::default()
    };
    for n in 0..3u8 {
        let o = m.comb(&MemAccessInput {
            memop: Some(load(0x1000_0000 + u64::from(n) * 8, n + 1)),
            ..stalled
        });
        assert!(o.memop_ready, "push {n} refused");
        m.clock(false);
    }
    // One on the bus, two queued.
    assert_eq!(m.state(), MemState::WaitReqAccept);
    assert_eq!(m.queued(), MEMACCESS_QUEUE_DEPTH);
    let o = m.comb(&stalled);
    assert!(!o.memop_ready);
    assert!(o.mem.valid);
    assert_eq!(o.mem.addr, 0x1000_0000);
}

#[test]
fn flush_squashes_every_queued_load() {
    let mut m = MemAccess::new();
    for n in 0..2u8 {
        let _ = m.comb(&MemAccessInput {
            memop: Some(load(0x1000_0000, n + 1)),
            ..MemAccessInput::default()
        });
        m.clock(false);
    }
    let _ = m.comb(&MemAccessInput {
        flush: true,
        ..MemAccessInput::default()
    });
    m.clock(false);

    // Answer everything that reaches the bus; nothing may write back.
    let mut cycles = 0;
    while !m.is_drained() {
        let o = m.comb(&MemAccessInput {
            wb_ready: true,
            mem: DataMemResponse {
                req_ready: true,
                data_valid: true,
                data_addr: 0x1000_0000,
                data: 0xAA,
                ..DataMemResponse::default()
            },
            ..MemAccessInput::default()
        });
        assert!(!o.wb.wena);
        m.clock(false);
        cycles += 1;
        assert!(cycles < 10);
    }
}

proptest! {
    #[test]
    fn queue_never_exceeds_capacity(
        pattern in prop::collection::vec((any::<bool>(), any::<bool>()), 1..64)
    ) {
        let mut m = MemAccess::new();
        let mut outstanding = 0usize;
        for (push, respond) in pattern {
            let mem = DataMemResponse {
                req_ready: respond,
                data_valid: respond && m.state() == MemState::WaitResponse,
                data_addr: 0x1000_0000,
                ..DataMemResponse::default()
            };
            let idle = MemAccessInput { wb_ready: true, mem, ..MemAccessInput::default() };
            let ready = m.comb(&idle).memop_ready;
            prop_assert_eq!(ready, m.queued() < MEMACCESS_QUEUE_DEPTH);

            let o = if push && ready {
                outstanding += 1;
                m.comb(&MemAccessInput { memop: Some(load(0x1000_0000, 1)), ..idle })
            } else {
                m.comb(&idle)
            };
            if o.wb.wena {
                outstanding -= 1;
            }
            m.clock(false);
            prop_assert!(m.queued() <= MEMACCESS_QUEUE_DEPTH);
            prop_assert!(outstanding <= MEMACCESS_QUEUE_DEPTH + 1);
        }
    }
}
