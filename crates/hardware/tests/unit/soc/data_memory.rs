//! Data memory slave tests.

use pretty_assertions::assert_eq;
use rvpipe_core::config::{MemoryConfig, MemoryController};
use rvpipe_core::core::pipeline::latches::{DataMemRequest, DataMemResponse};
use rvpipe_core::core::pipeline::signals::MemopSize;
use rvpipe_core::core::pipeline::traits::ClockedStage;
use rvpipe_core::soc::DataMemory;

const BASE: u64 = 0x1000_0000;

fn memory(config: MemoryConfig) -> DataMemory {
    DataMemory::new(&MemoryConfig {
        base: BASE,
        size: 0x1000,
        ..config
    })
}

fn read(addr: u64) -> DataMemRequest {
    DataMemRequest {
        valid: true,
        addr,
        size: MemopSize::Double,
        resp_ready: true,
        ..DataMemRequest::default()
    }
}

/// Presents `req` until accepted, then waits for the response. Returns it with the number of
/// cycles from acceptance to response.
fn access(m: &mut DataMemory, req: DataMemRequest) -> (DataMemResponse, u32) {
    loop {
        let o = m.comb(&req);
        m.clock(false);
        if o.req_ready {
            break;
        }
    }
    let idle = DataMemRequest {
        resp_ready: true,
        ..DataMemRequest::default()
    };
    for n in 1..64 {
        let o = m.comb(&idle);
        m.clock(false);
        if o.data_valid {
            return (o, n);
        }
    }
    panic!("no response");
}

#[test]
fn simple_latency_is_honoured() {
    let mut m = memory(MemoryConfig {
        latency: 5,
        ..MemoryConfig::default()
    });
    assert!(m.poke(BASE + 8, 0xCAFE));
    let (o, n) = access(&mut m, read(BASE + 12));
    assert_eq!(n, 5);
    assert_eq!(o.data, 0xCAFE);
    assert_eq!(o.data_addr, BASE + 12);
}

#[test]
fn byte_store_uses_strobes() {
    let mut m = memory(MemoryConfig::default());
    assert!(m.poke(BASE, u64::MAX));
    let _ = access(
        &mut m,
        DataMemRequest {
            write: true,
            wdata: 0x0000_0000_0011_0000,
            wstrb: 0b0000_0100,
            size: MemopSize::Byte,
            ..read(BASE + 2)
        },
    );
    assert_eq!(m.peek(BASE), Some(0xFFFF_FFFF_FF11_FFFF));
    assert_eq!(m.requests(), 1);
}

#[test]
fn out_of_range_faults() {
    let mut m = memory(MemoryConfig::default());
    let (o, _) = access(&mut m, read(BASE + 0x1000));
    assert!(o.load_fault);
    let (o, _) = access(
        &mut m,
        DataMemRequest {
            write: true,
            ..read(BASE - 8)
        },
    );
    assert!(o.store_fault && !o.load_fault);
}

#[test]
fn dram_row_hits_are_faster() {
    let mut m = memory(MemoryConfig {
        controller: MemoryController::Dram,
        t_cas: 2,
        t_ras: 3,
        t_pre: 4,
        ..MemoryConfig::default()
    });
    let (_, first) = access(&mut m, read(BASE));
    let (_, hit) = access(&mut m, read(BASE + 8));
    assert!(hit < first, "row hit {hit} vs first access {first}");
    assert_eq!(hit, 2);
}

#[test]
fn ready_period_throttles_acceptance() {
    let mut m = memory(MemoryConfig {
        ready_period: 4,
        latency: 1,
        ..MemoryConfig::default()
    });
    let mut ready = Vec::new();
    for _ in 0..8 {
        ready.push(m.comb(&DataMemRequest::default()).req_ready);
        m.clock(false);
    }
    assert_eq!(ready, [true, false, false, false, true, false, false, false]);
}
