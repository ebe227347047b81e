//! CSR file tests through its bus interface.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvpipe_core::config::CsrConfig;
use rvpipe_core::core::pipeline::latches::{CsrRequest, CsrResponse};
use rvpipe_core::core::pipeline::signals::CsrCommand;
use rvpipe_core::core::pipeline::traits::ClockedStage;
use rvpipe_core::core::units::fpu::exception_flags::FpFlags;
use rvpipe_core::soc::CsrFile;
use rvpipe_core::soc::csr_file::{addr, is_read_only};

fn file() -> CsrFile {
    CsrFile::new(&CsrConfig {
        hart_id: 2,
        ..CsrConfig::default()
    })
}

/// Runs one command to completion and returns the response.
fn transact(f: &mut CsrFile, cmd: CsrCommand, a: u16, data: u64) -> CsrResponse {
    let o = f.comb(&CsrRequest {
        req_valid: true,
        req_type: cmd,
        req_addr: a,
        req_data: data,
        resp_ready: false,
    });
    assert!(o.req_ready);
    f.clock(false);
    for _ in 0..16 {
        let o = f.comb(&CsrRequest {
            resp_ready: true,
            ..CsrRequest::default()
        });
        f.clock(false);
        if o.resp_valid {
            return o;
        }
    }
    panic!("no response to {cmd:?} {a:#x}");
}

#[rstest]
#[case(addr::CYCLE, true)]
#[case(addr::MHARTID, true)]
#[case(addr::MSCRATCH, false)]
#[case(addr::MCYCLE, false)]
fn read_only_range(#[case] a: u16, #[case] ro: bool) {
    assert_eq!(is_read_only(a), ro);
}

#[test]
fn hart_id_comes_from_config() {
    let mut f = file();
    assert_eq!(transact(&mut f, CsrCommand::READ, addr::MHARTID, 0).resp_data, 2);
}

#[test]
fn fcsr_aliases_frm_and_fflags() {
    let mut f = file();
    let _ = transact(&mut f, CsrCommand::WRITE, addr::FCSR, (0b011 << 5) | 0b10001);
    assert_eq!(f.read(addr::FRM), Some(0b011));
    assert_eq!(f.read(addr::FFLAGS), Some(0b10001));
    f.accrue_fflags(FpFlags::DZ);
    assert_eq!(f.read(addr::FCSR), Some((0b011 << 5) | 0b11001));
}

#[test]
fn counters_advance_and_shadow() {
    let mut f = file();
    for _ in 0..5 {
        let _ = f.comb(&CsrRequest::default());
        f.clock(false);
    }
    f.retire();
    assert_eq!(f.read(addr::MCYCLE), Some(5));
    assert_eq!(f.read(addr::CYCLE), Some(5));
    assert_eq!(f.read(addr::INSTRET), Some(1));
}

#[test]
fn interrupt_command_sets_cause_msb() {
    let mut f = file();
    let o = transact(&mut f, CsrCommand::INTERRUPT, 11, 0x1_0010);
    assert_eq!(o.resp_data, f.trap_vector());
    assert_eq!(f.read(addr::MCAUSE), Some((1 << 63) | 11));
    assert_eq!(f.read(addr::MEPC), Some(0x1_0010));
}

#[test]
fn breakpoint_halts_and_records_dpc() {
    let mut f = file();
    let _ = transact(&mut f, CsrCommand::BREAKPOINT, 0, 0x1_0004);
    assert!(f.halted());
    assert_eq!(f.read(addr::DPC), Some(0x1_0004));
}

#[test]
fn reset_restores_values() {
    let mut f = file();
    let _ = transact(&mut f, CsrCommand::WRITE, addr::MSCRATCH, 9);
    let _ = transact(&mut f, CsrCommand::HALT, 0, 0);
    let _ = f.comb(&CsrRequest::default());
    f.clock(true);
    assert_eq!(f.read(addr::MSCRATCH), Some(0));
    assert!(!f.halted());
}

#[test]
fn empty_command_is_rejected() {
    let mut f = file();
    assert!(transact(&mut f, CsrCommand::NONE, addr::MSTATUS, 0).resp_exception);
}
