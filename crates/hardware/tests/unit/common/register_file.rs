//! Unified register file tests.

use proptest::prelude::*;
use rvpipe_core::common::RegisterFile;
use rvpipe_core::common::constants::{FPUREGS_OFFSET, REGS_TOTAL};

#[test]
fn x0_is_hardwired_to_zero() {
    let mut rf = RegisterFile::new();
    rf.write(0, 0xDEAD);
    assert_eq!(rf.read(0), 0);
}

#[test]
fn fp_bank_is_offset_by_32() {
    let mut rf = RegisterFile::new();
    rf.write_f(0, 1.5f64.to_bits());
    assert_eq!(rf.read(FPUREGS_OFFSET), 1.5f64.to_bits());
    // f0 is an ordinary register, unlike x0.
    assert_eq!(rf.read_f(0), 1.5f64.to_bits());
}

#[test]
fn indices_wrap_to_six_bits() {
    let mut rf = RegisterFile::new();
    rf.write(5, 7);
    assert_eq!(rf.read(5 + REGS_TOTAL as u8), 7);
}

proptest! {
    #[test]
    fn write_then_read(idx in 1u8..64, value in any::<u64>()) {
        let mut rf = RegisterFile::new();
        rf.write(idx, value);
        prop_assert_eq!(rf.read(idx), value);
        for other in (0u8..64).filter(|&o| o != idx) {
            prop_assert_eq!(rf.read(other), 0);
        }
    }
}
