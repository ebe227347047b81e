//! Bit Manipulation Helper Tests.

use proptest::prelude::*;
use rstest::rstest;
use rvpipe_core::common::SimError;
use rvpipe_core::common::bits::{check_width, field, mask, sign_extend};

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(12, 0xFFF)]
#[case(63, u64::MAX >> 1)]
#[case(64, u64::MAX)]
fn mask_widths(#[case] width: u32, #[case] expected: u64) {
    assert_eq!(mask(width), expected);
}

#[test]
fn sign_extend_negative_immediate() {
    assert_eq!(sign_extend(0xFFF, 12), u64::MAX);
    assert_eq!(sign_extend(0x7FF, 12), 0x7FF);
    assert_eq!(sign_extend(0x8000_0000, 32), 0xFFFF_FFFF_8000_0000);
}

#[test]
fn field_extracts_inclusive_range() {
    // rd of `addi x5, x0, 7`
    assert_eq!(field(0x0070_0293, 11, 7), 5);
    assert_eq!(field(0x0070_0293, 31, 20), 7);
}

#[test]
fn check_width_rejects_oversized_values() {
    assert!(check_width("csr_addr", 0xFFF, 12).is_ok());
    let err = check_width("csr_addr", 0x1000, 12);
    assert!(matches!(
        err,
        Err(SimError::WidthViolation {
            signal: "csr_addr",
            value: 0x1000,
            width: 12
        })
    ));
}

proptest! {
    #[test]
    fn sign_extend_is_idempotent(value in any::<u64>(), width in 1u32..=64) {
        let once = sign_extend(value, width);
        prop_assert_eq!(sign_extend(once, width), once);
    }

    #[test]
    fn check_width_matches_mask(value in any::<u64>(), width in 1u32..64) {
        prop_assert_eq!(check_width("sig", value, width).is_ok(), value & !mask(width) == 0);
    }
}
