//! Exception and simulator error tests.

use pretty_assertions::assert_eq;
use rvpipe_core::common::{Exception, SimError};

#[test]
fn cause_codes_round_trip_through_lookup() {
    for e in Exception::ALL {
        assert_eq!(Exception::from_code(e.code()), Some(e));
    }
}

#[test]
fn combinational_loop_message_names_cycle() {
    let err = SimError::CombinationalLoop {
        cycle: 42,
        iterations: 16,
    };
    assert_eq!(
        err.to_string(),
        "combinational logic did not settle after 16 delta cycles at cycle 42"
    );
}

#[test]
fn json_errors_convert() {
    let err: SimError = serde_json::from_str::<u64>("nope").map_err(SimError::from).unwrap_err();
    assert!(matches!(err, SimError::Json(_)));
}

#[test]
fn timeout_message() {
    let err = SimError::Timeout {
        what: "debug access",
        cycles: 1000,
    };
    assert_eq!(err.to_string(), "debug access did not complete within 1000 cycles");
}
