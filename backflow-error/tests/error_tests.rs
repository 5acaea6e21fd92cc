// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_error::{FlowError, IntoFlowError, Result};
use std::error::Error;
use std::io;

#[test]
fn test_error_display() {
    let err = FlowError::invalid_demand(0);
    assert_eq!(
        err.to_string(),
        "Invalid demand: request(0) must be positive"
    );

    let err = FlowError::invalid_range(i64::MAX, 2);
    assert_eq!(
        err.to_string(),
        format!("Invalid range: start {} with count 2 overflows i64", i64::MAX)
    );

    let err = FlowError::callback_panic("on_next: boom");
    assert_eq!(err.to_string(), "User callback panicked: on_next: boom");
}

#[test]
fn test_error_constructors() {
    let err = FlowError::invalid_demand(-3);
    assert!(matches!(err, FlowError::InvalidDemand { requested: -3 }));

    let err = FlowError::invalid_range(5, 10);
    assert!(matches!(err, FlowError::InvalidRange { start: 5, count: 10 }));

    let err = FlowError::user_error(io::Error::other("disk"));
    assert!(matches!(err, FlowError::UserError(_)));
}

#[test]
fn test_from_panic_with_str_payload() {
    let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();

    let err = FlowError::from_panic("on_next", payload.as_ref());

    assert_eq!(
        err.to_string(),
        "User callback panicked: on_next: static message"
    );
}

#[test]
fn test_from_panic_with_string_payload() {
    let value = 7;
    let payload = std::panic::catch_unwind(|| panic!("formatted {value}")).unwrap_err();

    let err = FlowError::from_panic("on_complete", payload.as_ref());

    assert_eq!(
        err.to_string(),
        "User callback panicked: on_complete: formatted 7"
    );
}

#[test]
fn test_from_panic_with_opaque_payload() {
    let payload = std::panic::catch_unwind(|| std::panic::panic_any(42_u32)).unwrap_err();

    let err = FlowError::from_panic("on_subscribe", payload.as_ref());

    assert!(err.to_string().contains("non-string panic payload"));
}

#[test]
fn test_classification() {
    assert!(FlowError::invalid_demand(0).is_protocol_violation());
    assert!(!FlowError::invalid_demand(0).is_user_failure());

    assert!(FlowError::callback_panic("x").is_user_failure());
    assert!(FlowError::user_error(io::Error::other("x")).is_user_failure());
    assert!(!FlowError::invalid_range(0, 0).is_protocol_violation());
}

#[test]
fn test_into_flow_error() {
    let err = io::Error::other("generator failed").into_flow_error();

    assert!(matches!(err, FlowError::UserError(_)));
    assert!(err.to_string().contains("generator failed"));
    assert!(err.source().is_some());
}

#[test]
fn test_clone_keeps_user_error_message() {
    let err = FlowError::user_error(io::Error::other("original"));

    let cloned = err.clone();

    assert!(matches!(cloned, FlowError::UserError(_)));
    assert_eq!(cloned.to_string(), err.to_string());
}

#[test]
fn test_clone_structured_variants() {
    let err = FlowError::invalid_demand(-1);
    assert!(matches!(err.clone(), FlowError::InvalidDemand { requested: -1 }));

    let err = FlowError::callback_panic("ctx");
    assert_eq!(err.clone().to_string(), err.to_string());
}

#[test]
fn test_result_alias() {
    fn parse(n: i64) -> Result<u64> {
        u64::try_from(n)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(FlowError::invalid_demand(n))
    }

    assert_eq!(parse(3).unwrap(), 3);
    assert!(parse(0).is_err());
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FlowError>();
}
