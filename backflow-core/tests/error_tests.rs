// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::{FlowError, FnPublisher, Publisher, RangePublisher, SubscriptionState};
use backflow_test_utils::{RecordingSubscriber, Signal};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("sensor {0} offline")]
struct SensorOffline(u64);

fn only_error<T: Clone>(subscriber: &RecordingSubscriber<T>) -> Option<FlowError> {
    subscriber.signals().into_iter().find_map(|signal| match signal {
        Signal::Error(error) => Some(error),
        _ => None,
    })
}

#[test]
fn test_request_zero_signals_invalid_demand() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 5)?;
    let subscriber = RecordingSubscriber::<i64>::new();
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Act
    subscriber.request(0);

    // Assert
    assert!(matches!(
        only_error(&subscriber),
        Some(FlowError::InvalidDemand { requested: 0 })
    ));
    assert_eq!(handle.state(), SubscriptionState::Errored);
    subscriber.assert_well_formed();
    Ok(())
}

#[test]
fn test_negative_request_signals_invalid_demand_once() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 5)?;
    let subscriber = RecordingSubscriber::<i64>::new();
    publisher.subscribe(subscriber.clone());
    subscriber.request(2);

    // Act
    subscriber.request(-5);
    subscriber.request(-7);
    subscriber.request(10);
    subscriber.cancel();

    // Assert
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(subscriber.terminal_count(), 1);
    assert!(matches!(
        only_error(&subscriber),
        Some(FlowError::InvalidDemand { requested: -5 })
    ));
    Ok(())
}

#[test]
fn test_invalid_request_inside_on_subscribe() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 5)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .initial_request(-1)
        .build();

    // Act
    publisher.subscribe(subscriber.clone());

    // Assert
    assert_eq!(
        subscriber.error_messages(),
        vec!["Invalid demand: request(-1) must be positive".to_string()]
    );
    assert_eq!(subscriber.next_count(), 0);
    Ok(())
}

#[test]
fn test_request_zero_after_cancel_delivers_nothing() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 5)?;
    let subscriber = RecordingSubscriber::<i64>::new();
    let handle = publisher.subscribe_with_handle(subscriber.clone());
    subscriber.cancel();

    // Act
    subscriber.request(0);

    // Assert
    assert_eq!(subscriber.signals(), vec![Signal::Subscribe]);
    assert_eq!(handle.state(), SubscriptionState::Cancelled);
    Ok(())
}

#[test]
fn test_request_zero_after_complete_is_ignored() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 1)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .initial_request(1)
        .build();
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Act
    subscriber.request(0);

    // Assert
    assert_eq!(subscriber.terminal_count(), 1);
    assert!(subscriber.is_completed());
    assert_eq!(handle.state(), SubscriptionState::Completed);
    Ok(())
}

#[test]
fn test_panic_in_on_next_becomes_on_error() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 10)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .initial_request(10)
        .panic_on(2)
        .build();

    // Act
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Assert
    assert_eq!(subscriber.values(), vec![1, 2]);
    let error = only_error(&subscriber);
    assert!(matches!(error, Some(FlowError::CallbackPanic { .. })));
    assert_eq!(
        subscriber.error_messages(),
        vec!["User callback panicked: on_next: scripted panic in on_next #2".to_string()]
    );
    assert_eq!(handle.state(), SubscriptionState::Errored);
    assert_eq!(Arc::strong_count(&subscriber), 1);
    Ok(())
}

#[test]
fn test_panic_in_on_subscribe_terminates_subscription() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 3)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .panic_on_subscribe()
        .build();

    // Act
    let handle = publisher.subscribe_with_handle(subscriber.clone());
    subscriber.request(3);

    // Assert
    assert_eq!(subscriber.next_count(), 0);
    assert!(matches!(
        only_error(&subscriber),
        Some(FlowError::CallbackPanic { .. })
    ));
    assert_eq!(handle.state(), SubscriptionState::Errored);
    subscriber.assert_well_formed();
    Ok(())
}

#[test]
fn test_panic_in_on_complete_does_not_escape() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 2)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .panic_on_terminal()
        .build();
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Act
    subscriber.request(5);

    // Assert
    assert!(subscriber.is_completed());
    assert_eq!(subscriber.terminal_count(), 1);
    assert_eq!(handle.state(), SubscriptionState::Completed);
    Ok(())
}

#[test]
fn test_panic_in_on_error_does_not_escape() -> anyhow::Result<()> {
    // Arrange
    let publisher = RangePublisher::new(1, 2)?;
    let subscriber = RecordingSubscriber::<i64>::builder()
        .panic_on_terminal()
        .build();
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Act
    subscriber.request(-1);

    // Assert
    assert_eq!(subscriber.terminal_count(), 1);
    assert_eq!(handle.state(), SubscriptionState::Errored);
    Ok(())
}

#[test]
fn test_generator_error_is_delivered_as_user_error() {
    // Arrange
    let publisher = FnPublisher::new(5, |index| {
        if index == 3 {
            Err(SensorOffline(index))
        } else {
            Ok(index * 10)
        }
    });
    let subscriber = RecordingSubscriber::<u64>::builder()
        .initial_request(i64::MAX)
        .build();

    // Act
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Assert
    assert_eq!(subscriber.values(), vec![0, 10, 20]);
    assert!(matches!(
        only_error(&subscriber),
        Some(FlowError::UserError(_))
    ));
    assert_eq!(
        subscriber.error_messages(),
        vec!["User error: sensor 3 offline".to_string()]
    );
    assert_eq!(handle.emitted(), 3);
    assert_eq!(handle.state(), SubscriptionState::Errored);
}

#[test]
fn test_generator_panic_becomes_on_error() {
    // Arrange
    let publisher = FnPublisher::new(3, |index| {
        if index == 1 {
            panic!("generator exploded");
        }
        Ok::<_, SensorOffline>(index)
    });
    let subscriber = RecordingSubscriber::<u64>::new();
    let handle = publisher.subscribe_with_handle(subscriber.clone());

    // Act
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| subscriber.request(3)));

    // Assert
    assert!(outcome.is_ok());
    assert_eq!(subscriber.values(), vec![0]);
    assert_eq!(
        subscriber.error_messages(),
        vec!["User callback panicked: element: generator exploded".to_string()]
    );
    assert_eq!(subscriber.terminal_count(), 1);
    assert_eq!(handle.state(), SubscriptionState::Errored);
    assert_eq!(Arc::strong_count(&subscriber), 1);

    // Act
    subscriber.request(1);

    // Assert
    assert_eq!(subscriber.terminal_count(), 1);
    subscriber.assert_well_formed();
}

#[test]
fn test_overflowing_range_is_rejected() {
    // Act
    let result = RangePublisher::new(i64::MAX - 1, 3);

    // Assert
    assert!(matches!(
        result,
        Err(FlowError::InvalidRange {
            start,
            count: 3
        }) if start == i64::MAX - 1
    ));
}
