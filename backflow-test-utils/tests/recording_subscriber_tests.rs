// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use backflow_core::{FlowError, Subscriber, Subscription};
use backflow_test_utils::{RecordingSubscriber, Signal};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Subscription double that only records the calls it receives.
#[derive(Default)]
struct FakeSubscription {
    requests: Mutex<Vec<i64>>,
    cancels: Mutex<usize>,
}

impl Subscription for FakeSubscription {
    fn request(&self, n: i64) {
        self.requests.lock().push(n);
    }

    fn cancel(&self) {
        *self.cancels.lock() += 1;
    }
}

#[test]
fn test_records_signals_in_order() {
    // Arrange
    let subscriber = RecordingSubscriber::<i32>::new();
    let subscription = Arc::new(FakeSubscription::default());

    // Act
    subscriber.on_subscribe(subscription);
    subscriber.on_next(1);
    subscriber.on_next(2);
    subscriber.on_complete();

    // Assert
    assert_eq!(
        subscriber.signals(),
        vec![
            Signal::Subscribe,
            Signal::Next(1),
            Signal::Next(2),
            Signal::Complete
        ]
    );
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(subscriber.next_count(), 2);
    assert_eq!(subscriber.terminal_count(), 1);
    subscriber.assert_well_formed();
}

#[test]
fn test_initial_request_is_issued_in_on_subscribe() {
    // Arrange
    let subscriber = RecordingSubscriber::<i32>::builder()
        .initial_request(7)
        .build();
    let subscription = Arc::new(FakeSubscription::default());

    // Act
    subscriber.on_subscribe(subscription.clone());

    // Assert
    assert_eq!(*subscription.requests.lock(), vec![7]);
}

#[test]
fn test_request_per_item_and_cancel_after() {
    // Arrange
    let subscriber = RecordingSubscriber::<i32>::builder()
        .request_per_item(2)
        .cancel_after(2)
        .build();
    let subscription = Arc::new(FakeSubscription::default());
    subscriber.on_subscribe(subscription.clone());

    // Act
    subscriber.on_next(1);
    subscriber.on_next(2);

    // Assert
    assert_eq!(*subscription.requests.lock(), vec![2, 2]);
    assert_eq!(*subscription.cancels.lock(), 1);
}

#[test]
fn test_panic_on_nth_item() {
    // Arrange
    let subscriber = RecordingSubscriber::<i32>::builder().panic_on(2).build();
    subscriber.on_subscribe(Arc::new(FakeSubscription::default()));
    subscriber.on_next(1);

    // Act
    let result = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_next(2)));

    // Assert
    assert!(result.is_err());
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(subscriber.overlap_count(), 0);
}

#[test]
fn test_error_messages_are_rendered() {
    // Arrange
    let subscriber = RecordingSubscriber::<i32>::new();
    subscriber.on_subscribe(Arc::new(FakeSubscription::default()));

    // Act
    subscriber.on_error(FlowError::invalid_demand(0));

    // Assert
    assert_eq!(
        subscriber.error_messages(),
        vec!["Invalid demand: request(0) must be positive".to_string()]
    );
    assert!(!subscriber.is_completed());
    subscriber.assert_well_formed();
}

#[test]
#[should_panic(expected = "terminal signal must be last")]
fn test_well_formed_rejects_signal_after_terminal() {
    let subscriber = RecordingSubscriber::<i32>::new();
    subscriber.on_subscribe(Arc::new(FakeSubscription::default()));
    subscriber.on_complete();
    subscriber.on_next(1);

    subscriber.assert_well_formed();
}

#[test]
#[should_panic(expected = "first signal must be on_subscribe")]
fn test_well_formed_requires_subscribe_first() {
    let subscriber = RecordingSubscriber::<i32>::new();
    subscriber.on_next(1);

    subscriber.assert_well_formed();
}

#[test]
fn test_signal_equality_compares_error_messages() {
    let a: Signal<i32> = Signal::Error(FlowError::invalid_demand(-1));
    let b: Signal<i32> = Signal::Error(FlowError::invalid_demand(-1));
    let c: Signal<i32> = Signal::Error(FlowError::invalid_demand(0));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(Signal::Next(1), Signal::Complete);
}
