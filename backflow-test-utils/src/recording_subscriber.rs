// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A scriptable subscriber that records every signal it receives.

use crate::signal::Signal;
use backflow_core::{FlowError, Subscriber, Subscription};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Scripted reactions of a [`RecordingSubscriber`].
#[derive(Debug, Clone, Default)]
struct Script {
    initial_request: Option<i64>,
    request_per_item: Option<i64>,
    cancel_after: Option<usize>,
    panic_on: Option<usize>,
    panic_on_subscribe: bool,
    panic_on_terminal: bool,
    on_next_delay: Option<Duration>,
}

/// Subscriber that records signals and can be scripted to request, cancel or panic.
///
/// Overlapping `on_next` calls are counted rather than asserted inside the callback,
/// because a panic there would be caught by the publisher.
///
/// # Example
///
/// ```
/// use backflow_core::{Publisher, RangePublisher};
/// use backflow_test_utils::{RecordingSubscriber, Signal};
///
/// let publisher = RangePublisher::new(1, 2).unwrap();
/// let subscriber = RecordingSubscriber::<i64>::builder().initial_request(5).build();
///
/// publisher.subscribe(subscriber.clone());
///
/// assert_eq!(
///     subscriber.signals(),
///     vec![Signal::Subscribe, Signal::Next(1), Signal::Next(2), Signal::Complete]
/// );
/// ```
pub struct RecordingSubscriber<T> {
    script: Script,
    signals: Mutex<Vec<Signal<T>>>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    next_count: AtomicUsize,
    in_next: AtomicBool,
    overlaps: AtomicUsize,
}

/// Builder for [`RecordingSubscriber`].
pub struct RecordingSubscriberBuilder<T> {
    script: Script,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for RecordingSubscriberBuilder<T> {
    fn default() -> Self {
        Self {
            script: Script::default(),
            _marker: PhantomData,
        }
    }
}

impl<T> RecordingSubscriberBuilder<T> {
    /// Call `request(n)` from inside `on_subscribe`.
    #[must_use]
    pub fn initial_request(mut self, n: i64) -> Self {
        self.script.initial_request = Some(n);
        self
    }

    /// Call `request(n)` from inside every `on_next`.
    #[must_use]
    pub fn request_per_item(mut self, n: i64) -> Self {
        self.script.request_per_item = Some(n);
        self
    }

    /// Call `cancel()` from inside the `n`-th `on_next` (1-based).
    #[must_use]
    pub fn cancel_after(mut self, n: usize) -> Self {
        self.script.cancel_after = Some(n);
        self
    }

    /// Panic inside the `n`-th `on_next` (1-based).
    #[must_use]
    pub fn panic_on(mut self, n: usize) -> Self {
        self.script.panic_on = Some(n);
        self
    }

    /// Panic inside `on_subscribe`, after recording it.
    #[must_use]
    pub fn panic_on_subscribe(mut self) -> Self {
        self.script.panic_on_subscribe = true;
        self
    }

    /// Panic inside `on_complete` and `on_error`, after recording them.
    #[must_use]
    pub fn panic_on_terminal(mut self) -> Self {
        self.script.panic_on_terminal = true;
        self
    }

    /// Sleep inside every `on_next`, widening race windows in concurrency tests.
    #[must_use]
    pub fn on_next_delay(mut self, delay: Duration) -> Self {
        self.script.on_next_delay = Some(delay);
        self
    }

    /// Build the subscriber.
    #[must_use]
    pub fn build(self) -> Arc<RecordingSubscriber<T>> {
        Arc::new(RecordingSubscriber {
            script: self.script,
            signals: Mutex::new(Vec::new()),
            subscription: Mutex::new(None),
            next_count: AtomicUsize::new(0),
            in_next: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
        })
    }
}

impl<T> RecordingSubscriber<T> {
    /// A subscriber that records signals and never requests on its own.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    /// Start scripting a subscriber.
    #[must_use]
    pub fn builder() -> RecordingSubscriberBuilder<T> {
        RecordingSubscriberBuilder::default()
    }

    /// The subscription received in `on_subscribe`, if any.
    pub fn subscription(&self) -> Option<Arc<dyn Subscription>> {
        self.subscription.lock().clone()
    }

    /// Forward `request(n)` to the subscription.
    ///
    /// # Panics
    /// Panics if `on_subscribe` has not been received.
    pub fn request(&self, n: i64) {
        self.subscription()
            .expect("request before on_subscribe")
            .request(n);
    }

    /// Forward `cancel()` to the subscription.
    ///
    /// # Panics
    /// Panics if `on_subscribe` has not been received.
    pub fn cancel(&self) {
        self.subscription()
            .expect("cancel before on_subscribe")
            .cancel();
    }

    /// Number of `on_next` calls received.
    pub fn next_count(&self) -> usize {
        self.next_count.load(Ordering::Acquire)
    }

    /// Number of `on_next` calls that started while another was still running.
    pub fn overlap_count(&self) -> usize {
        self.overlaps.load(Ordering::Acquire)
    }

    /// Returns `true` if `on_complete` was received.
    pub fn is_completed(&self) -> bool {
        self.signals
            .lock()
            .iter()
            .any(|signal| matches!(signal, Signal::Complete))
    }

    /// Number of terminal signals received.
    pub fn terminal_count(&self) -> usize {
        self.signals
            .lock()
            .iter()
            .filter(|signal| signal.is_terminal())
            .count()
    }

    /// Rendered errors received through `on_error`.
    pub fn error_messages(&self) -> Vec<String> {
        self.signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::Error(error) => Some(error.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Check the signal grammar `Subscribe Next* (Complete | Error)?`.
    ///
    /// # Panics
    /// Panics with the offending sequence if the grammar is violated.
    pub fn assert_well_formed(&self)
    where
        T: std::fmt::Debug,
    {
        let signals = self.signals.lock();
        assert!(
            matches!(signals.first(), Some(Signal::Subscribe)),
            "first signal must be on_subscribe: {signals:?}"
        );

        let subscribes = signals
            .iter()
            .filter(|signal| matches!(signal, Signal::Subscribe))
            .count();
        assert_eq!(subscribes, 1, "on_subscribe must arrive once: {signals:?}");

        if let Some(position) = signals.iter().position(Signal::is_terminal) {
            assert_eq!(
                position,
                signals.len() - 1,
                "terminal signal must be last: {signals:?}"
            );
        }
    }

    fn record(&self, signal: Signal<T>) {
        self.signals.lock().push(signal);
    }
}

impl<T: Clone> RecordingSubscriber<T> {
    /// Every signal received, in order.
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().clone()
    }

    /// Every element received through `on_next`, in order.
    pub fn values(&self) -> Vec<T> {
        self.signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T> Subscriber<T> for RecordingSubscriber<T>
where
    T: Send + Sync,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.record(Signal::Subscribe);
        *self.subscription.lock() = Some(Arc::clone(&subscription));

        if self.script.panic_on_subscribe {
            panic!("scripted panic in on_subscribe");
        }
        if let Some(n) = self.script.initial_request {
            subscription.request(n);
        }
    }

    fn on_next(&self, item: T) {
        if self.in_next.swap(true, Ordering::AcqRel) {
            self.overlaps.fetch_add(1, Ordering::AcqRel);
        }

        self.record(Signal::Next(item));
        let count = self.next_count.fetch_add(1, Ordering::AcqRel) + 1;

        if let Some(delay) = self.script.on_next_delay {
            thread::sleep(delay);
        }

        if self.script.panic_on == Some(count) {
            self.in_next.store(false, Ordering::Release);
            panic!("scripted panic in on_next #{count}");
        }
        if self.script.cancel_after == Some(count) {
            self.cancel();
        }
        if let Some(n) = self.script.request_per_item {
            self.request(n);
        }

        // Still set here if a re-entrant request recursed into on_next.
        self.in_next.store(false, Ordering::Release);
    }

    fn on_error(&self, error: FlowError) {
        self.record(Signal::Error(error));
        if self.script.panic_on_terminal {
            panic!("scripted panic in on_error");
        }
    }

    fn on_complete(&self) {
        self.record(Signal::Complete);
        if self.script.panic_on_terminal {
            panic!("scripted panic in on_complete");
        }
    }
}
