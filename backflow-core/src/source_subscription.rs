// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand-driven emission state machine behind every [`SourcePublisher`](crate::SourcePublisher).
//!
//! ## Drain token
//!
//! Emission is serialized with a work-in-progress counter (`wip`) instead of a lock.
//! Whoever moves `wip` away from zero owns the token and runs the drain loop; everybody
//! else (`request`, `cancel`, re-entrant calls from inside `on_next`) records their
//! change in an atomic, bumps `wip`, and returns at once. Before giving the token back
//! the owner subtracts the work it has seen; a non-zero remainder means a signal arrived
//! mid-loop and the owner goes around again, so no demand increment is ever missed.
//!
//! After a terminal signal or cancellation the token is never released, which turns
//! every later `request`/`cancel` into a cheap no-op.
//!
//! ## Subscriber slot
//!
//! The subscriber lives in a mutex that only the token owner touches, and only long
//! enough to clone or drop the `Arc`. It is emptied on the terminal signal or on
//! cancellation, which breaks the `subscriber -> subscription -> subscriber` cycle.

use crate::demand;
use crate::{ElementSource, FlowError, Subscriber, Subscription, SubscriptionState};
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

// Any positive value works: only non-positive requests are ever stored.
const NO_INVALID_DEMAND: i64 = 1;

const OUTCOME_PENDING: u8 = 0;
const OUTCOME_COMPLETED: u8 = 1;
const OUTCOME_ERRORED: u8 = 2;

type SubscriberSlot<T> = Mutex<Option<Arc<dyn Subscriber<T>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drain {
    /// Demand ran out; the token may be released.
    Idle,
    /// Terminal signal delivered or cancelled; the token stays claimed forever.
    Stopped,
}

/// Subscription over an [`ElementSource`], created by `SourcePublisher::subscribe`.
///
/// Handed to the subscriber as `Arc<dyn Subscription>`; the concrete type is returned by
/// [`SourcePublisher::subscribe_with_handle`](crate::SourcePublisher::subscribe_with_handle)
/// for callers that want to inspect progress.
pub struct SourceSubscription<S: ElementSource> {
    source: Arc<S>,
    subscriber: SubscriberSlot<S::Item>,
    requested: AtomicU64,
    emitted: AtomicU64,
    wip: AtomicUsize,
    cancelled: AtomicBool,
    outcome: AtomicU8,
    invalid_demand: AtomicI64,
}

impl<S> SourceSubscription<S>
where
    S: ElementSource + 'static,
{
    /// The token starts claimed: nothing is emitted until the handshake finishes.
    pub(crate) fn new(source: Arc<S>, subscriber: Arc<dyn Subscriber<S::Item>>) -> Self {
        Self {
            source,
            subscriber: Mutex::new(Some(subscriber)),
            requested: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            wip: AtomicUsize::new(1),
            cancelled: AtomicBool::new(false),
            outcome: AtomicU8::new(OUTCOME_PENDING),
            invalid_demand: AtomicI64::new(NO_INVALID_DEMAND),
        }
    }

    /// `on_subscribe` returned: serve whatever it requested, then hand the token back.
    pub(crate) fn complete_handshake(&self) {
        self.drain_loop();
    }

    /// `on_subscribe` panicked: report it and keep the token so nothing else is emitted.
    pub(crate) fn fail_handshake(&self, error: FlowError) {
        error!("subscriber panicked in on_subscribe: {error}");
        if self.cancelled.load(Ordering::Acquire) {
            self.release();
            return;
        }

        let subscriber = self.subscriber.lock().clone();
        if let Some(subscriber) = subscriber {
            self.terminate_with_error(subscriber.as_ref(), error);
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        match self.outcome.load(Ordering::Acquire) {
            OUTCOME_COMPLETED => SubscriptionState::Completed,
            OUTCOME_ERRORED => SubscriptionState::Errored,
            _ if self.cancelled.load(Ordering::Acquire) => SubscriptionState::Cancelled,
            _ if self.wip.load(Ordering::Acquire) != 0 => SubscriptionState::Draining,
            _ => SubscriptionState::Active,
        }
    }

    /// Elements delivered so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Acquire)
    }

    /// Outstanding demand; [`demand::UNBOUNDED`] once unbounded.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    /// Returns `true` once `cancel` has been called before any terminal signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `true` once `on_complete` or `on_error` has been delivered.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.outcome.load(Ordering::Acquire) != OUTCOME_PENDING
    }

    /// The source this subscription reads from.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }
        self.drain_loop();
    }

    /// Runs with the token held.
    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            if self.emit() == Drain::Stopped {
                return;
            }

            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                return;
            }
        }
    }

    fn emit(&self) -> Drain {
        let Some(subscriber) = self.subscriber.lock().clone() else {
            return Drain::Stopped;
        };
        let len = self.source.len();

        loop {
            if self.cancelled.load(Ordering::Acquire) {
                self.release();
                return Drain::Stopped;
            }

            let invalid = self.invalid_demand.load(Ordering::Acquire);
            if invalid != NO_INVALID_DEMAND {
                warn!("subscription received request({invalid}); terminating");
                self.terminate_with_error(subscriber.as_ref(), FlowError::invalid_demand(invalid));
                return Drain::Stopped;
            }

            let index = self.emitted.load(Ordering::Relaxed);
            if index == len {
                self.terminate_with_complete(subscriber.as_ref());
                return Drain::Stopped;
            }

            if self.requested.load(Ordering::Acquire) == 0 {
                return Drain::Idle;
            }

            let item = match panic::catch_unwind(AssertUnwindSafe(|| self.source.element(index)))
            {
                Ok(Ok(item)) => item,
                Ok(Err(error)) => {
                    warn!("element {index} could not be produced: {error}");
                    return self.fail(subscriber.as_ref(), error);
                }
                Err(payload) => {
                    let error = FlowError::from_panic("element", payload.as_ref());
                    error!("source panicked producing element {index}: {error}");
                    return self.fail(subscriber.as_ref(), error);
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_next(item)))
            {
                let error = FlowError::from_panic("on_next", payload.as_ref());
                error!("subscriber panicked in on_next at element {index}: {error}");
                return self.fail(subscriber.as_ref(), error);
            }

            self.emitted.store(index + 1, Ordering::Release);
            demand::produced(&self.requested, 1);
        }
    }

    /// Ends the flow after a failure; a cancelled subscriber gets no `on_error`.
    fn fail(&self, subscriber: &dyn Subscriber<S::Item>, error: FlowError) -> Drain {
        if self.cancelled.load(Ordering::Acquire) {
            self.release();
        } else {
            self.terminate_with_error(subscriber, error);
        }
        Drain::Stopped
    }

    fn release(&self) {
        debug!(
            "subscription cancelled after {} elements",
            self.emitted.load(Ordering::Relaxed)
        );
        self.subscriber.lock().take();
    }

    fn terminate_with_complete(&self, subscriber: &dyn Subscriber<S::Item>) {
        self.outcome.store(OUTCOME_COMPLETED, Ordering::Release);
        self.subscriber.lock().take();
        debug!(
            "subscription completed after {} elements",
            self.emitted.load(Ordering::Relaxed)
        );

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_complete())) {
            let error = FlowError::from_panic("on_complete", payload.as_ref());
            error!("subscriber panicked in on_complete: {error}");
        }
    }

    fn terminate_with_error(&self, subscriber: &dyn Subscriber<S::Item>, error: FlowError) {
        self.outcome.store(OUTCOME_ERRORED, Ordering::Release);
        self.subscriber.lock().take();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_error(error))) {
            let error = FlowError::from_panic("on_error", payload.as_ref());
            error!("subscriber panicked in on_error, error dropped: {error}");
        }
    }
}

impl<S> Subscription for SourceSubscription<S>
where
    S: ElementSource + 'static,
{
    fn request(&self, n: i64) {
        if self.is_cancelled() || self.is_terminated() {
            return;
        }

        match demand::from_request(n) {
            Some(n) => {
                demand::add(&self.requested, n);
            }
            None => {
                // First violation wins.
                let _ = self.invalid_demand.compare_exchange(
                    NO_INVALID_DEMAND,
                    n,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
            }
        }

        self.drain();
    }

    fn cancel(&self) {
        if self.is_terminated() || self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        // Whoever holds the token drops the subscriber.
        self.drain();
    }
}

impl<S> fmt::Debug for SourceSubscription<S>
where
    S: ElementSource + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSubscription")
            .field("state", &self.state())
            .field("len", &self.source.len())
            .field("emitted", &self.emitted())
            .field("requested", &self.requested())
            .finish()
    }
}
