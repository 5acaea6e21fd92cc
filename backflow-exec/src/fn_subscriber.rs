// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Closure-driven subscriber.
//!
//! ## Example
//!
//! ```
//! use backflow_core::{Publisher, RangePublisher};
//! use backflow_exec::{Flow, FnSubscriber};
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use std::sync::Arc;
//!
//! let sum = Arc::new(AtomicI64::new(0));
//! let subscriber = FnSubscriber::builder()
//!     .on_next({
//!         let sum = Arc::clone(&sum);
//!         move |item: i64| {
//!             sum.fetch_add(item, Ordering::Relaxed);
//!             Flow::Continue
//!         }
//!     })
//!     .build();
//!
//! RangePublisher::new(1, 4).unwrap().subscribe(subscriber);
//!
//! assert_eq!(sum.load(Ordering::Relaxed), 10);
//! ```

use backflow_core::{FlowError, Subscriber, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type NextFn<T> = Box<dyn Fn(T) -> Flow + Send + Sync>;
type ErrorFn = Box<dyn Fn(FlowError) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// What an `on_next` closure wants after handling an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep receiving.
    Continue,
    /// Cancel the subscription; no further elements are delivered.
    Cancel,
}

/// A [`Subscriber`] assembled from closures.
///
/// By default it requests unbounded demand in `on_subscribe`. Use
/// [`FnSubscriberBuilder::initial_request`] to pull in smaller steps and
/// [`FnSubscriber::request`] to ask for more later.
pub struct FnSubscriber<T> {
    initial_request: Option<i64>,
    on_next: NextFn<T>,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    finished: AtomicBool,
}

/// Builder for [`FnSubscriber`].
pub struct FnSubscriberBuilder<T> {
    initial_request: Option<i64>,
    on_next: Option<NextFn<T>>,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
}

impl<T> Default for FnSubscriberBuilder<T> {
    fn default() -> Self {
        Self {
            initial_request: Some(i64::MAX),
            on_next: None,
            on_error: None,
            on_complete: None,
        }
    }
}

impl<T: 'static> FnSubscriberBuilder<T> {
    /// Handle each element. Without it, elements are discarded.
    #[must_use]
    pub fn on_next<F>(mut self, on_next: F) -> Self
    where
        F: Fn(T) -> Flow + Send + Sync + 'static,
    {
        self.on_next = Some(Box::new(on_next));
        self
    }

    /// Handle the terminal error. Without it, the error is logged.
    #[must_use]
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(FlowError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Handle completion.
    #[must_use]
    pub fn on_complete<F>(mut self, on_complete: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Demand signalled from `on_subscribe`. Defaults to `i64::MAX` (unbounded).
    #[must_use]
    pub fn initial_request(mut self, n: i64) -> Self {
        self.initial_request = Some(n);
        self
    }

    /// Signal no demand from `on_subscribe`; the caller drives it through
    /// [`FnSubscriber::request`].
    #[must_use]
    pub fn manual_request(mut self) -> Self {
        self.initial_request = None;
        self
    }

    /// Build the subscriber.
    #[must_use]
    pub fn build(self) -> Arc<FnSubscriber<T>> {
        Arc::new(FnSubscriber {
            initial_request: self.initial_request,
            on_next: self.on_next.unwrap_or_else(|| Box::new(|_: T| Flow::Continue)),
            on_error: self.on_error,
            on_complete: self.on_complete,
            subscription: Mutex::new(None),
            finished: AtomicBool::new(false),
        })
    }
}

impl<T: 'static> FnSubscriber<T> {
    /// Start assembling a subscriber.
    #[must_use]
    pub fn builder() -> FnSubscriberBuilder<T> {
        FnSubscriberBuilder::default()
    }
}

impl<T> FnSubscriber<T> {
    /// Ask for `n` more elements. Ignored before `on_subscribe` and after the flow ended.
    pub fn request(&self, n: i64) {
        if let Some(subscription) = self.current() {
            subscription.request(n);
        }
    }

    /// Cancel the subscription.
    pub fn cancel(&self) {
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    /// Returns `true` once the flow completed, failed, or was cancelled by this subscriber.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn current(&self) -> Option<Arc<dyn Subscription>> {
        self.subscription.lock().clone()
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
        self.subscription.lock().take();
    }
}

impl<T> Subscriber<T> for FnSubscriber<T>
where
    T: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.subscription.lock() = Some(Arc::clone(&subscription));
        if let Some(n) = self.initial_request {
            subscription.request(n);
        }
    }

    fn on_next(&self, item: T) {
        if (self.on_next)(item) == Flow::Cancel {
            debug!("on_next asked to cancel");
            self.finished.store(true, Ordering::Release);
            self.cancel();
        }
    }

    fn on_error(&self, error: FlowError) {
        self.finish();
        match &self.on_error {
            Some(on_error) => on_error(error),
            None => error!("unhandled flow error: {error}"),
        }
    }

    fn on_complete(&self) {
        self.finish();
        if let Some(on_complete) = &self.on_complete {
            on_complete();
        }
    }
}
