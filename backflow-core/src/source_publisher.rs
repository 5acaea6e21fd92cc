// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold publishers over an [`ElementSource`].
//!
//! ## Example
//!
//! ```
//! use backflow_core::{FlowError, Publisher, RangePublisher, Subscriber, Subscription};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Collect {
//!     items: Mutex<Vec<i64>>,
//! }
//!
//! impl Subscriber<i64> for Collect {
//!     fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
//!         subscription.request(i64::MAX);
//!     }
//!     fn on_next(&self, item: i64) {
//!         self.items.lock().push(item);
//!     }
//!     fn on_error(&self, _error: FlowError) {}
//!     fn on_complete(&self) {}
//! }
//!
//! let publisher = RangePublisher::new(1, 3).unwrap();
//! let subscriber = Arc::new(Collect::default());
//! publisher.subscribe(subscriber.clone());
//!
//! assert_eq!(*subscriber.items.lock(), vec![1, 2, 3]);
//! ```

use crate::{
    ElementSource, FlowError, FnSource, Publisher, RangeSource, Result, SliceSource,
    SourceSubscription, Subscriber, Subscription,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Stateless publisher: each subscription gets its own cursor over the shared source.
pub struct SourcePublisher<S> {
    source: Arc<S>,
}

/// Publishes the integers `[start, start + count)`.
pub type RangePublisher = SourcePublisher<RangeSource>;

/// Publishes clones of a fixed list of elements.
pub type SlicePublisher<T> = SourcePublisher<SliceSource<T>>;

/// Publishes elements computed by a fallible generator.
pub type FnPublisher<F, T, E> = SourcePublisher<FnSource<F, T, E>>;

impl<S> SourcePublisher<S>
where
    S: ElementSource + 'static,
{
    /// Publish the elements of `source`.
    pub fn from_source(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// The shared source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Like [`Publisher::subscribe`], returning the concrete subscription for inspection.
    ///
    /// `on_subscribe` has returned by the time this returns. Any demand signalled inside
    /// `on_subscribe` has been served.
    pub fn subscribe_with_handle(
        &self,
        subscriber: Arc<dyn Subscriber<S::Item>>,
    ) -> Arc<SourceSubscription<S>> {
        let subscription = Arc::new(SourceSubscription::new(
            Arc::clone(&self.source),
            Arc::clone(&subscriber),
        ));
        let handle: Arc<dyn Subscription> = subscription.clone();

        match panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_subscribe(handle))) {
            Ok(()) => subscription.complete_handshake(),
            Err(payload) => {
                subscription.fail_handshake(FlowError::from_panic("on_subscribe", payload.as_ref()));
            }
        }

        subscription
    }
}

impl<S> Publisher<S::Item> for SourcePublisher<S>
where
    S: ElementSource + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<S::Item>>) {
        self.subscribe_with_handle(subscriber);
    }
}

impl<S> Clone for SourcePublisher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for SourcePublisher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcePublisher")
            .field("source", &self.source)
            .finish()
    }
}

impl RangePublisher {
    /// Publish `count` consecutive integers starting at `start`.
    ///
    /// # Errors
    /// Returns `FlowError::InvalidRange` if `start + count - 1` overflows `i64`.
    pub fn new(start: i64, count: u64) -> Result<Self> {
        RangeSource::new(start, count).map(Self::from_source)
    }
}

impl<T> SlicePublisher<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Publish clones of `items`, in order.
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self::from_source(SliceSource::new(items))
    }
}

impl<F, T, E> FnPublisher<F, T, E>
where
    F: Fn(u64) -> core::result::Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Publish `count` elements, element `i` being `generator(i)`.
    pub fn new(count: u64, generator: F) -> Self {
        Self::from_source(FnSource::new(count, generator))
    }
}
