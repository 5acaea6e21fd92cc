// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflow
//!
//! Demand-driven reactive streams for Rust.
//!
//! ## Overview
//!
//! A [`Publisher`] produces elements only when its [`Subscriber`] asks for them through
//! [`Subscription::request`]. Every subscription guarantees that:
//!
//! - no more elements are delivered than were requested,
//! - `on_next` is never called concurrently, even when `request` is called from many
//!   threads or from inside `on_next`,
//! - `on_complete`/`on_error` is delivered at most once and is the last signal,
//! - nothing is delivered after `cancel` returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use backflow::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//!
//! let total = Arc::new(AtomicI64::new(0));
//! let subscriber = FnSubscriber::builder()
//!     .initial_request(2)
//!     .on_next({
//!         let total = Arc::clone(&total);
//!         move |item: i64| {
//!             total.fetch_add(item, Ordering::Relaxed);
//!             Flow::Continue
//!         }
//!     })
//!     .build();
//!
//! let publisher = RangePublisher::new(1, 10)?;
//! publisher.subscribe(subscriber.clone());
//! assert_eq!(total.load(Ordering::Relaxed), 3);
//!
//! subscriber.request(i64::MAX);
//! assert_eq!(total.load(Ordering::Relaxed), 55);
//! # Ok::<(), backflow::FlowError>(())
//! ```
//!
//! ## Crates
//!
//! - `backflow-core` - protocol traits, demand accounting, source publishers
//! - `backflow-exec` - closure subscribers and the `futures::Stream` bridge
//! - `backflow-error` - the `FlowError` type

pub use backflow_core::demand;
pub use backflow_core::{
    ElementSource, FlowError, FnPublisher, FnSource, IntoFlowError, Publisher, RangePublisher,
    RangeSource, Result, SlicePublisher, SliceSource, SourcePublisher, SourceSubscription,
    StreamItem, Subscriber, Subscription, SubscriptionState,
};
pub use backflow_exec::{
    Flow, FnSubscriber, FnSubscriberBuilder, PublisherStream, PublisherStreamExt,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Flow, FlowError, FnPublisher, FnSubscriber, Publisher, PublisherStreamExt,
        RangePublisher, SlicePublisher, StreamItem, Subscriber, Subscription,
    };
}
