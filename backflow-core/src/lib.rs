// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core protocol types for Backflow: publishers, subscribers and demand-driven subscriptions.
//!
//! A [`Publisher`] hands each [`Subscriber`] its own [`Subscription`]. The subscriber pulls
//! elements by calling [`Subscription::request`]; the publisher never delivers more than
//! was requested, never delivers two elements concurrently, and stops as soon as the
//! subscriber cancels.

#[macro_use]
mod logging;

pub mod demand;
pub mod element_source;
pub mod publisher;
pub mod source_publisher;
pub mod source_subscription;
pub mod stream_item;
pub mod subscriber;
pub mod subscription;
pub mod subscription_state;

pub use backflow_error::{FlowError, IntoFlowError, Result};

pub use self::element_source::{ElementSource, FnSource, RangeSource, SliceSource};
pub use self::publisher::Publisher;
pub use self::source_publisher::{FnPublisher, RangePublisher, SlicePublisher, SourcePublisher};
pub use self::source_subscription::SourceSubscription;
pub use self::stream_item::StreamItem;
pub use self::subscriber::Subscriber;
pub use self::subscription::Subscription;
pub use self::subscription_state::SubscriptionState;
