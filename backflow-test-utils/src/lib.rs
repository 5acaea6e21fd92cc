// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Backflow reactive streams library.
//!
//! This crate provides helper types for exercising publishers and subscriptions in
//! tests. It is designed for use in development and testing only, not for production
//! code.
//!
//! # Key Types
//!
//! ## `RecordingSubscriber<T>`
//!
//! A subscriber that records every [`Signal`] it receives and can be scripted to
//! request demand, cancel, or panic at chosen points:
//!
//! ```rust
//! use backflow_core::{Publisher, RangePublisher};
//! use backflow_test_utils::RecordingSubscriber;
//!
//! let subscriber = RecordingSubscriber::<i64>::builder()
//!     .initial_request(1)
//!     .request_per_item(1)
//!     .build();
//!
//! RangePublisher::new(10, 3).unwrap().subscribe(subscriber.clone());
//!
//! assert_eq!(subscriber.values(), vec![10, 11, 12]);
//! assert!(subscriber.is_completed());
//! subscriber.assert_well_formed();
//! ```
//!
//! ## Concurrency helpers
//!
//! [`run_concurrently`] releases a number of threads at once through a barrier, which
//! is how the demand-race tests provoke contention on a single subscription.
//!
//! # Module Organization
//!
//! - `signal` - `Signal<T>`, one recorded callback
//! - `recording_subscriber` - `RecordingSubscriber<T>` and its builder
//! - `helpers` - Thread orchestration and expectation helpers

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod recording_subscriber;
pub mod signal;

pub use helpers::{expected_range, run_concurrently};
pub use recording_subscriber::{RecordingSubscriber, RecordingSubscriberBuilder};
pub use signal::Signal;
