// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Ready-made subscribers for Backflow publishers.
//!
//! - [`FnSubscriber`] drives a publisher with closures.
//! - [`PublisherStreamExt::into_stream`] turns a publisher into a `futures::Stream` with
//!   bounded prefetch.

#[macro_use]
mod logging;

pub mod fn_subscriber;
pub mod publisher_stream;

pub use fn_subscriber::{Flow, FnSubscriber, FnSubscriberBuilder};
pub use publisher_stream::{PublisherStream, PublisherStreamExt};
