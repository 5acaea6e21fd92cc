// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{FlowError, Subscription};
use std::sync::Arc;

/// The consuming side of a flow.
///
/// Signals arrive in the order `on_subscribe (on_next)* (on_complete | on_error)?` and are
/// never concurrent, though consecutive signals may arrive on different threads.
///
/// A panic inside any callback is caught by the publisher. A panicking `on_next` ends the
/// flow with `FlowError::CallbackPanic` delivered to `on_error`.
pub trait Subscriber<T>: Send + Sync {
    /// Receives the subscription handle. Called exactly once, before any other signal.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Receives the next element. Never called more times than requested.
    fn on_next(&self, item: T);

    /// Terminal failure.
    fn on_error(&self, error: FlowError);

    /// Terminal success: every element has been delivered.
    fn on_complete(&self);
}
