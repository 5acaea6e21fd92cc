// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Per-subscriber handle mediating demand and cancellation.
///
/// Both methods may be called from any thread, concurrently, and from inside the
/// subscriber's own callbacks. Neither blocks, and neither reports failure to the caller:
/// protocol violations surface through `Subscriber::on_error`.
pub trait Subscription: Send + Sync {
    /// Authorize the publisher to deliver up to `n` more elements.
    ///
    /// `n <= 0` terminates the subscription with `FlowError::InvalidDemand`. The error is
    /// checked before every element, so elements still owed from earlier requests are
    /// dropped once it has been recorded.
    /// `i64::MAX` requests an unbounded stream. Calls after cancellation or a terminal
    /// signal are ignored.
    fn request(&self, n: i64);

    /// Stop the flow. Idempotent.
    ///
    /// No `on_next`, `on_complete` or `on_error` starts after `cancel` returns; an
    /// element already being delivered on another thread may still finish.
    fn cancel(&self);
}
