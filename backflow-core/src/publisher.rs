// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Subscriber;
use std::sync::Arc;

/// The producing side of a flow.
///
/// Every call to [`subscribe`](Publisher::subscribe) starts an independent flow with its
/// own subscription state. The subscriber receives `on_subscribe` before `subscribe`
/// returns; elements are only delivered in response to `Subscription::request`.
pub trait Publisher<T> {
    /// Attach `subscriber` to a fresh subscription.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>);
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        (**self).subscribe(subscriber);
    }
}
