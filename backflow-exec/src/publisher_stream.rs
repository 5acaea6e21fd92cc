// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consume a publisher as a `futures::Stream`.
//!
//! The bridge requests `prefetch` elements up front and tops demand up in batches: once
//! `limit = prefetch - prefetch / 4` elements have been taken from the stream it requests
//! `limit` more, so at most `prefetch` elements are ever buffered. Elements are handed
//! over through an unbounded `futures` channel; the subscriber never blocks.
//!
//! ## Example
//!
//! ```
//! use backflow_core::{RangePublisher, StreamItem};
//! use backflow_exec::PublisherStreamExt;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stream = RangePublisher::new(1, 5).unwrap().into_stream(2);
//! let items: Vec<_> = stream.collect().await;
//!
//! assert_eq!(
//!     items,
//!     vec![
//!         StreamItem::Value(1),
//!         StreamItem::Value(2),
//!         StreamItem::Value(3),
//!         StreamItem::Value(4),
//!         StreamItem::Value(5),
//!     ]
//! );
//! # }
//! ```

use backflow_core::{FlowError, Publisher, StreamItem, Subscriber, Subscription};
use futures::stream::{FusedStream, Stream, StreamExt};
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

type SubscriptionSlot = Arc<Mutex<Option<Arc<dyn Subscription>>>>;

/// Extension trait turning any [`Publisher`] into a [`PublisherStream`].
pub trait PublisherStreamExt<T>: Publisher<T> + Sized {
    /// Subscribe and expose the flow as a stream of [`StreamItem`]s.
    ///
    /// A `prefetch` of zero is treated as one. An `on_error` becomes a final
    /// `StreamItem::Error`; `on_complete` ends the stream. Dropping the stream cancels
    /// the subscription.
    fn into_stream(self, prefetch: usize) -> PublisherStream<T>;
}

impl<P, T> PublisherStreamExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn into_stream(self, prefetch: usize) -> PublisherStream<T> {
        let prefetch = demand_of(prefetch.max(1));
        let limit = prefetch - prefetch / 4;
        let (sender, receiver) = mpsc::unbounded();
        let slot: SubscriptionSlot = Arc::new(Mutex::new(None));

        self.subscribe(Arc::new(ChannelSubscriber {
            sender,
            slot: Arc::clone(&slot),
            prefetch,
        }));

        PublisherStream {
            receiver,
            slot,
            limit,
            consumed: 0,
            terminated: false,
        }
    }
}

fn demand_of(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Feeds the channel from the publisher side.
struct ChannelSubscriber<T> {
    sender: UnboundedSender<StreamItem<T>>,
    slot: SubscriptionSlot,
    prefetch: i64,
}

impl<T> Subscriber<T> for ChannelSubscriber<T>
where
    T: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.slot.lock() = Some(Arc::clone(&subscription));
        subscription.request(self.prefetch);
    }

    fn on_next(&self, item: T) {
        if self.sender.unbounded_send(StreamItem::Value(item)).is_err() {
            debug!("stream receiver dropped, cancelling subscription");
            let subscription = self.slot.lock().take();
            if let Some(subscription) = subscription {
                subscription.cancel();
            }
        }
    }

    fn on_error(&self, error: FlowError) {
        let _ = self.sender.unbounded_send(StreamItem::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&self) {
        self.sender.close_channel();
    }
}

/// Stream side of [`PublisherStreamExt::into_stream`].
pub struct PublisherStream<T> {
    receiver: UnboundedReceiver<StreamItem<T>>,
    slot: SubscriptionSlot,
    limit: i64,
    consumed: i64,
    terminated: bool,
}

impl<T> PublisherStream<T> {
    /// Cancel the subscription early. Elements already buffered are still yielded.
    pub fn cancel(&self) {
        let subscription = self.slot.lock().take();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    fn replenish(&mut self) {
        self.consumed += 1;
        if self.consumed < self.limit {
            return;
        }
        self.consumed = 0;

        // The request may deliver synchronously into the channel.
        let subscription = self.slot.lock().clone();
        if let Some(subscription) = subscription {
            subscription.request(self.limit);
        }
    }
}

impl<T> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        match this.receiver.poll_next_unpin(cx) {
            Poll::Ready(Some(StreamItem::Value(value))) => {
                this.replenish();
                Poll::Ready(Some(StreamItem::Value(value)))
            }
            Poll::Ready(Some(StreamItem::Error(error))) => {
                this.terminated = true;
                this.slot.lock().take();
                Poll::Ready(Some(StreamItem::Error(error)))
            }
            Poll::Ready(None) => {
                this.terminated = true;
                this.slot.lock().take();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> FusedStream for PublisherStream<T> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        if !self.terminated {
            debug!("publisher stream dropped before termination, cancelling");
        }
        self.cancel();
    }
}
