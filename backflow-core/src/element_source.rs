// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Immutable, indexable element sequences that back a [`SourcePublisher`](crate::SourcePublisher).
//!
//! A source is shared read-only by every subscription of its publisher; each
//! subscription keeps its own cursor.

use crate::{FlowError, IntoFlowError, Result};
use core::marker::PhantomData;
use std::sync::Arc;

/// A finite sequence of `len()` elements addressed by index.
pub trait ElementSource: Send + Sync {
    /// Element type delivered through `on_next`.
    type Item: Send + 'static;

    /// Total number of elements.
    fn len(&self) -> u64;

    /// Produce the element at `index` (`index < len()`).
    ///
    /// # Errors
    /// An error terminates the subscription asking for the element.
    fn element(&self, index: u64) -> Result<Self::Item>;

    /// Returns `true` if the source has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The integers `[start, start + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSource {
    start: i64,
    count: u64,
}

impl RangeSource {
    /// Create a range of `count` integers starting at `start`.
    ///
    /// # Errors
    /// Returns `FlowError::InvalidRange` if the last element does not fit in `i64`.
    pub fn new(start: i64, count: u64) -> Result<Self> {
        if count > 0 {
            i64::try_from(count - 1)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .ok_or(FlowError::invalid_range(start, count))?;
        }
        Ok(Self { start, count })
    }

    /// First element of the range.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// One past the last element, if representable.
    #[must_use]
    pub fn end(&self) -> Option<i64> {
        i64::try_from(self.count)
            .ok()
            .and_then(|count| self.start.checked_add(count))
    }
}

impl ElementSource for RangeSource {
    type Item = i64;

    fn len(&self) -> u64 {
        self.count
    }

    fn element(&self, index: u64) -> Result<i64> {
        i64::try_from(index)
            .ok()
            .filter(|_| index < self.count)
            .and_then(|offset| self.start.checked_add(offset))
            .ok_or(FlowError::invalid_range(self.start, index.saturating_add(1)))
    }
}

/// A shared slice whose elements are cloned out on delivery.
#[derive(Debug)]
pub struct SliceSource<T> {
    items: Arc<[T]>,
}

impl<T> SliceSource<T> {
    /// Wrap `items`.
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// The underlying elements.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Clone for SliceSource<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> ElementSource for SliceSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> u64 {
        self.items.len() as u64
    }

    fn element(&self, index: u64) -> Result<T> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.items.get(index))
            .cloned()
            .ok_or(FlowError::invalid_range(0, index.saturating_add(1)))
    }
}

/// `count` elements computed on demand by a fallible generator.
///
/// The generator receives the element index. An `Err` ends the flow with
/// `FlowError::UserError`.
pub struct FnSource<F, T, E> {
    count: u64,
    generator: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> FnSource<F, T, E>
where
    F: Fn(u64) -> core::result::Result<T, E> + Send + Sync,
{
    /// Create a source of `count` elements.
    pub fn new(count: u64, generator: F) -> Self {
        Self {
            count,
            generator,
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> ElementSource for FnSource<F, T, E>
where
    F: Fn(u64) -> core::result::Result<T, E> + Send + Sync,
    T: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> u64 {
        self.count
    }

    fn element(&self, index: u64) -> Result<T> {
        (self.generator)(index).map_err(IntoFlowError::into_flow_error)
    }
}
