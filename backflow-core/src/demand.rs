// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Saturating demand arithmetic on an atomic counter.
//!
//! Outstanding demand is a `u64`. Once it reaches [`UNBOUNDED`] it stays there: further
//! additions are absorbed and emissions no longer decrement it.

use core::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "deliver everything".
pub const UNBOUNDED: u64 = u64::MAX;

/// Convert a raw `request(n)` argument into demand.
///
/// Returns `None` for `n <= 0`. `i64::MAX` maps to [`UNBOUNDED`].
#[must_use]
pub const fn from_request(n: i64) -> Option<u64> {
    if n <= 0 {
        None
    } else if n == i64::MAX {
        Some(UNBOUNDED)
    } else {
        Some(n as u64)
    }
}

/// Add `n` to `requested`, saturating at [`UNBOUNDED`]. Returns the previous value.
pub fn add(requested: &AtomicU64, n: u64) -> u64 {
    match requested.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        (current != UNBOUNDED).then(|| current.saturating_add(n))
    }) {
        Ok(previous) | Err(previous) => previous,
    }
}

/// Subtract `n` delivered elements from `requested`. Returns the new value.
///
/// Unbounded demand is left untouched. Only the drain owner calls this, and never for
/// more than it observed, so the counter cannot underflow.
pub fn produced(requested: &AtomicU64, n: u64) -> u64 {
    match requested.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        (current != UNBOUNDED).then(|| current.saturating_sub(n))
    }) {
        Ok(previous) => previous.saturating_sub(n),
        Err(unbounded) => unbounded,
    }
}
