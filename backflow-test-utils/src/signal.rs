// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflow_core::FlowError;

/// One observed subscriber callback.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// `on_subscribe`
    Subscribe,
    /// `on_next(item)`
    Next(T),
    /// `on_error(error)`
    Error(FlowError),
    /// `on_complete`
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` for `Error` and `Complete`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Complete)
    }
}

impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Subscribe, Self::Subscribe) | (Self::Complete, Self::Complete) => true,
            (Self::Next(a), Self::Next(b)) => a == b,
            // FlowError has no PartialEq; its rendering is specific enough for tests
            (Self::Error(a), Self::Error(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
