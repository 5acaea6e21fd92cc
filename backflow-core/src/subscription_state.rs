// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;

/// Observable lifecycle of a subscription.
///
/// `Completed`, `Errored` and `Cancelled` are terminal and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    /// Waiting for demand.
    Active,
    /// The drain token is held: elements are being emitted, or the `on_subscribe`
    /// handshake has not returned yet.
    Draining,
    /// `on_complete` was delivered.
    Completed,
    /// `on_error` was delivered.
    Errored,
    /// The subscriber cancelled before a terminal signal.
    Cancelled,
}

impl SubscriptionState {
    /// Returns `true` for `Completed`, `Errored` and `Cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Errored => "errored",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
