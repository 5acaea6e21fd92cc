// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Backflow reactive streams library
//!
//! Every failure a subscriber can observe travels through [`FlowError`]. Errors are never
//! thrown back across `request`/`cancel`; they are delivered through `on_error` and end
//! the subscription.
//!
//! # Examples
//!
//! ```
//! use backflow_error::{FlowError, Result};
//!
//! fn validate(n: i64) -> Result<u64> {
//!     if n <= 0 {
//!         return Err(FlowError::invalid_demand(n));
//!     }
//!     Ok(n as u64)
//! }
//!
//! assert!(validate(0).is_err());
//! ```

use std::any::Any;

/// Root error type for all Backflow operations
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A subscriber asked for a non-positive number of elements
    ///
    /// Demand must be strictly positive. The subscription that received the request
    /// terminates with this error.
    #[error("Invalid demand: request({requested}) must be positive")]
    InvalidDemand {
        /// The rejected request amount
        requested: i64,
    },

    /// A range whose last element does not fit in `i64`
    #[error("Invalid range: start {start} with count {count} overflows i64")]
    InvalidRange {
        /// First element of the range
        start: i64,
        /// Number of elements requested
        count: u64,
    },

    /// User-provided callback function panicked
    ///
    /// When a subscriber callback panics during delivery it's caught and converted
    /// to this error variant.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// Information about the panic location and cause
        context: String,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided element generators.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FlowError {
    /// Create an invalid demand error for the rejected request amount
    #[must_use]
    pub const fn invalid_demand(requested: i64) -> Self {
        Self::InvalidDemand { requested }
    }

    /// Create an invalid range error
    #[must_use]
    pub const fn invalid_range(start: i64, count: u64) -> Self {
        Self::InvalidRange { start, count }
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Convert a panic payload caught by `catch_unwind` into a `CallbackPanic`
    ///
    /// `callback` names the subscriber method that panicked.
    #[must_use]
    pub fn from_panic(callback: &str, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        Self::callback_panic(format!("{callback}: {message}"))
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Check if this error was caused by the subscriber breaking the demand protocol
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::InvalidDemand { .. })
    }

    /// Check if this error originated in user code (callbacks or generators)
    #[must_use]
    pub const fn is_user_failure(&self) -> bool {
        matches!(self, Self::CallbackPanic { .. } | Self::UserError(_))
    }
}

/// Specialized Result type for Backflow operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Extension trait for converting errors into `FlowError`
///
/// This trait is automatically implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoFlowError {
    /// Convert this error into a `FlowError`
    fn into_flow_error(self) -> FlowError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFlowError for E {
    fn into_flow_error(self) -> FlowError {
        FlowError::user_error(self)
    }
}

impl Clone for FlowError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidDemand { requested } => Self::InvalidDemand {
                requested: *requested,
            },
            Self::InvalidRange { start, count } => Self::InvalidRange {
                start: *start,
                count: *count,
            },
            Self::CallbackPanic { context } => Self::CallbackPanic {
                context: context.clone(),
            },
            // The boxed source can't be cloned, keep its message
            Self::UserError(e) => Self::UserError(Box::new(DetachedError(e.to_string()))),
        }
    }
}

/// Message-only stand-in for a user error that went through `Clone`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DetachedError(String);
