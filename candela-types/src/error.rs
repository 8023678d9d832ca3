use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candela workspace.
///
/// Upstream failures are split by cause so the orchestrator can decide what is
/// retryable; argument and data errors cover invalid input and broken series
/// invariants.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandelaError {
    /// The upstream answered with a non-success HTTP status.
    #[error("upstream returned status {status}: {msg}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Provider error message or status reason.
        msg: String,
    },

    /// The upstream payload could not be decoded into candles.
    #[error("invalid upstream payload: {0}")]
    UpstreamParse(String),

    /// The socket went idle or the whole request exceeded its deadline.
    #[error("upstream timed out: {what}")]
    UpstreamTimeout {
        /// Which request (or phase) timed out.
        what: String,
    },

    /// Connection-level failure that persisted through every retry attempt.
    #[error("transport failure after {attempts} attempt(s): {msg}")]
    Transport {
        /// Last transport error message.
        msg: String,
        /// Number of attempts made, including the first.
        attempts: u32,
    },

    /// A planned or requested range has no extent.
    #[error("empty range: from={from} to={to}")]
    EmptyRange {
        /// Inclusive start (seconds since epoch).
        from: i64,
        /// Exclusive end (seconds since epoch).
        to: i64,
    },

    /// The resolution token is not one of the supported bar periods.
    #[error("unsupported resolution: {0}")]
    UnsupportedResolution(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A symbol or resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "symbol EUR_XXX".
        what: String,
    },

    /// A candle series violated its ordering or alignment invariants.
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl CandelaError {
    /// Helper: build an `UpstreamStatus` error.
    pub fn upstream_status(status: u16, msg: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            msg: msg.into(),
        }
    }

    /// Helper: build an `UpstreamTimeout` error.
    pub fn upstream_timeout(what: impl Into<String>) -> Self {
        Self::UpstreamTimeout { what: what.into() }
    }

    /// Helper: build a `Transport` error.
    pub fn transport(msg: impl Into<String>, attempts: u32) -> Self {
        Self::Transport {
            msg: msg.into(),
            attempts,
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true for failures caused by the network rather than the request.
    ///
    /// Status, parse, and argument errors are deterministic and retrying them
    /// yields the same outcome.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::UpstreamTimeout { .. })
    }
}
