//! Error types shared across Inkstream crates.

use std::path::PathBuf;

/// Top-level error type for Inkstream operations.
#[derive(Debug, thiserror::Error)]
pub enum InkstreamError {
    #[error("Broker error: {message}")]
    Broker { message: String },

    #[error("Sample source error: {message}")]
    Source { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A sample arrived with a sequence number or timestamp behind the
    /// buffered history. The sample is rejected; the buffer is unchanged.
    #[error("Out-of-order sample: {message}")]
    OutOfOrderSample { message: String },

    /// A subscriber's queue overflowed past the drop threshold and the
    /// subscriber was detached. Reported once, at the transition.
    #[error("Subscriber overflow: {message}")]
    SubscriberOverflow { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using InkstreamError.
pub type InkstreamResult<T> = Result<T, InkstreamError>;

impl InkstreamError {
    pub fn broker(msg: impl Into<String>) -> Self {
        Self::Broker {
            message: msg.into(),
        }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn out_of_order(msg: impl Into<String>) -> Self {
        Self::OutOfOrderSample {
            message: msg.into(),
        }
    }

    pub fn subscriber_overflow(msg: impl Into<String>) -> Self {
        Self::SubscriberOverflow {
            message: msg.into(),
        }
    }
}
