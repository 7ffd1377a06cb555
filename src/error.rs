//! Error handling for the container library
//!
//! This module defines the error types that can occur while framing,
//! parsing, or transcoding a SILK v3 container, providing enough
//! information for callers to decide between rejecting the input and
//! reporting a configuration mistake.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, SilkError>;

/// Error type for container and pipeline operations
#[derive(Error, Debug)]
pub enum SilkError {
    /// The magic tag was not found at offset 0 or after one variant byte
    #[error("malformed container header: magic tag not found")]
    MalformedHeader,

    /// A configuration value is outside its supported set or range
    #[error("invalid {field}: {value} ({expected})")]
    InvalidParameter {
        field: &'static str,
        value: i64,
        expected: String,
    },

    /// An encoded payload exceeds what the length field can represent
    #[error("frame too large: {size} bytes (limit {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Attempted to trim more bytes than the stream holds
    #[error("invalid trim length: {requested} bytes requested, {available} available")]
    InvalidLength { requested: usize, available: usize },

    /// A frame record would not fit in the jitter window
    #[error("jitter buffer overflow: {size} bytes into {capacity} byte window")]
    BufferOverflow { size: usize, capacity: usize },

    /// Engine state allocation or reset failed
    #[error("engine initialization failed: {reason}")]
    EngineInitFailed { reason: String },

    /// Engine reported an encode failure
    #[error("engine encode failed: {reason}")]
    EngineEncodeFailed { reason: String },

    /// Engine reported a decode failure
    #[error("engine decode failed: {reason}")]
    EngineDecodeFailed { reason: String },
}

impl SilkError {
    /// Create a new invalid parameter error
    pub fn invalid_parameter(
        field: &'static str,
        value: impl Into<i64>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            field,
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a new engine initialization error
    pub fn engine_init_failed(reason: impl Into<String>) -> Self {
        Self::EngineInitFailed {
            reason: reason.into(),
        }
    }

    /// Create a new engine encode error
    pub fn engine_encode_failed(reason: impl Into<String>) -> Self {
        Self::EngineEncodeFailed {
            reason: reason.into(),
        }
    }

    /// Create a new engine decode error
    pub fn engine_decode_failed(reason: impl Into<String>) -> Self {
        Self::EngineDecodeFailed {
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable by retrying with corrected input
    ///
    /// Header and configuration errors are fixable by the caller before any
    /// engine work begins; mid-stream failures mean the whole call must be
    /// discarded.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MalformedHeader | Self::InvalidParameter { .. } => true,

            Self::FrameTooLarge { .. }
            | Self::InvalidLength { .. }
            | Self::BufferOverflow { .. }
            | Self::EngineInitFailed { .. }
            | Self::EngineEncodeFailed { .. }
            | Self::EngineDecodeFailed { .. } => false,
        }
    }
}
