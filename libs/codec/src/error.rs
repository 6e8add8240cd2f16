//! Codec errors
//!
//! Both error types are per-frame: callers log them and move on to the next
//! frame or envelope. Neither ever tears a connection down on its own.

use thiserror::Error;

/// Failure turning an outbound envelope into bytes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Encoded envelope would exceed the configured frame limit
    #[error("Encoded {kind} envelope exceeds frame limit of {limit} bytes")]
    FrameTooLarge { kind: &'static str, limit: u64 },

    /// Serializer rejected the payload
    #[error("Failed to serialize {kind} envelope: {reason}")]
    Serialize { kind: &'static str, reason: String },
}

/// Failure turning an inbound frame into an envelope
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty frame")]
    Empty,

    #[error("Frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: u64 },

    /// Bytes do not describe a valid envelope
    #[error("Malformed frame ({size} bytes): {reason}")]
    Malformed { size: usize, reason: String },
}
