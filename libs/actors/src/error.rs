//! Connection-level errors
//!
//! Codec failures live in the `codec` crate and are handled per frame.
//! Everything here is fatal to the actor that sees it.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Peer went away or the connection was closed locally
    #[error("Connection closed")]
    Closed,

    /// Peer sent a close frame with a code that signals a problem
    #[error("Connection closed unexpectedly (code {code}: {reason})")]
    UnexpectedClose { code: u16, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    pub fn transport(message: impl Into<String>) -> Self {
        ConnectionError::Transport(message.into())
    }

    /// Ordinary disconnects that should not be reported as errors
    pub fn is_expected(&self) -> bool {
        match self {
            ConnectionError::Closed => true,
            ConnectionError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_disconnects() {
        assert!(ConnectionError::Closed.is_expected());
        assert!(ConnectionError::from(io::Error::from(io::ErrorKind::ConnectionReset)).is_expected());
        assert!(!ConnectionError::from(io::Error::from(io::ErrorKind::PermissionDenied)).is_expected());
        assert!(!ConnectionError::UnexpectedClose {
            code: 1002,
            reason: "protocol error".to_string()
        }
        .is_expected());
    }
}
