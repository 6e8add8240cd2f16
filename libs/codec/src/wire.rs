//! Envelope wire format

use crate::constants::DEFAULT_MAX_FRAME_SIZE;
use crate::error::{DecodeError, EncodeError};
use bincode::Options;
use bytes::Bytes;
use tracing::trace;
use types::Envelope;

/// Converts envelopes to and from frame bytes
///
/// Implementations must be cheap and non-blocking; they run inline on the
/// actor's read and write tasks.
pub trait WireCodec: Send + Sync + 'static {
    fn encode(&self, envelope: &Envelope) -> Result<Bytes, EncodeError>;

    fn decode(&self, frame: &[u8]) -> Result<Envelope, DecodeError>;
}

/// Varint bincode encoding bounded by a maximum frame size
#[derive(Debug, Clone, Copy)]
pub struct BincodeCodec {
    max_frame_size: u64,
}

impl BincodeCodec {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: u64) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> u64 {
        self.max_frame_size
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_limit(self.max_frame_size)
            .reject_trailing_bytes()
    }
}

impl Default for BincodeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl WireCodec for BincodeCodec {
    fn encode(&self, envelope: &Envelope) -> Result<Bytes, EncodeError> {
        let kind = envelope.payload.kind();
        let bytes = self.options().serialize(envelope).map_err(|e| match *e {
            bincode::ErrorKind::SizeLimit => EncodeError::FrameTooLarge {
                kind,
                limit: self.max_frame_size,
            },
            other => EncodeError::Serialize {
                kind,
                reason: other.to_string(),
            },
        })?;

        trace!(kind, size = bytes.len(), "encoded envelope");
        Ok(Bytes::from(bytes))
    }

    fn decode(&self, frame: &[u8]) -> Result<Envelope, DecodeError> {
        if frame.is_empty() {
            return Err(DecodeError::Empty);
        }
        if frame.len() as u64 > self.max_frame_size {
            return Err(DecodeError::FrameTooLarge {
                size: frame.len(),
                limit: self.max_frame_size,
            });
        }

        self.options()
            .deserialize::<Envelope>(frame)
            .map_err(|e| DecodeError::Malformed {
                size: frame.len(),
                reason: e.to_string(),
            })
    }
}
