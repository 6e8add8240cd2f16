//! # Relay Wire Codec
//!
//! Encoding/decoding rules for [`Envelope`](types::Envelope) values travelling
//! over a connection as discrete binary frames.
//!
//! ## What This Crate Contains
//! - [`WireCodec`]: the seam client actors encode and decode through
//! - [`BincodeCodec`]: compact varint bincode encoding with a frame size limit
//! - [`EncodeError`] / [`DecodeError`]: per-frame, recoverable failures
//!
//! ## What This Crate Does NOT Contain
//! - Transport framing (a frame is whatever the connection delivers)
//! - Routing decisions

pub mod constants;
pub mod error;
pub mod wire;

pub use constants::DEFAULT_MAX_FRAME_SIZE;
pub use error::{DecodeError, EncodeError};
pub use wire::{BincodeCodec, WireCodec};
