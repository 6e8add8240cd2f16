//! Connection abstraction consumed by the pumps
//!
//! A connection carries discrete binary frames in both directions. The read
//! side is only touched by the read pump and the write side only by the
//! write pump, so implementations may hold each half behind its own lock.

use crate::error::ConnectionError;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Wait for the next frame; `Ok(None)` means the peer closed cleanly
    async fn read_frame(&self) -> Result<Option<Bytes>, ConnectionError>;

    /// Send one frame
    async fn write_frame(&self, frame: Bytes) -> Result<(), ConnectionError>;

    /// Idempotent. Must make a pending or future `read_frame` return promptly.
    fn close(&self);
}
