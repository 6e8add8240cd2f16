//! Codec limits

/// Default upper bound for one encoded envelope, in bytes
pub const DEFAULT_MAX_FRAME_SIZE: u64 = 64 * 1024;
