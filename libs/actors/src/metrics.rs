//! Per-actor counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters updated from both pumps and from hub callers
#[derive(Debug, Default)]
pub struct ActorMetrics {
    pub frames_read: AtomicU64,
    pub frames_written: AtomicU64,
    pub decode_failures: AtomicU64,
    pub encode_failures: AtomicU64,
    pub enqueued: AtomicU64,
    /// Envelopes discarded because the outbound queue was at capacity
    pub dropped_full: AtomicU64,
    /// Envelopes discarded because the actor was already shutting down
    pub dropped_closed: AtomicU64,
    pub broadcasts: AtomicU64,
    pub forwarded: AtomicU64,
}

/// Point-in-time copy of [`ActorMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_read: u64,
    pub frames_written: u64,
    pub decode_failures: u64,
    pub encode_failures: u64,
    pub enqueued: u64,
    pub dropped_full: u64,
    pub dropped_closed: u64,
    pub broadcasts: u64,
    pub forwarded: u64,
}

impl ActorMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_read(&self) {
        Self::bump(&self.frames_read);
    }

    pub fn record_frame_written(&self) {
        Self::bump(&self.frames_written);
    }

    pub fn record_decode_failure(&self) {
        Self::bump(&self.decode_failures);
    }

    pub fn record_encode_failure(&self) {
        Self::bump(&self.encode_failures);
    }

    pub fn record_enqueued(&self) {
        Self::bump(&self.enqueued);
    }

    pub fn record_dropped_full(&self) {
        Self::bump(&self.dropped_full);
    }

    pub fn record_dropped_closed(&self) {
        Self::bump(&self.dropped_closed);
    }

    pub fn record_broadcast(&self) {
        Self::bump(&self.broadcasts);
    }

    pub fn record_forwarded(&self) {
        Self::bump(&self.forwarded);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_read: self.frames_read.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSnapshot {
    pub fn total_dropped(&self) -> u64 {
        self.dropped_full + self.dropped_closed
    }
}
