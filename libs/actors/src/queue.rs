//! Bounded outbound queue
//!
//! Many producers (the owning actor's router, the hub, other actors) and a
//! single consumer (the write pump). Producers never wait: when the queue is
//! at capacity the new envelope is dropped, logged and counted. Earlier
//! envelopes are never evicted, so a flood keeps the oldest `capacity` items.
//!
//! Closing drops the only sender. The receiver then yields whatever is still
//! buffered and finishes with `None`.

use crate::metrics::ActorMetrics;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use types::Envelope;

/// What happened to an envelope handed to [`OutboundQueue::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Queue at capacity; envelope discarded
    DroppedFull,
    /// Queue already closed; envelope discarded
    DroppedClosed,
}

impl EnqueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, EnqueueOutcome::Queued)
    }
}

/// Producer side, owned by one actor
#[derive(Debug)]
pub struct OutboundQueue {
    sender: Mutex<Option<mpsc::Sender<Envelope>>>,
    capacity: usize,
    metrics: Arc<ActorMetrics>,
}

/// Consumer side, owned by the write pump
#[derive(Debug)]
pub struct OutboundReceiver {
    rx: mpsc::Receiver<Envelope>,
}

/// Create a queue holding at most `capacity` envelopes (minimum 1)
pub fn outbound_queue(
    capacity: usize,
    metrics: Arc<ActorMetrics>,
) -> (OutboundQueue, OutboundReceiver) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (
        OutboundQueue {
            sender: Mutex::new(Some(tx)),
            capacity,
            metrics,
        },
        OutboundReceiver { rx },
    )
}

impl OutboundQueue {
    /// Enqueue without waiting
    pub fn push(&self, envelope: Envelope) -> EnqueueOutcome {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.metrics.record_dropped_closed();
            debug!(
                kind = envelope.payload.kind(),
                "Send queue closed, dropping message"
            );
            return EnqueueOutcome::DroppedClosed;
        };

        match sender.try_send(envelope) {
            Ok(()) => {
                self.metrics.record_enqueued();
                EnqueueOutcome::Queued
            }
            Err(TrySendError::Full(envelope)) => {
                self.metrics.record_dropped_full();
                warn!(
                    kind = envelope.payload.kind(),
                    sender = %envelope.sender_id,
                    capacity = self.capacity,
                    "Send queue full, dropping message"
                );
                EnqueueOutcome::DroppedFull
            }
            Err(TrySendError::Closed(envelope)) => {
                self.metrics.record_dropped_closed();
                debug!(
                    kind = envelope.payload.kind(),
                    "Write pump gone, dropping message"
                );
                EnqueueOutcome::DroppedClosed
            }
        }
    }

    /// Stop accepting envelopes; returns false if already closed
    pub fn close(&self) -> bool {
        self.sender.lock().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .as_ref()
            .map_or(true, |sender| sender.is_closed())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl OutboundReceiver {
    /// Next envelope in FIFO order, or `None` once closed and drained
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Non-waiting variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}
