//! Write pump: queue -> encode -> connection

use crate::client::ClientActor;
use crate::queue::OutboundReceiver;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs until the queue is closed and drained or a write fails, then tears
/// the actor down.
///
/// An envelope that fails to encode is dropped; the loop keeps going.
pub(crate) async fn write_pump(actor: Arc<ClientActor>, mut outbound: OutboundReceiver) {
    while let Some(envelope) = outbound.recv().await {
        let kind = envelope.payload.kind();

        let frame = match actor.codec.encode(&envelope) {
            Ok(frame) => frame,
            Err(e) => {
                actor.metrics.record_encode_failure();
                warn!(kind, error = %e, "Error encoding envelope, dropping");
                continue;
            }
        };

        if let Err(e) = actor.connection.write_frame(frame).await {
            error!(kind, error = %e, "Error writing frame, closing client");
            break;
        }
        actor.metrics.record_frame_written();
    }

    info!("Closing write pump");
    actor.close("write pump closed");
}
