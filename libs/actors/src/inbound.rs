//! Read pump: connection -> decode -> route

use crate::client::ClientActor;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs until the connection ends, then tears the actor down.
///
/// A frame that fails to decode is skipped; only connection-level failures
/// stop the loop.
pub(crate) async fn read_pump(actor: Arc<ClientActor>) {
    loop {
        let frame = match actor.connection.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("Connection closed");
                break;
            }
            Err(e) if e.is_expected() => {
                debug!(error = %e, "Connection went away");
                break;
            }
            Err(e) => {
                error!(error = %e, "Error reading frame");
                break;
            }
        };
        actor.metrics.record_frame_read();

        let envelope = match actor.codec.decode(&frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                actor.metrics.record_decode_failure();
                warn!(error = %e, "Error decoding frame, skipping");
                continue;
            }
        };

        // Clients may omit the sender; it defaults to this connection's identity
        let (sender_id, message) = envelope.with_default_sender(actor.id()).into_parts();
        actor.route(sender_id, message);
    }

    info!("Closing read pump");
    actor.close("read pump closed");
}
