//! Identity assignment, worker startup and teardown
//!
//! State machine: `Unidentified -> Active -> Closing -> Closed`, with a
//! direct `Unidentified -> Closing` edge when teardown starts before the
//! workers are up. Entering `Closing` is a single compare-and-swap, so any
//! number of concurrent close triggers collapse to one teardown.

use crate::client::ClientActor;
use crate::hub::Peer;
use crate::inbound::read_pump;
use crate::outbound::write_pump;
use crate::queue::OutboundReceiver;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, trace, Instrument};
use types::{ClientId, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActorState {
    Unidentified = 0,
    Active = 1,
    Closing = 2,
    Closed = 3,
}

impl ActorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ActorState::Unidentified,
            1 => ActorState::Active,
            2 => ActorState::Closing,
            _ => ActorState::Closed,
        }
    }

    pub fn is_terminating(&self) -> bool {
        matches!(self, ActorState::Closing | ActorState::Closed)
    }
}

impl ClientActor {
    pub fn state(&self) -> ActorState {
        ActorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Record the hub-assigned identity and announce it to the client.
    ///
    /// Precondition: called once, before any routing. A second call is a
    /// caller bug; it is logged and the original identity is kept.
    pub fn initialize(&self, id: ClientId) {
        if self.id.set(id).is_err() {
            error!(
                current = %self.id(),
                rejected = %id,
                "Client identity already assigned"
            );
            return;
        }

        self.send_as_self(Message::id(id));
        info!(client = %id, "Sent ID to client");
    }

    /// Tear the actor down. Safe to call any number of times from any task;
    /// only the first call has effects. Signals the workers without waiting
    /// for them.
    pub fn close(&self, reason: &str) {
        if !self.begin_close() {
            trace!(client = %self.id(), reason, "Close already in progress");
            return;
        }

        info!(client = %self.id(), reason, "Closing client connection");

        if let Some(id) = self.id.get() {
            self.hub.unregister(*id);
        }
        self.connection.close();
        self.outbound.close();

        self.state.store(ActorState::Closed as u8, Ordering::Release);
    }

    /// Register with the hub, then drive both pumps until they have exited.
    ///
    /// Registration assigns the identity (via [`Peer::initialize`]) before
    /// the actor is visible to other peers, so the identity announcement is
    /// always the first envelope written. An actor closed before `run`
    /// starts is withdrawn from the hub again and no pumps are spawned.
    pub async fn run(self: Arc<Self>, outbound: OutboundReceiver) {
        let id = self.hub.register(self.clone() as Arc<dyn Peer>);
        let span = info_span!("client", id = %id);

        // A close that ran before registration had no id to unregister
        if self.state().is_terminating() {
            span.in_scope(|| debug!("Client closed before start, withdrawing registration"));
            self.hub.unregister(id);
            return;
        }

        let _ = self.state.compare_exchange(
            ActorState::Unidentified as u8,
            ActorState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        let read = tokio::spawn(read_pump(self.clone()).instrument(span.clone()));
        let write = tokio::spawn(write_pump(self.clone(), outbound).instrument(span.clone()));

        let (read_result, write_result) = tokio::join!(read, write);
        span.in_scope(|| {
            if let Err(e) = read_result {
                error!(error = %e, "Read pump task failed");
                self.close("read pump failed");
            }
            if let Err(e) = write_result {
                error!(error = %e, "Write pump task failed");
                self.close("write pump failed");
            }
        });
    }

    /// Win the transition into `Closing`
    fn begin_close(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if ActorState::from_u8(current).is_terminating() {
                return false;
            }
            match self.state.compare_exchange_weak(
                current,
                ActorState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}
