//! Hub-facing contracts
//!
//! The hub is the registry every actor shares. It hands out identities,
//! fans broadcasts out to all registered peers and lets one actor reach
//! another by id. Implementations synchronize internally; callers never
//! lock anything around these calls.

use std::sync::Arc;
use types::{ClientId, Envelope, Message};

/// What the hub can do with a registered actor
pub trait Peer: Send + Sync + 'static {
    /// Identity assigned at registration, [`ClientId::UNSET`] before that
    fn id(&self) -> ClientId;

    /// Precondition: called exactly once, before the peer is reachable
    fn initialize(&self, id: ClientId);

    /// Deliver a message declared as sent by `sender_id`; never blocks
    fn route(&self, sender_id: ClientId, message: Message);

    /// Begin teardown; idempotent
    fn close(&self, reason: &str);
}

pub trait Hub: Send + Sync + 'static {
    /// Assign the next identity, call [`Peer::initialize`] with it, then make
    /// the peer visible to `lookup` and `broadcast`
    fn register(&self, peer: Arc<dyn Peer>) -> ClientId;

    /// Remove a peer; unknown ids are ignored
    fn unregister(&self, id: ClientId);

    fn lookup(&self, id: ClientId) -> Option<Arc<dyn Peer>>;

    /// Fire-and-forget delivery to every registered peer except the sender
    fn broadcast(&self, envelope: Envelope);
}
