//! In-process relay hub
//!
//! Identity allocation, peer lookup and broadcast fan-out for every actor in
//! the process. The registry is a sharded concurrent map; broadcasts work on
//! a snapshot so no shard lock is held while peers run their routing code.

use crate::hub::{Hub, Peer};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};
use types::{ClientId, Envelope};

pub struct RelayHub {
    clients: DashMap<ClientId, Arc<dyn Peer>>,
    /// Starts at 1, 0 is the unset sentinel
    next_id: AtomicU64,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients.iter().map(|entry| *entry.key()).collect()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Ask every registered peer to shut down
    pub fn close_all(&self, reason: &str) {
        let peers = self.snapshot(ClientId::UNSET);
        info!(clients = peers.len(), reason, "Closing all clients");
        for peer in peers {
            peer.close(reason);
        }
    }

    fn snapshot(&self, except: ClientId) -> Vec<Arc<dyn Peer>> {
        self.clients
            .iter()
            .filter(|entry| *entry.key() != except)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RelayHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayHub")
            .field("clients", &self.clients.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl Hub for RelayHub {
    fn register(&self, peer: Arc<dyn Peer>) -> ClientId {
        let id = ClientId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        peer.initialize(id);
        self.clients.insert(id, peer);

        info!(client = %id, total = self.clients.len(), "Registered client");
        id
    }

    fn unregister(&self, id: ClientId) {
        if self.clients.remove(&id).is_some() {
            info!(client = %id, total = self.clients.len(), "Unregistered client");
        } else {
            debug!(client = %id, "Attempted to unregister unknown client");
        }
    }

    fn lookup(&self, id: ClientId) -> Option<Arc<dyn Peer>> {
        self.clients.get(&id).map(|entry| entry.value().clone())
    }

    fn broadcast(&self, envelope: Envelope) {
        let (sender_id, message) = envelope.into_parts();
        let peers = self.snapshot(sender_id);
        trace!(
            sender = %sender_id,
            kind = message.kind(),
            recipients = peers.len(),
            "Broadcasting"
        );

        for peer in peers {
            peer.route(sender_id, message.clone());
        }
    }
}
