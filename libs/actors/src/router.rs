//! Routing policy
//!
//! The declared sender decides the direction of travel:
//! - sender is this actor: the message came up this actor's own connection
//!   and goes out to everyone else through the hub
//! - any other sender: the message is on its way down to this connection and
//!   is queued with its original sender preserved

use crate::client::ClientActor;
use crate::queue::EnqueueOutcome;
use tracing::{debug, trace};
use types::{ClientId, Envelope, Message};

impl ClientActor {
    pub fn route(&self, declared_sender: ClientId, message: Message) {
        match self.id.get() {
            Some(own) if *own == declared_sender => {
                if self.config.echo_own_messages {
                    self.send_as(message.clone(), declared_sender);
                }
                self.broadcast(message);
            }
            _ => {
                self.send_as(message, declared_sender);
            }
        }
    }

    /// Queue a message for this connection tagged with our own identity.
    /// Never broadcast.
    pub fn send_as_self(&self, message: Message) -> EnqueueOutcome {
        self.send_as(message, self.id())
    }

    /// Queue a message for this connection on behalf of `sender_id`
    pub fn send_as(&self, message: Message, sender_id: ClientId) -> EnqueueOutcome {
        self.outbound.push(Envelope::new(sender_id, message))
    }

    /// Hand a message from this client to the hub for every other peer
    pub fn broadcast(&self, message: Message) {
        trace!(kind = message.kind(), "Broadcasting message");
        self.metrics.record_broadcast();
        self.hub.broadcast(Envelope::new(self.id(), message));
    }

    /// Deliver directly to one peer as if this actor sent it.
    ///
    /// Returns false when the peer is not registered, which is expected when
    /// it disconnects concurrently.
    pub fn forward_to_peer(&self, message: Message, peer_id: ClientId) -> bool {
        match self.hub.lookup(peer_id) {
            Some(peer) => {
                self.metrics.record_forwarded();
                peer.route(self.id(), message);
                true
            }
            None => {
                debug!(peer = %peer_id, kind = message.kind(), "Peer not registered, not forwarding");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{InMemoryConnection, RecordingHub};
    use crate::{ActorConfig, ClientActor, OutboundReceiver};
    use codec::BincodeCodec;
    use std::sync::Arc;
    use types::{ClientId, Envelope, Message};

    fn new_actor(
        hub: &Arc<RecordingHub>,
        config: ActorConfig,
    ) -> (Arc<ClientActor>, OutboundReceiver) {
        let (connection, _remote) = InMemoryConnection::pair();
        ClientActor::new(
            hub.clone(),
            Arc::new(BincodeCodec::new()),
            connection,
            config,
        )
    }

    fn identified(
        hub: &Arc<RecordingHub>,
        id: u64,
        config: ActorConfig,
    ) -> (Arc<ClientActor>, OutboundReceiver) {
        let (actor, mut rx) = new_actor(hub, config);
        actor.initialize(ClientId(id));
        assert_eq!(
            rx.try_recv(),
            Some(Envelope::new(ClientId(id), Message::id(ClientId(id))))
        );
        (actor, rx)
    }

    #[test]
    fn test_own_sender_goes_to_hub_only() {
        let hub = RecordingHub::new();
        let (actor, mut rx) = identified(&hub, 7, ActorConfig::default());

        actor.route(ClientId(7), Message::chat("hi"));

        assert_eq!(
            hub.broadcasts(),
            vec![Envelope::new(ClientId(7), Message::chat("hi"))]
        );
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_other_sender_is_queued_with_provenance() {
        let hub = RecordingHub::new();
        let (actor, mut rx) = identified(&hub, 7, ActorConfig::default());

        actor.route(ClientId(9), Message::chat("yo"));

        assert!(hub.broadcasts().is_empty());
        assert_eq!(
            rx.try_recv(),
            Some(Envelope::new(ClientId(9), Message::chat("yo")))
        );
    }

    #[test]
    fn test_echo_policy_delivers_own_message_locally_too() {
        let hub = RecordingHub::new();
        let config = ActorConfig {
            echo_own_messages: true,
            ..Default::default()
        };
        let (actor, mut rx) = identified(&hub, 7, config);

        actor.route(ClientId(7), Message::chat("me"));

        assert_eq!(hub.broadcasts().len(), 1);
        assert_eq!(
            rx.try_recv(),
            Some(Envelope::new(ClientId(7), Message::chat("me")))
        );
    }

    #[test]
    fn test_send_as_self_never_broadcasts() {
        let hub = RecordingHub::new();
        let (actor, mut rx) = identified(&hub, 7, ActorConfig::default());

        assert!(actor.send_as_self(Message::chat("control")).is_queued());
        assert!(hub.broadcasts().is_empty());
        assert_eq!(
            rx.try_recv(),
            Some(Envelope::new(ClientId(7), Message::chat("control")))
        );
    }

    #[test]
    fn test_unidentified_actor_never_broadcasts() {
        let hub = RecordingHub::new();
        let (actor, mut rx) = new_actor(&hub, ActorConfig::default());

        actor.route(ClientId::UNSET, Message::chat("early"));

        assert!(hub.broadcasts().is_empty());
        assert!(rx.try_recv().is_some());
    }

    #[test]
    fn test_forward_to_missing_peer_is_noop() {
        let hub = RecordingHub::new();
        let (actor, _rx) = identified(&hub, 7, ActorConfig::default());

        assert!(!actor.forward_to_peer(Message::chat("psst"), ClientId(42)));
        assert_eq!(actor.metrics().snapshot().forwarded, 0);
    }

    #[test]
    fn test_forward_to_peer_lands_in_peer_queue() {
        let hub = RecordingHub::new();
        let (sender, _sender_rx) = identified(&hub, 7, ActorConfig::default());
        let (peer, mut peer_rx) = identified(&hub, 8, ActorConfig::default());
        hub.insert(peer.clone());

        assert!(sender.forward_to_peer(Message::chat("psst"), ClientId(8)));
        assert_eq!(
            peer_rx.try_recv(),
            Some(Envelope::new(ClientId(7), Message::chat("psst")))
        );
        assert!(hub.broadcasts().is_empty());
        assert_eq!(sender.metrics().snapshot().forwarded, 1);
    }
}
