//! Client actor state
//!
//! Behaviour lives next to the concern it implements: routing in `router`,
//! identity and teardown in `lifecycle`, and the read and write loops in
//! `inbound` and `outbound`.

use crate::config::ActorConfig;
use crate::hub::{Hub, Peer};
use crate::lifecycle::ActorState;
use crate::metrics::ActorMetrics;
use crate::queue::{outbound_queue, OutboundQueue, OutboundReceiver};
use crate::transport::Connection;
use codec::WireCodec;
use std::fmt;
use std::sync::atomic::AtomicU8;
use std::sync::{Arc, OnceLock};
use types::{ClientId, Message};

/// Bridges one connection to the hub
pub struct ClientActor {
    pub(crate) id: OnceLock<ClientId>,
    pub(crate) state: AtomicU8,
    pub(crate) hub: Arc<dyn Hub>,
    pub(crate) codec: Arc<dyn WireCodec>,
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) outbound: OutboundQueue,
    pub(crate) config: ActorConfig,
    pub(crate) metrics: Arc<ActorMetrics>,
}

impl ClientActor {
    /// Build an unidentified actor and the receiving end of its outbound
    /// queue. Pass the receiver to [`ClientActor::run`].
    pub fn new(
        hub: Arc<dyn Hub>,
        codec: Arc<dyn WireCodec>,
        connection: Arc<dyn Connection>,
        config: ActorConfig,
    ) -> (Arc<Self>, OutboundReceiver) {
        let metrics = ActorMetrics::new();
        let (outbound, receiver) = outbound_queue(config.effective_capacity(), metrics.clone());

        let actor = Arc::new(Self {
            id: OnceLock::new(),
            state: AtomicU8::new(ActorState::Unidentified as u8),
            hub,
            codec,
            connection,
            outbound,
            config,
            metrics,
        });

        (actor, receiver)
    }

    /// Assigned identity, or [`ClientId::UNSET`] before registration
    pub fn id(&self) -> ClientId {
        self.id.get().copied().unwrap_or(ClientId::UNSET)
    }

    pub fn metrics(&self) -> &Arc<ActorMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    pub fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }
}

impl fmt::Debug for ClientActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientActor")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("outbound_capacity", &self.outbound.capacity())
            .finish()
    }
}

impl Peer for ClientActor {
    fn id(&self) -> ClientId {
        ClientActor::id(self)
    }

    fn initialize(&self, id: ClientId) {
        ClientActor::initialize(self, id)
    }

    fn route(&self, sender_id: ClientId, message: Message) {
        ClientActor::route(self, sender_id, message)
    }

    fn close(&self, reason: &str) {
        ClientActor::close(self, reason)
    }
}
