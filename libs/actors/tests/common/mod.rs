#![allow(dead_code)]

use codec::{BincodeCodec, WireCodec};
use messaging_actors::test_utils::{InMemoryConnection, RemoteEnd};
use messaging_actors::{ActorConfig, ClientActor, Hub, OutboundReceiver};
use std::sync::Arc;
use std::time::Duration;
use types::Envelope;

pub struct Harness {
    pub actor: Arc<ClientActor>,
    pub connection: Arc<InMemoryConnection>,
    pub remote: RemoteEnd,
    pub receiver: Option<OutboundReceiver>,
}

pub fn harness(hub: Arc<dyn Hub>, codec: BincodeCodec, config: ActorConfig) -> Harness {
    let (connection, remote) = InMemoryConnection::pair();
    let (actor, receiver) = ClientActor::new(hub, Arc::new(codec), connection.clone(), config);
    Harness {
        actor,
        connection,
        remote,
        receiver: Some(receiver),
    }
}

impl Harness {
    /// Spawn the actor's lifecycle on the current runtime
    pub fn spawn(&mut self) -> tokio::task::JoinHandle<()> {
        let receiver = self.receiver.take().expect("actor already running");
        tokio::spawn(self.actor.clone().run(receiver))
    }
}

pub fn encode(envelope: &Envelope) -> bytes::Bytes {
    BincodeCodec::new().encode(envelope).unwrap()
}

pub fn decode(frame: &[u8]) -> Envelope {
    BincodeCodec::new().decode(frame).unwrap()
}

/// Poll `condition` until it holds or one second passes
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

pub async fn join_within(handle: tokio::task::JoinHandle<()>) {
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("actor did not shut down")
        .expect("actor task panicked");
}
