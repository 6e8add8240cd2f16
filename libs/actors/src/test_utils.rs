//! In-memory collaborators for exercising actors without sockets
//!
//! - [`InMemoryConnection`] + [`RemoteEnd`]: a connection whose far side is
//!   driven by the test
//! - [`RecordingHub`]: a hub that records broadcasts and unregistrations

use crate::error::ConnectionError;
use crate::hub::{Hub, Peer};
use crate::transport::Connection;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use types::{ClientId, Envelope};

type InboundItem = Result<Bytes, ConnectionError>;

/// Connection backed by channels
#[derive(Debug)]
pub struct InMemoryConnection {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<InboundItem>>,
    written: mpsc::UnboundedSender<Bytes>,
    shutdown: CancellationToken,
    close_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

/// The test's side of an [`InMemoryConnection`]
#[derive(Debug)]
pub struct RemoteEnd {
    inbound: Option<mpsc::UnboundedSender<InboundItem>>,
    written: mpsc::UnboundedReceiver<Bytes>,
}

impl InMemoryConnection {
    pub fn pair() -> (Arc<Self>, RemoteEnd) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (written_tx, written_rx) = mpsc::unbounded_channel();

        let connection = Arc::new(Self {
            inbound: tokio::sync::Mutex::new(inbound_rx),
            written: written_tx,
            shutdown: CancellationToken::new(),
            close_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        });
        let remote = RemoteEnd {
            inbound: Some(inbound_tx),
            written: written_rx,
        };

        (connection, remote)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Make every subsequent write fail with a broken pipe
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn read_frame(&self) -> Result<Option<Bytes>, ConnectionError> {
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            _ = self.shutdown.cancelled() => Ok(None),
            item = inbound.recv() => match item {
                Some(Ok(frame)) => Ok(Some(frame)),
                Some(Err(e)) => Err(e),
                None => Ok(None),
            },
        }
    }

    async fn write_frame(&self, frame: Bytes) -> Result<(), ConnectionError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        if self.shutdown.is_cancelled() {
            return Err(ConnectionError::Closed);
        }
        self.written
            .send(frame)
            .map_err(|_| ConnectionError::Closed)
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.shutdown.cancel();
    }
}

impl RemoteEnd {
    /// Deliver a frame to the actor's read pump
    pub fn send_frame(&self, frame: impl Into<Bytes>) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Ok(frame.into()));
        }
    }

    /// Fail the actor's next read
    pub fn send_error(&self, error: ConnectionError) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(Err(error));
        }
    }

    /// Clean close from the remote side
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    /// Next frame the actor wrote, or `None` after one second
    pub async fn next_written(&mut self) -> Option<Bytes> {
        tokio::time::timeout(Duration::from_secs(1), self.written.recv())
            .await
            .ok()
            .flatten()
    }

    /// Frames already written, without waiting
    pub fn drain_written(&mut self) -> Vec<Bytes> {
        std::iter::from_fn(|| self.written.try_recv().ok()).collect()
    }
}

/// Hub that records what actors ask of it
pub struct RecordingHub {
    next_id: AtomicU64,
    peers: Mutex<HashMap<ClientId, Arc<dyn Peer>>>,
    broadcasts: Mutex<Vec<Envelope>>,
    unregistered: Mutex<Vec<ClientId>>,
}

impl RecordingHub {
    pub fn new() -> Arc<Self> {
        Self::starting_at(1)
    }

    /// First `register` call hands out `first_id`
    pub fn starting_at(first_id: u64) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(first_id),
            peers: Mutex::new(HashMap::new()),
            broadcasts: Mutex::new(Vec::new()),
            unregistered: Mutex::new(Vec::new()),
        })
    }

    /// Make an already initialized peer reachable without assigning an id
    pub fn insert(&self, peer: Arc<dyn Peer>) {
        self.peers.lock().insert(peer.id(), peer);
    }

    pub fn broadcasts(&self) -> Vec<Envelope> {
        self.broadcasts.lock().clone()
    }

    pub fn unregistered(&self) -> Vec<ClientId> {
        self.unregistered.lock().clone()
    }

    pub fn unregister_count(&self) -> usize {
        self.unregistered.lock().len()
    }

    pub fn is_registered(&self, id: ClientId) -> bool {
        self.peers.lock().contains_key(&id)
    }
}

impl Hub for RecordingHub {
    fn register(&self, peer: Arc<dyn Peer>) -> ClientId {
        let id = ClientId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        peer.initialize(id);
        self.peers.lock().insert(id, peer);
        id
    }

    fn unregister(&self, id: ClientId) {
        self.unregistered.lock().push(id);
        self.peers.lock().remove(&id);
    }

    fn lookup(&self, id: ClientId) -> Option<Arc<dyn Peer>> {
        self.peers.lock().get(&id).cloned()
    }

    fn broadcast(&self, envelope: Envelope) {
        self.broadcasts.lock().push(envelope);
    }
}
