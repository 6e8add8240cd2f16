//! Client Actor Infrastructure
//!
//! One [`ClientActor`] per live connection. Each actor owns two independently
//! scheduled workers and a bounded outbound queue, and decides per inbound
//! message whether it goes out to every other peer, to one peer, or back
//! down its own connection.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────── ClientActor ───────────────────────┐
//!  connection ──► │ read_pump ──decode──► route ──own id──► Hub::broadcast ─────┼──► other actors
//!                 │                         │                                  │
//!                 │                         └─other id──┐                      │
//!  Hub / peers ───┼──────────── Peer::route ────────────┴──► OutboundQueue     │
//!                 │                                             │ (bounded)    │
//!  connection ◄── │ write_pump ◄──encode──────────────────────────┘             │
//!                 └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Policy
//!
//! - Malformed inbound frame: logged, skipped
//! - Unencodable outbound envelope: logged, dropped
//! - Full outbound queue: new envelope dropped and counted, producer never blocks
//! - Read or write I/O failure: actor teardown via [`ClientActor::close`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use codec::BincodeCodec;
//! use messaging_actors::{ActorConfig, ClientActor, Connection, RelayHub};
//! use std::sync::Arc;
//!
//! async fn serve(hub: Arc<RelayHub>, connection: Arc<dyn Connection>) {
//!     let (actor, outbound) = ClientActor::new(
//!         hub,
//!         Arc::new(BincodeCodec::new()),
//!         connection,
//!         ActorConfig::default(),
//!     );
//!     actor.run(outbound).await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hub;
mod inbound;
pub mod lifecycle;
pub mod metrics;
mod outbound;
pub mod queue;
pub mod registry;
mod router;
pub mod test_utils;
pub mod transport;

pub use client::ClientActor;
pub use config::ActorConfig;
pub use error::ConnectionError;
pub use hub::{Hub, Peer};
pub use lifecycle::ActorState;
pub use metrics::{ActorMetrics, MetricsSnapshot};
pub use queue::{outbound_queue, EnqueueOutcome, OutboundQueue, OutboundReceiver};
pub use registry::RelayHub;
pub use transport::Connection;

pub use types::{ClientId, Envelope, Message};
