//! # Relay Types
//!
//! Pure data structures shared by the codec, the client actors and the hub.
//!
//! ## What This Crate Contains
//! - [`ClientId`]: process-unique handle assigned by the hub at registration
//! - [`Message`]: the closed set of payloads a client may exchange
//! - [`Envelope`]: a payload tagged with the identity of its sender
//!
//! ## What This Crate Does NOT Contain
//! - Wire encoding (belongs in `codec`)
//! - Routing, queues or connection handling (belongs in `messaging-actors`)

pub mod envelope;
pub mod identifiers;

pub use envelope::{Envelope, Message};
pub use identifiers::ClientId;
