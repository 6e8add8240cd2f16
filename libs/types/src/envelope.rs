//! Envelope and payload definitions
//!
//! An [`Envelope`] is the unit moved between a connection, an actor's
//! outbound queue and the hub. Envelopes are never mutated once built; the
//! only rewrite (filling in an omitted sender) produces a new value.

use crate::identifiers::ClientId;
use serde::{Deserialize, Serialize};

/// Closed set of application payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Tells a freshly connected client which identity the hub assigned it
    Id { id: ClientId },
    /// Free-form chat line
    Chat { text: String },
}

impl Message {
    pub fn id(id: ClientId) -> Self {
        Message::Id { id }
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Message::Chat { text: text.into() }
    }

    /// Short variant name for logs and drop accounting
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Id { .. } => "id",
            Message::Chat { .. } => "chat",
        }
    }
}

/// Sender-tagged payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub sender_id: ClientId,
    pub payload: Message,
}

impl Envelope {
    pub fn new(sender_id: ClientId, payload: Message) -> Self {
        Self { sender_id, payload }
    }

    pub fn is_sender_unset(&self) -> bool {
        self.sender_id.is_unset()
    }

    /// Substitute `owner` when the sender was omitted
    pub fn with_default_sender(self, owner: ClientId) -> Self {
        if self.is_sender_unset() {
            Self {
                sender_id: owner,
                payload: self.payload,
            }
        } else {
            self
        }
    }

    pub fn into_parts(self) -> (ClientId, Message) {
        (self.sender_id, self.payload)
    }
}
