//! Actor configuration

use serde::{Deserialize, Serialize};

/// Default outbound queue depth per actor
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Maximum envelopes waiting for the write pump; further enqueues are dropped
    pub outbound_capacity: usize,

    /// Also deliver a client's own messages back down its connection
    pub echo_own_messages: bool,
}

impl ActorConfig {
    /// Queue depth actually used; a zero-capacity queue is not representable
    pub fn effective_capacity(&self) -> usize {
        self.outbound_capacity.max(1)
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            echo_own_messages: false,
        }
    }
}
