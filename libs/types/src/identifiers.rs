//! Client identity handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-unique client handle
///
/// Assigned once by the hub when an actor registers and immutable afterwards.
/// The zero value is reserved: a frame carrying [`ClientId::UNSET`] as its
/// sender means "whoever owns this connection".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ClientId(pub u64);

impl ClientId {
    /// Sender omitted / identity not yet assigned
    pub const UNSET: ClientId = ClientId(0);

    #[inline(always)]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ClientId> for u64 {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_sentinel() {
        assert!(ClientId::UNSET.is_unset());
        assert!(ClientId::default().is_unset());
        assert!(!ClientId::new(7).is_unset());
    }

    #[test]
    fn test_display_is_bare_integer() {
        assert_eq!(ClientId::new(9).to_string(), "9");
    }
}
