//! The player record owned by the registry.

use crate::connection::{ConnectionHandle, ConnectionId, WeakConnectionHandle};
use crate::resources::ResourceLedger;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Opaque, unique player identity handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates a fresh identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A logged-in player: identity, device, resource ledger and the
/// connection it logged in from.
///
/// The connection is held weakly. Closing the socket does not notify the
/// player; [`Player::connection`] simply stops returning a handle.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    device_id: String,
    ledger: ResourceLedger,
    connection: Option<WeakConnectionHandle>,
}

impl Player {
    pub fn new(id: PlayerId, device_id: impl Into<String>, connection: Option<&ConnectionHandle>) -> Self {
        Self {
            id,
            device_id: device_id.into(),
            ledger: ResourceLedger::new(),
            connection: connection.map(ConnectionHandle::downgrade),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// The live connection, if the player has one and it is still open.
    pub fn connection(&self) -> Option<ConnectionHandle> {
        self.connection.as_ref().and_then(WeakConnectionHandle::upgrade)
    }

    /// ID of the connection the player logged in from, open or not.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(WeakConnectionHandle::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PlayerId::generate();
        let b = PlayerId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let id = PlayerId::from("player-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"player-1\"");
        assert_eq!(id.to_string(), "player-1");
    }

    #[tokio::test]
    async fn test_connection_is_weak() {
        let (handle, _receiver) = ConnectionHandle::channel(11);
        let player = Player::new(PlayerId::from("p"), "device-1", Some(&handle));

        assert_eq!(player.connection_id(), Some(11));
        assert!(player.connection().is_some());

        drop(handle);
        assert!(player.connection().is_none());
        assert_eq!(player.connection_id(), Some(11));
    }

    #[test]
    fn test_player_without_connection() {
        let player = Player::new(PlayerId::from("p"), "device-1", None);
        assert!(player.connection().is_none());
        assert_eq!(player.connection_id(), None);
        assert_eq!(player.device_id(), "device-1");
    }
}
