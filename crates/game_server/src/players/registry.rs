//! Concurrent registry of logged-in players.
//!
//! Two maps back the registry: players by identity, and a device index that
//! enforces "one live player per device". Neither map is ever locked while a
//! guard on the other is held, except in [`PlayerRegistry::register_device`]
//! which always takes the device shard first and the player shard second.

use super::player::{Player, PlayerId};
use crate::connection::{ConnectionHandle, ConnectionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Reasons the registry refuses to register a player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("device {0} is already connected")]
    DeviceAlreadyConnected(String),

    #[error("player {0} already exists")]
    DuplicatePlayer(PlayerId),
}

/// Process-wide store of all players. Safe to share between connection tasks.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: DashMap<PlayerId, Arc<Player>>,
    devices: DashMap<String, PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a player under `player_id`. Returns false if the id is taken.
    ///
    /// Device uniqueness is not checked here; use
    /// [`PlayerRegistry::register_device`] for an atomic check-and-insert.
    pub fn add_player(&self, device_id: &str, player_id: PlayerId, connection: Option<&ConnectionHandle>) -> bool {
        match self.players.entry(player_id.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Player::new(player_id.clone(), device_id, connection)));
            }
        }

        self.devices.entry(device_id.to_string()).or_insert(player_id);
        true
    }

    /// Claims `device_id` and creates a player for it in one step.
    ///
    /// The device slot stays locked until the player is inserted, so two
    /// concurrent logins for the same device cannot both succeed.
    pub fn register_device(&self, device_id: &str, connection: Option<&ConnectionHandle>) -> Result<Arc<Player>, RegistryError> {
        match self.devices.entry(device_id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::DeviceAlreadyConnected(device_id.to_string())),
            Entry::Vacant(device_slot) => {
                let player_id = PlayerId::generate();
                let player = Arc::new(Player::new(player_id.clone(), device_id, connection));

                match self.players.entry(player_id.clone()) {
                    Entry::Occupied(_) => return Err(RegistryError::DuplicatePlayer(player_id)),
                    Entry::Vacant(player_slot) => {
                        player_slot.insert(player.clone());
                    }
                }

                device_slot.insert(player_id);
                Ok(player)
            }
        }
    }

    pub fn get_player(&self, player_id: &str) -> Option<Arc<Player>> {
        self.players.get(player_id).map(|entry| entry.value().clone())
    }

    /// True if any registered player has this device id.
    pub fn is_device_connected(&self, device_id: &str) -> bool {
        self.players.iter().any(|entry| entry.value().device_id() == device_id)
    }

    /// Removes a player and releases its device claim.
    pub fn remove_player(&self, player_id: &str) -> Option<Arc<Player>> {
        let (_, player) = self.players.remove(player_id)?;
        let device_id = player.device_id();

        let released = self
            .devices
            .remove_if(device_id, |_, owner| owner.as_str() == player_id)
            .is_some();

        // Players added through `add_player` may share a device; keep the index pointing at one of them.
        if released {
            let survivor = self
                .players
                .iter()
                .find(|entry| entry.value().device_id() == device_id)
                .map(|entry| entry.key().clone());
            if let Some(survivor) = survivor {
                self.devices.entry(device_id.to_string()).or_insert(survivor);
            }
        }

        debug!("🗑️ Removed player {} (device {})", player.id(), device_id);
        Some(player)
    }

    /// Handles the end of a connection for every player bound to it.
    ///
    /// With `evict` the players are removed and their devices may log in
    /// again. Without it they stay registered and only lose their push
    /// target. Returns how many players were bound to the connection.
    pub fn release_connection(&self, connection_id: ConnectionId, evict: bool) -> usize {
        let bound: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|entry| entry.value().connection_id() == Some(connection_id))
            .map(|entry| entry.key().clone())
            .collect();

        if evict {
            for player_id in &bound {
                self.remove_player(player_id.as_str());
            }
        }

        if !bound.is_empty() {
            info!(
                "🔌 Connection {} released {} player(s) ({})",
                connection_id,
                bound.len(),
                if evict { "evicted" } else { "detached" }
            );
        }
        bound.len()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_player_succeeds() {
        let registry = PlayerRegistry::new();
        assert!(registry.add_player("device-123", PlayerId::from("player-1"), None));
        assert!(registry.get_player("player-1").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_player_rejects_duplicate_id() {
        let registry = PlayerRegistry::new();
        assert!(registry.add_player("device-123", PlayerId::from("player-1"), None));
        assert!(!registry.add_player("device-123", PlayerId::from("player-1"), None));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing_player() {
        let registry = PlayerRegistry::new();
        assert!(registry.get_player("player-999").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_is_device_connected() {
        let registry = PlayerRegistry::new();
        registry.add_player("device-123", PlayerId::from("player-1"), None);
        assert!(registry.is_device_connected("device-123"));
        assert!(!registry.is_device_connected("device-999"));
    }

    #[test]
    fn test_register_device_rejects_second_claim() {
        let registry = PlayerRegistry::new();
        let player = registry.register_device("device-111", None).expect("first claim");
        assert_eq!(player.device_id(), "device-111");

        assert_eq!(
            registry.register_device("device-111", None).unwrap_err(),
            RegistryError::DeviceAlreadyConnected("device-111".to_string())
        );

        let other = registry.register_device("device-222", None).expect("new device");
        assert_ne!(player.id(), other.id());
    }

    #[test]
    fn test_register_device_respects_add_player() {
        let registry = PlayerRegistry::new();
        registry.add_player("device-1", PlayerId::from("player-1"), None);
        assert!(registry.register_device("device-1", None).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_same_device_admits_one() {
        let registry = Arc::new(PlayerRegistry::new());
        let mut tasks = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry.register_device("shared-device", None).is_ok()
            }));
        }

        let mut admitted = 0;
        for task in tasks {
            if task.await.expect("task panicked") {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_player_frees_device() {
        let registry = PlayerRegistry::new();
        let player = registry.register_device("device-1", None).expect("claim");
        assert!(registry.remove_player(player.id().as_str()).is_some());
        assert!(!registry.is_device_connected("device-1"));
        assert!(registry.register_device("device-1", None).is_ok());
    }

    #[test]
    fn test_remove_player_keeps_shared_device_indexed() {
        let registry = PlayerRegistry::new();
        registry.add_player("device-1", PlayerId::from("a"), None);
        registry.add_player("device-1", PlayerId::from("b"), None);

        registry.remove_player("a");
        assert!(registry.is_device_connected("device-1"));
        assert!(registry.register_device("device-1", None).is_err());
    }

    #[tokio::test]
    async fn test_release_connection_detach_and_evict() {
        let registry = PlayerRegistry::new();
        let (first, _rx1) = ConnectionHandle::channel(1);
        let (second, _rx2) = ConnectionHandle::channel(2);

        let kept = registry.register_device("device-1", Some(&first)).expect("claim");
        registry.register_device("device-2", Some(&second)).expect("claim");

        drop(first);
        assert_eq!(registry.release_connection(1, false), 1);
        assert!(registry.get_player(kept.id().as_str()).is_some());
        assert!(kept.connection().is_none());

        assert_eq!(registry.release_connection(2, true), 1);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_device_connected("device-2"));
        assert_eq!(registry.release_connection(99, true), 0);
    }
}
