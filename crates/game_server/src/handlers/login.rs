//! `Login`: claims a device and issues a fresh player identity.

use super::{non_blank, HandlerContext};
use crate::connection::ConnectionHandle;
use crate::error::HandlerError;
use crate::messaging::types::{LoginPayload, SuccessReply};
use crate::players::RegistryError;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LoginHandler {
    context: HandlerContext,
}

impl LoginHandler {
    pub fn new(context: HandlerContext) -> Self {
        Self { context }
    }

    /// Registers a new player for the payload's device.
    ///
    /// The device check and the insert happen as one registry operation, so
    /// of two concurrent logins for the same device exactly one succeeds.
    /// The player is bound to `connection` as its push target.
    pub async fn handle(&self, payload: LoginPayload, connection: &ConnectionHandle) -> Result<SuccessReply, HandlerError> {
        let device_id = payload
            .udid
            .as_deref()
            .and_then(non_blank)
            .ok_or(HandlerError::InvalidLogin)?;

        match self.context.registry.register_device(device_id, Some(connection)) {
            Ok(player) => {
                info!(
                    "🎮 Device {} logged in as player {} on connection {}",
                    device_id,
                    player.id(),
                    connection.id()
                );
                Ok(SuccessReply::LoggedIn {
                    player_id: player.id().to_string(),
                })
            }
            Err(RegistryError::DeviceAlreadyConnected(_)) => {
                warn!("🚫 Device {} is already connected", device_id);
                Err(HandlerError::AlreadyConnected)
            }
            Err(RegistryError::DuplicatePlayer(player_id)) => {
                warn!("⚠️ Generated player id {} collided", player_id);
                Err(HandlerError::AddPlayerFailed)
            }
        }
    }
}
