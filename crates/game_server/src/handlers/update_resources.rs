//! `UpdateResources`: credits or debits one player's balance.

use super::{non_blank, HandlerContext};
use crate::error::HandlerError;
use crate::messaging::types::{SuccessReply, UpdateResourcesPayload};
use crate::resources::LedgerError;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct UpdateResourcesHandler {
    context: HandlerContext,
}

impl UpdateResourcesHandler {
    pub fn new(context: HandlerContext) -> Self {
        Self { context }
    }

    /// Applies `ResourceValue` to the player's balance of `ResourceType`.
    ///
    /// # Returns
    ///
    /// The new balance, with the resource type echoed exactly as sent. A
    /// debit larger than the balance is refused and changes nothing.
    pub async fn handle(&self, payload: UpdateResourcesPayload) -> Result<SuccessReply, HandlerError> {
        let player_id = non_blank(&payload.player_id).ok_or(HandlerError::InvalidUpdateResources)?;
        if payload.resource_value == 0 {
            return Err(HandlerError::InvalidUpdateResources);
        }

        if !self.context.validator.is_valid_resource_type(&payload.resource_type) {
            warn!("🚫 Invalid resource type '{}' in UpdateResources", payload.resource_type);
            return Err(HandlerError::InvalidResourceType);
        }

        let player = self.context.registry.get_player(player_id).ok_or_else(|| {
            warn!("👻 Player {} not found", player_id);
            HandlerError::PlayerNotFound
        })?;

        match player.ledger().try_apply(&payload.resource_type, payload.resource_value).await {
            Ok(amount) => {
                info!(
                    "💰 {} {} for player {} (balance {})",
                    payload.resource_value, payload.resource_type, player_id, amount
                );
                Ok(SuccessReply::ResourcesUpdated {
                    resource_type: payload.resource_type,
                    amount,
                })
            }
            Err(LedgerError::Insufficient { balance, delta, .. }) => {
                warn!(
                    "💸 Insufficient {} for player {}: balance {}, delta {}",
                    payload.resource_type, player_id, balance, delta
                );
                Err(HandlerError::Insufficient(payload.resource_type))
            }
            Err(e @ LedgerError::Overflow(_)) => {
                error!("❌ Ledger update failed for player {}: {}", player_id, e);
                Err(HandlerError::Unexpected(e.to_string()))
            }
        }
    }
}
