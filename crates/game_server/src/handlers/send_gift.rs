//! `SendGift`: moves resources from one player to another and notifies the
//! recipient if it is online.

use super::{non_blank, HandlerContext};
use crate::error::HandlerError;
use crate::messaging::types::{GiftEvent, SendGiftPayload, SuccessReply};
use crate::players::Player;
use crate::resources::LedgerError;
use tracing::{debug, error, info, warn};

pub const GIFT_SENT_MESSAGE: &str = "Gift sent successfully";

#[derive(Debug, Clone)]
pub struct SendGiftHandler {
    context: HandlerContext,
}

impl SendGiftHandler {
    pub fn new(context: HandlerContext) -> Self {
        Self { context }
    }

    /// Transfers `ResourceValue` of `ResourceType` from sender to friend.
    ///
    /// The sender is debited first with an atomic check-and-apply, then the
    /// friend is credited the same way. A credit that would overflow the
    /// friend's balance puts the debit back on the sender, so a gift either
    /// moves the full amount or nothing. Each call moves funds again;
    /// identical requests are not deduplicated.
    ///
    /// A `GiftEvent` is pushed to the friend's live connection, if any. A
    /// failed push is logged and does not change the result.
    pub async fn handle(&self, payload: SendGiftPayload) -> Result<SuccessReply, HandlerError> {
        let sender_id = non_blank(&payload.sender_player_id).ok_or(HandlerError::InvalidSendGift)?;
        let friend_id = non_blank(&payload.friend_player_id).ok_or(HandlerError::InvalidSendGift)?;
        if payload.resource_value <= 0 {
            return Err(HandlerError::InvalidSendGift);
        }

        if !self.context.validator.is_valid_resource_type(&payload.resource_type) {
            warn!("🚫 Invalid resource type '{}' in SendGift", payload.resource_type);
            return Err(HandlerError::InvalidResourceType);
        }

        let registry = &self.context.registry;
        let (sender, friend) = match (registry.get_player(sender_id), registry.get_player(friend_id)) {
            (Some(sender), Some(friend)) => (sender, friend),
            _ => {
                warn!("👻 Sender ({}) or friend ({}) not found", sender_id, friend_id);
                return Err(HandlerError::SenderOrFriendNotFound);
            }
        };

        let value = payload.resource_value;
        match sender.ledger().try_apply(&payload.resource_type, -value).await {
            Ok(_) => {}
            Err(LedgerError::Insufficient { balance, .. }) => {
                warn!(
                    "💸 Insufficient {} for player {}: balance {}, gift {}",
                    payload.resource_type, sender_id, balance, value
                );
                return Err(HandlerError::Insufficient(payload.resource_type));
            }
            Err(e @ LedgerError::Overflow(_)) => {
                error!("❌ Debit failed for player {}: {}", sender_id, e);
                return Err(HandlerError::Unexpected(e.to_string()));
            }
        }
        if let Err(e) = friend.ledger().try_apply(&payload.resource_type, value).await {
            // The sender held these funds a moment ago.
            sender.ledger().apply(&payload.resource_type, value).await;
            error!("❌ Credit failed for player {}, debit returned to {}: {}", friend_id, sender_id, e);
            return Err(HandlerError::Unexpected(e.to_string()));
        }

        info!(
            "🎁 {} {} sent from player {} to player {}",
            value, payload.resource_type, sender_id, friend_id
        );

        self.notify(&friend, GiftEvent::new(sender_id, payload.resource_type, value));

        Ok(SuccessReply::GiftSent {
            message: GIFT_SENT_MESSAGE.to_string(),
        })
    }

    fn notify(&self, friend: &Player, event: GiftEvent) {
        let Some(connection) = friend.connection() else {
            debug!("📭 Player {} is offline, gift event not pushed", friend.id());
            return;
        };

        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                error!("❌ Failed to serialize gift event: {}", e);
                return;
            }
        };

        match connection.send_text(text) {
            Ok(()) => info!("📬 Gift event queued for player {} on connection {}", friend.id(), connection.id()),
            Err(e) => warn!("⚠️ Gift event for player {} dropped: {}", friend.id(), e),
        }
    }
}
