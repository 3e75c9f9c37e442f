//! Message type definitions for client-server communication.
//!
//! Every inbound frame is an envelope `{"Type": ..., "Payload": {...}}`.
//! The type tag is matched case-insensitively against the closed set of
//! [`MessageKind`]s and the payload is decoded into the matching strongly
//! typed [`ClientMessage`] variant. Replies are tagged by `Status`.
//!
//! Standard login message:
//! ```json
//! {
//!   "Type": "Login",
//!   "Payload": { "UDID": "device-111" }
//! }
//! ```
//!
//! Gift message:
//! ```json
//! {
//!   "Type": "SendGift",
//!   "Payload": {
//!     "SenderPlayerId": "6f1c...",
//!     "FriendPlayerId": "0b9e...",
//!     "ResourceType": "coins",
//!     "ResourceValue": 50
//!   }
//! }
//! ```

use crate::error::HandlerError;
use crate::resources::Balance;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The raw envelope as it arrives on the wire.
///
/// `Type` is optional here so a missing tag is reported as an invalid
/// message format rather than a JSON error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,

    #[serde(rename = "Payload", default)]
    pub payload: serde_json::Value,
}

/// The closed set of message types a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Login,
    UpdateResources,
    SendGift,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Login => "Login",
            MessageKind::UpdateResources => "UpdateResources",
            MessageKind::SendGift => "SendGift",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag that does not name any [`MessageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for MessageKind {
    type Err = UnknownKind;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        [MessageKind::Login, MessageKind::UpdateResources, MessageKind::SendGift]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| UnknownKind(tag.to_string()))
    }
}

/// `Login` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(rename = "UDID", default)]
    pub udid: Option<String>,
}

/// `UpdateResources` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateResourcesPayload {
    pub player_id: String,
    pub resource_type: String,
    pub resource_value: Balance,
}

/// `SendGift` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SendGiftPayload {
    pub sender_player_id: String,
    pub friend_player_id: String,
    pub resource_type: String,
    pub resource_value: Balance,
}

/// A decoded client message, one variant per [`MessageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Login(LoginPayload),
    UpdateResources(UpdateResourcesPayload),
    SendGift(SendGiftPayload),
}

impl ClientMessage {
    /// Decodes `payload` as the payload of `kind`.
    ///
    /// A payload of the wrong JSON shape (not an object, fields of the wrong
    /// type) is reported as [`HandlerError::InvalidJson`].
    pub fn decode(kind: MessageKind, payload: serde_json::Value) -> Result<Self, HandlerError> {
        Ok(match kind {
            MessageKind::Login => ClientMessage::Login(decode_payload(payload)?),
            MessageKind::UpdateResources => ClientMessage::UpdateResources(decode_payload(payload)?),
            MessageKind::SendGift => ClientMessage::SendGift(decode_payload(payload)?),
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            ClientMessage::Login(_) => MessageKind::Login,
            ClientMessage::UpdateResources(_) => MessageKind::UpdateResources,
            ClientMessage::SendGift(_) => MessageKind::SendGift,
        }
    }
}

fn decode_payload<T: DeserializeOwned + Default>(payload: serde_json::Value) -> Result<T, HandlerError> {
    // A missing payload behaves like an empty one so the handler reports which field is absent.
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|e| HandlerError::InvalidJson(e.to_string()))
}

/// Successful handler outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SuccessReply {
    LoggedIn {
        #[serde(rename = "PlayerId")]
        player_id: String,
    },
    ResourcesUpdated {
        #[serde(rename = "ResourceType")]
        resource_type: String,
        #[serde(rename = "Amount")]
        amount: Balance,
    },
    GiftSent {
        #[serde(rename = "Message")]
        message: String,
    },
}

/// Body of a `{"Status":"Error"}` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    #[serde(rename = "Message")]
    pub message: String,

    #[serde(rename = "Details", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&HandlerError> for ErrorReply {
    fn from(error: &HandlerError) -> Self {
        Self {
            message: error.to_string(),
            details: error.details().map(str::to_string),
        }
    }
}

/// A structured reply to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Status")]
pub enum Reply {
    Success(SuccessReply),
    Error(ErrorReply),
}

impl Reply {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Result<SuccessReply, HandlerError>> for Reply {
    fn from(result: Result<SuccessReply, HandlerError>) -> Self {
        match result {
            Ok(success) => Reply::Success(success),
            Err(error) => Reply::Error(ErrorReply::from(&error)),
        }
    }
}

/// Unsolicited notification pushed to a gift recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GiftEvent {
    pub event_type: String,
    pub from_player_id: String,
    pub resource_type: String,
    pub resource_value: Balance,
}

impl GiftEvent {
    pub const EVENT_TYPE: &'static str = "GiftEvent";

    pub fn new(from_player_id: impl Into<String>, resource_type: impl Into<String>, resource_value: Balance) -> Self {
        Self {
            event_type: Self::EVENT_TYPE.to_string(),
            from_player_id: from_player_id.into(),
            resource_type: resource_type.into(),
            resource_value,
        }
    }
}
