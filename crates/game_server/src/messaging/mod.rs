//! Message handling and routing for client-server communication.
//!
//! This module provides the wire model (envelopes, payloads, replies and
//! pushed events) and the router that dispatches each envelope to its
//! handler.

pub mod router;
pub mod types;

pub use router::{MessageRouter, RouterError};
pub use types::{ClientMessage, GiftEvent, MessageKind, Reply};
