//! Business logic for each client message type.
//!
//! Handlers are plain structs built once at startup and shared read-only by
//! every connection task. Each one validates its payload before touching the
//! registry, and reports failures as [`HandlerError`] values that the router
//! turns into structured error replies.
//!
//! [`HandlerError`]: crate::error::HandlerError

pub mod login;
pub mod send_gift;
pub mod update_resources;

pub use login::LoginHandler;
pub use send_gift::SendGiftHandler;
pub use update_resources::UpdateResourcesHandler;

use crate::players::PlayerRegistry;
use crate::resources::ResourceTypeValidator;
use std::sync::Arc;

/// Shared state every handler operates on.
#[derive(Clone)]
pub struct HandlerContext {
    pub registry: Arc<PlayerRegistry>,
    pub validator: Arc<dyn ResourceTypeValidator>,
}

impl HandlerContext {
    pub fn new(registry: Arc<PlayerRegistry>, validator: Arc<dyn ResourceTypeValidator>) -> Self {
        Self { registry, validator }
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("players", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Returns the trimmed value if it is not blank.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
