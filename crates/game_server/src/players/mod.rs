//! Player records and the process-wide player registry.

pub mod player;
pub mod registry;

pub use player::{Player, PlayerId};
pub use registry::{PlayerRegistry, RegistryError};
