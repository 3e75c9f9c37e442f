//! Security module for inbound frame validation.
//!
//! Every text frame is checked against the configured [`SecurityConfig`]
//! limits before it reaches the router.
//!
//! [`SecurityConfig`]: crate::config::SecurityConfig

pub mod input_validation;

pub use input_validation::validate_json_message;

/// Security-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    #[error("Message too large: {0} bytes")]
    MessageTooLarge(usize),

    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    #[error("Malicious content detected")]
    MaliciousContent,
}
