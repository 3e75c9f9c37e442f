//! Input validation for inbound frames.

use super::SecurityError;
use crate::config::SecurityConfig;
use serde_json::Value;

/// Validates a JSON message against the limits in `config`.
///
/// Checks the raw size first, then parses the frame and walks the resulting
/// value checking nesting depth, string and key lengths, collection sizes
/// and NUL bytes.
pub fn validate_json_message(message: &[u8], config: &SecurityConfig) -> Result<(), SecurityError> {
    if message.len() > config.max_message_size {
        return Err(SecurityError::MessageTooLarge(message.len()));
    }

    if message.contains(&0) {
        return Err(SecurityError::MaliciousContent);
    }

    let json: Value = serde_json::from_slice(message)
        .map_err(|e| SecurityError::InvalidMessageFormat(e.to_string()))?;

    validate_json_value(&json, 0, config)
}

/// Recursively validates a JSON value
fn validate_json_value(value: &Value, depth: usize, config: &SecurityConfig) -> Result<(), SecurityError> {
    if depth > config.max_json_depth {
        return Err(SecurityError::InvalidMessageFormat(
            "JSON nesting too deep".to_string(),
        ));
    }

    match value {
        Value::String(s) => validate_string(s, config)?,
        Value::Array(items) => {
            if items.len() > config.max_collection_size {
                return Err(SecurityError::InvalidMessageFormat(format!(
                    "Array too large: {} elements",
                    items.len()
                )));
            }
            for item in items {
                validate_json_value(item, depth + 1, config)?;
            }
        }
        Value::Object(fields) => {
            if fields.len() > config.max_collection_size {
                return Err(SecurityError::InvalidMessageFormat(format!(
                    "Object too large: {} keys",
                    fields.len()
                )));
            }
            for (key, field) in fields {
                validate_string(key, config)?;
                validate_json_value(field, depth + 1, config)?;
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }

    Ok(())
}

fn validate_string(s: &str, config: &SecurityConfig) -> Result<(), SecurityError> {
    if s.len() > config.max_string_length {
        return Err(SecurityError::InvalidMessageFormat(format!(
            "String too long: {} characters",
            s.len()
        )));
    }
    // Escaped "\u0000" survives parsing, so the raw byte check above is not enough.
    if s.contains('\0') {
        return Err(SecurityError::MaliciousContent);
    }
    Ok(())
}
