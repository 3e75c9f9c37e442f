//! Configuration management for the gift server.
//!
//! This module handles loading, validation, and conversion of server configuration
//! from TOML files, the JSON resource type list and command-line arguments.

use game_server::{SecurityConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application configuration loaded from TOML file.
///
/// This is the main configuration structure that encompasses all server settings
/// including networking, accepted resource types, session lifecycle, frame
/// limits and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Accepted resource types
    #[serde(default)]
    pub resources: ResourceSettings,
    /// Player session lifecycle
    #[serde(default)]
    pub session: SessionSettings,
    /// Inbound frame limits
    #[serde(default)]
    pub security: SecurityConfig,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:5000")
    pub bind_address: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Default for max_connections
fn default_max_connections() -> usize {
    1000
}

/// Resource type allow-list settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// Resource type names accepted by UpdateResources and SendGift
    pub valid_types: Vec<String>,
    /// Optional JSON file of the form `{"ValidResourceTypes": [...]}`. When
    /// set, its entries replace `valid_types`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types_file: Option<String>,
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Remove a player when its connection closes, freeing its device for a
    /// new login. When false the player stays registered without a
    /// connection.
    pub evict_on_disconnect: bool,
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
    /// Optional file path for log output (None means stdout only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Shape of the resource types file.
#[derive(Debug, Deserialize)]
struct ResourceTypesFile {
    #[serde(rename = "ValidResourceTypes")]
    valid_resource_types: Vec<String>,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            valid_types: vec!["coins".to_string(), "rolls".to_string()],
            types_file: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "127.0.0.1:5000".to_string(),
                max_connections: default_max_connections(),
            },
            resources: ResourceSettings::default(),
            session: SessionSettings::default(),
            security: SecurityConfig::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
                file_path: None,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the specified path
    /// and returns the default configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded or default configuration, or an error if loading/creation failed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Resolves the full list of accepted resource types.
    ///
    /// Uses the entries of `resources.types_file` when one is configured,
    /// otherwise `resources.valid_types`. Names are compared
    /// case-insensitively; blanks and duplicates are dropped.
    ///
    /// # Returns
    ///
    /// The list, or an error if the types file could not be read, is not of
    /// the form `{"ValidResourceTypes": [...]}`, or names no type.
    pub async fn resolve_resource_types(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let mut names = Vec::new();

        if let Some(types_file) = &self.resources.types_file {
            let path = PathBuf::from(types_file);
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| format!("Failed to read resource types file {}: {e}", path.display()))?;
            let file: ResourceTypesFile = serde_json::from_str(&content)
                .map_err(|e| format!("Invalid resource types file {}: {e}", path.display()))?;
            debug!(
                "Loaded {} resource type(s) from {}",
                file.valid_resource_types.len(),
                path.display()
            );
            names.extend(file.valid_resource_types);
        } else {
            names.extend(self.resources.valid_types.iter().cloned());
        }

        let mut seen = std::collections::HashSet::new();
        names.retain(|name| {
            let key = name.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        });

        if names.is_empty() {
            return Err("No valid resource types configured".into());
        }
        Ok(names)
    }

    /// Converts the application configuration to a game server configuration.
    ///
    /// # Arguments
    ///
    /// * `valid_resource_types` - The list produced by
    ///   [`AppConfig::resolve_resource_types`]
    ///
    /// # Returns
    ///
    /// A `ServerConfig` instance ready for use with the game server.
    pub fn to_server_config(&self, valid_resource_types: Vec<String>) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            max_connections: self.server.max_connections,
            valid_resource_types,
            evict_on_disconnect: self.session.evict_on_disconnect,
            security: self.security.clone(),
        })
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        // Validate bind address
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.server.max_connections == 0 {
            return Err("server.max_connections must be greater than 0".to_string());
        }

        if self.resources.valid_types.iter().all(|name| name.trim().is_empty())
            && self.resources.types_file.is_none()
        {
            return Err("At least one resource type must be configured".to_string());
        }

        let limits = [
            ("security.max_message_size", self.security.max_message_size),
            ("security.max_json_depth", self.security.max_json_depth),
            ("security.max_string_length", self.security.max_string_length),
            ("security.max_collection_size", self.security.max_collection_size),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(format!("{name} must be greater than 0"));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
