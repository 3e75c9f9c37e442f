//! Main application logic and lifecycle management.
//!
//! This module contains the core `Application` struct that orchestrates
//! server startup and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, wait_for_signal},
};
use game_server::{GameServer, ShutdownState};
use std::time::Duration;
use tracing::{error, info, warn};

/// How long the server gets to drain after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// Main application struct.
///
/// The `Application` struct manages the complete lifecycle of the gift
/// server, including configuration loading, server initialization and
/// graceful shutdown handling.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Accepted resource types after merging the types file
    resource_types: Vec<String>,
    /// Game server instance
    server: GameServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Returns
    ///
    /// A configured `Application` instance ready to run, or an error if
    /// initialization failed.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Resolve the resource type allow-list
    /// 5. Initialize game server with configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let config = AppConfig::load_from_file(&args.config_path).await?;
        Self::from_config(config, args).await
    }

    /// Builds the application from an already loaded configuration.
    ///
    /// Applies the overrides in `args`; `args.config_path` is only used for
    /// logging.
    pub async fn from_config(mut config: AppConfig, args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(types_file) = args.resource_types_file {
            config.resources.types_file = Some(types_file.to_string_lossy().to_string());
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let resource_types = config.resolve_resource_types().await?;
        let server_config = config.to_server_config(resource_types.clone())?;
        let server = GameServer::new(server_config);

        info!("📂 Config: {}", args.config_path.display());

        Ok(Self {
            config,
            resource_types,
            server,
        })
    }

    /// The effective configuration after CLI overrides.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The game server this application runs.
    pub fn server(&self) -> &GameServer {
        &self.server
    }

    /// Runs the application until a shutdown signal arrives.
    ///
    /// Starts the server, waits for SIGINT/SIGTERM, then lets the server
    /// drain its connections. A second signal during shutdown exits the
    /// process immediately.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the application ran and shut down successfully, or an
    /// error if the server failed to start or stopped on its own with an
    /// error.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Gift Server Application");
        self.log_configuration_summary();

        let shutdown_state = ShutdownState::new();
        let shutdown_state_for_server = shutdown_state.clone();

        // Start server in background
        let server = self.server;
        let mut server_handle = tokio::spawn(async move {
            server.start_with_shutdown_state(shutdown_state_for_server).await
        });

        info!("✅ Gift Server is now running!");
        info!("🎮 Ready to accept connections on {}", self.config.server.bind_address);
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        tokio::select! {
            signal = setup_signal_handlers(&shutdown_state) => signal?,
            finished = &mut server_handle => {
                // The server only stops by itself when it failed to start.
                return match finished {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!("❌ Server error: {}", e);
                        Err(e.into())
                    }
                    Err(e) => Err(format!("Server task failed: {e}").into()),
                };
            }
        }

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_signal().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server_handle).await {
            Ok(Ok(Ok(()))) => info!("✅ Server task completed gracefully"),
            Ok(Ok(Err(e))) => error!("❌ Server error during shutdown: {}", e),
            Ok(Err(e)) => error!("❌ Server task failed: {}", e),
            Err(_) => {
                warn!("⏰ Server did not stop within {:?}, aborting", SHUTDOWN_TIMEOUT);
                server_handle.abort();
            }
        }

        info!(
            "✅ Gift Server shutdown complete (drained: {})",
            shutdown_state.is_shutdown_complete()
        );
        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!("  💰 Resource types: {}", self.resource_types.join(", "));
        info!(
            "  🔌 On disconnect: {}",
            if self.config.session.evict_on_disconnect { "evict player" } else { "detach connection" }
        );
        info!(
            "  🛡️ Frame limits: {} bytes, depth {}",
            self.config.security.max_message_size, self.config.security.max_json_depth
        );
    }
}
