//! Command-line interface handling for the gift server.
//!
//! This module provides command-line argument parsing using the `clap`
//! builder API.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// This structure holds all the command-line options that can be used to
/// override configuration file settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for bind address
    pub bind_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the resource types file
    pub resource_types_file: Option<PathBuf>,
}

impl CliArgs {
    /// Parses the process arguments.
    ///
    /// Exits with a usage message when the arguments are invalid.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list (the first item is the binary name).
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            bind_address: matches.get_one::<String>("bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            resource_types_file: matches.get_one::<String>("resource-types").map(PathBuf::from),
        }
    }
}

fn command() -> Command {
    Command::new("Gift Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Real-time resource gifting server over WebSockets")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDRESS")
                .help("Bind address (e.g., 127.0.0.1:5000)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("resource-types")
                .short('r')
                .long("resource-types")
                .value_name("FILE")
                .help("JSON file with {\"ValidResourceTypes\": [...]} (overrides the config file)"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["gift_server"]).unwrap();
        assert_eq!(
            args,
            CliArgs {
                config_path: PathBuf::from("config.toml"),
                bind_address: None,
                log_level: None,
                json_logs: false,
                resource_types_file: None,
            }
        );
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "gift_server",
            "-c",
            "prod.toml",
            "--bind",
            "0.0.0.0:9000",
            "-l",
            "debug",
            "--json-logs",
            "-r",
            "valid_resources_types.json",
        ])
        .unwrap();

        assert_eq!(args.config_path, PathBuf::from("prod.toml"));
        assert_eq!(args.bind_address.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert_eq!(args.resource_types_file, Some(PathBuf::from("valid_resources_types.json")));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(CliArgs::try_parse_from(["gift_server", "--players", "5"]).is_err());
    }
}
