//! Relay configuration from `pagerelay.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [fetch], [serve], [rewrite]
//! ├── types/         # ConfigError, diagnostics, global handle
//! ├── util.rs        # config file discovery
//! └── mod.rs         # RelayConfig (this file)
//! ```
//!
//! Every field has a default, so a missing config file is not an error.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{FetchConfig, RewriteConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, Commands, FetchArgs},
    debug, log,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pagerelay.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,
}

impl RelayConfig {
    /// Load configuration for this invocation.
    ///
    /// Searches upward from cwd for the config file; CLI options are applied
    /// on top and the result is validated as a whole.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Unknown keys are ignored, not fatal; the relay may run unattended.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Fetch { args, .. } => self.apply_fetch_args(args),
            Commands::Normalize { preserve_query, .. } => {
                Self::update_option(&mut self.rewrite.preserve_query, preserve_query.as_ref());
            }
            Commands::Convert { .. } | Commands::Rewrite { .. } => {}
        }
    }

    /// Session-wide fetch settings; per-request bits stay on `FetchArgs`.
    fn apply_fetch_args(&mut self, args: &FetchArgs) {
        Self::update_option(&mut self.fetch.timeout, args.timeout.as_ref());
        Self::update_option(&mut self.fetch.mobile, args.mobile.as_ref());
        if args.proxy.is_some() {
            self.fetch.proxy = args.proxy.clone();
        }
        if args.user_agent.is_some() {
            self.fetch.user_agent = args.user_agent.clone();
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.fetch.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> RelayConfig {
    let (parsed, ignored) = RelayConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::net::{IpAddr, Ipv4Addr};
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pagerelay").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_invalid_toml() {
        let result = RelayConfig::parse_with_ignored("[serve\nport = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_relay_config_default() {
        let config = RelayConfig::default();
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.serve.port, 5280);
        assert_eq!(config.fetch.timeout, 90);
        assert!(config.rewrite.preserve_query);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_with_ignored_reports_unknown() {
        let (config, ignored) = RelayConfig::parse_with_ignored(
            "[serve]\nport = 9000\nwatch = true\n[site]\ntitle = \"x\"",
        )
        .unwrap();
        assert_eq!(config.serve.port, 9000);
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "serve.watch"));
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pagerelay.toml");
        fs::write(&path, "[fetch]\ntimeout = 30\n[serve]\npath = \"/r\"").unwrap();

        let config = RelayConfig::from_path(&path).unwrap();
        assert_eq!(config.fetch.timeout, 30);
        assert_eq!(config.serve.path, "/r");

        let err = RelayConfig::from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_absolute_config_with_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.toml");
        fs::write(&path, "[serve]\nport = 7000\ninterface = \"0.0.0.0\"").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let config = RelayConfig::load(&cli(&["-C", &path_str, "serve", "-p", "7100"])).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.serve.port, 7100);
        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.toml");
        fs::write(&path, "[serve]\npath = \"/\"").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let err = RelayConfig::load(&cli(&["-C", &path_str, "serve"])).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_fetch_args_override() {
        let mut config = RelayConfig::default();
        config.apply_command_options(&cli(&[
            "fetch",
            "http://a.com/",
            "--timeout",
            "5",
            "--mobile",
            "--proxy",
            "http://127.0.0.1:3128",
        ]));
        assert_eq!(config.fetch.timeout, 5);
        assert!(config.fetch.mobile);
        assert_eq!(config.fetch.proxy.as_deref(), Some("http://127.0.0.1:3128"));
    }

    #[test]
    fn test_normalize_preserve_query_override() {
        let mut config = RelayConfig::default();
        config.apply_command_options(&cli(&[
            "normalize",
            "a?b=1",
            "--base",
            "http://a.com/",
            "--preserve-query",
            "false",
        ]));
        assert!(!config.rewrite.preserve_query);
    }
}
