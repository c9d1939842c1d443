//! Configuration loading for pianola.
//!
//! Shared by the `songbook` server and the `keyroll` recorder so both agree
//! on ports, latency and timing defaults.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/pianola/config.toml` (system)
//! 2. `~/.config/pianola/config.toml` (user)
//! 3. `./pianola.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`PIANOLA_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [bind]
//! http_port = 4000
//!
//! [service]
//! latency_ms = 2000
//!
//! [client]
//! server_url = "http://127.0.0.1:4000/rpc"
//! timeout_ms = 30000
//!
//! [session]
//! tick_ms = 1000
//! default_title = "untitled"
//!
//! [telemetry]
//! log_level = "info"
//! otlp_endpoint = ""
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{BindConfig, ClientConfig, ServiceConfig, SessionConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete pianola configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PianoConfig {
    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl PianoConfig {
    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` replace the local override.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and env vars contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config = loader::from_table(merged, Path::new("<merged>"))?;
        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Parse a single TOML document on top of the compiled defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let path = Path::new("<string>");
        let table = loader::parse_table(contents, path)?;
        loader::from_table(table, path)
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# pianola configuration\n\n");

        output.push_str("[bind]\n");
        output.push_str(&format!("http_port = {}\n", self.bind.http_port));

        output.push_str("\n[service]\n");
        output.push_str(&format!("latency_ms = {}\n", self.service.latency_ms));

        output.push_str("\n[client]\n");
        output.push_str(&format!("server_url = \"{}\"\n", self.client.server_url));
        output.push_str(&format!("timeout_ms = {}\n", self.client.timeout_ms));

        output.push_str("\n[session]\n");
        output.push_str(&format!("tick_ms = {}\n", self.session.tick_ms));
        output.push_str(&format!(
            "default_title = \"{}\"\n",
            self.session.default_title
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));
        output.push_str(&format!(
            "otlp_endpoint = \"{}\"\n",
            self.telemetry.otlp_endpoint
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PianoConfig::default();
        assert_eq!(config.bind.http_port, 4000);
        assert_eq!(config.service.latency_ms, 2000);
        assert_eq!(config.session.tick_ms, 1000);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = PianoConfig::default();
        config.bind.http_port = 9100;
        config.session.default_title = "etude".to_string();

        let toml = config.to_toml();
        assert!(toml.contains("[bind]"));
        assert!(toml.contains("[session]"));

        let parsed = PianoConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = PianoConfig::from_toml_str("[service]\nlatency_ms = 0\n").unwrap();
        assert_eq!(config.service.latency_ms, 0);
        assert_eq!(config.bind.http_port, 4000);
    }

    #[test]
    fn test_from_toml_str_rejects_garbage() {
        let err = PianoConfig::from_toml_str("[bind\nhttp_port = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
