//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, PianoConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/pianola/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("pianola/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("pianola.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

pub(crate) fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Deserialize a merged table; missing keys fall back to compiled defaults.
pub(crate) fn from_table(table: toml::Table, path: &Path) -> Result<PianoConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`. Nested tables merge key by key, everything
/// else is replaced.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut PianoConfig, sources: &mut ConfigSources) {
    apply_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
pub fn apply_overrides_with<F>(config: &mut PianoConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("PIANOLA_HTTP_PORT") {
        if let Ok(port) = v.parse() {
            config.bind.http_port = port;
            sources.env_overrides.push("PIANOLA_HTTP_PORT".to_string());
        }
    }

    if let Some(v) = lookup("PIANOLA_LATENCY_MS") {
        if let Ok(ms) = v.parse() {
            config.service.latency_ms = ms;
            sources.env_overrides.push("PIANOLA_LATENCY_MS".to_string());
        }
    }

    if let Some(v) = lookup("PIANOLA_SERVER_URL") {
        config.client.server_url = v;
        sources.env_overrides.push("PIANOLA_SERVER_URL".to_string());
    }
    if let Some(v) = lookup("PIANOLA_TIMEOUT_MS") {
        if let Ok(ms) = v.parse() {
            config.client.timeout_ms = ms;
            sources.env_overrides.push("PIANOLA_TIMEOUT_MS".to_string());
        }
    }

    if let Some(v) = lookup("PIANOLA_TICK_MS") {
        if let Ok(ms) = v.parse::<u64>() {
            if ms > 0 {
                config.session.tick_ms = ms;
                sources.env_overrides.push("PIANOLA_TICK_MS".to_string());
            }
        }
    }

    if let Some(v) = lookup("PIANOLA_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = v;
        sources.env_overrides.push("PIANOLA_OTLP_ENDPOINT".to_string());
    }
    if let Some(v) = lookup("PIANOLA_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("PIANOLA_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over everything, as with any tracing-subscriber binary
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_merge_tables_nested() {
        let mut base = parse_table(
            "[bind]\nhttp_port = 1\n[service]\nlatency_ms = 5\n",
            Path::new("base"),
        )
        .unwrap();
        let overlay = parse_table("[service]\nlatency_ms = 0\n", Path::new("overlay")).unwrap();

        merge_tables(&mut base, overlay);
        let config = from_table(base, Path::new("merged")).unwrap();

        assert_eq!(config.bind.http_port, 1);
        assert_eq!(config.service.latency_ms, 0);
    }

    #[test]
    fn test_cli_path_replaces_local() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bind]\nhttp_port = 9123").unwrap();

        let files = discover_config_files_with_override(Some(file.path()));
        assert_eq!(files.last().map(PathBuf::as_path), Some(file.path()));

        let (config, sources) = PianoConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert!(sources.files.iter().any(|p| p == file.path()));
        // env may still override the port on a developer machine
        if !sources.env_overrides.iter().any(|k| k == "PIANOLA_HTTP_PORT") {
            assert_eq!(config.bind.http_port, 9123);
        }
    }

    #[test]
    fn test_load_table_missing_file() {
        let err = load_table(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PIANOLA_HTTP_PORT", "8181"),
            ("PIANOLA_LATENCY_MS", "0"),
            ("PIANOLA_SERVER_URL", "http://songs:8181/rpc"),
            ("PIANOLA_TICK_MS", "not-a-number"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = PianoConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides_with(&mut config, &mut sources, |k| {
            vars.get(k).map(|v| v.to_string())
        });

        assert_eq!(config.bind.http_port, 8181);
        assert_eq!(config.service.latency_ms, 0);
        assert_eq!(config.client.server_url, "http://songs:8181/rpc");
        assert_eq!(config.session.tick_ms, 1000);
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(!sources.env_overrides.contains(&"PIANOLA_TICK_MS".to_string()));
        assert_eq!(sources.env_overrides.len(), 4);
    }
}
