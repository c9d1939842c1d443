//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Network bind settings for the songbook server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindConfig {
    /// HTTP port for the JSON-RPC and health endpoints.
    /// Default: 4000
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_http_port() -> u16 {
        4000
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            http_port: Self::default_http_port(),
        }
    }
}

/// Song service behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Artificial delay added to `songs` and `addSong` so clients can show
    /// a loading state.
    /// Default: 2000
    #[serde(default = "ServiceConfig::default_latency_ms")]
    pub latency_ms: u64,
}

impl ServiceConfig {
    fn default_latency_ms() -> u64 {
        2000
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            latency_ms: Self::default_latency_ms(),
        }
    }
}

/// How the recorder reaches the song service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the songbook server.
    /// Default: http://127.0.0.1:4000/rpc
    #[serde(default = "ClientConfig::default_server_url")]
    pub server_url: String,

    /// HTTP request timeout in milliseconds.
    /// Must exceed the service latency.
    /// Default: 30000
    #[serde(default = "ClientConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClientConfig {
    fn default_server_url() -> String {
        "http://127.0.0.1:4000/rpc".to_string()
    }

    fn default_timeout_ms() -> u64 {
        30_000
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: Self::default_server_url(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Recording session defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Period of the elapsed-time clock while recording.
    /// Default: 1000
    #[serde(default = "SessionConfig::default_tick_ms")]
    pub tick_ms: u64,

    /// Title given to new recordings.
    /// Default: "untitled"
    #[serde(default = "SessionConfig::default_title")]
    pub default_title: String,
}

impl SessionConfig {
    fn default_tick_ms() -> u64 {
        1000
    }

    fn default_title() -> String {
        "untitled".to_string()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: Self::default_tick_ms(),
            default_title: Self::default_title(),
        }
    }
}

/// Logging and trace export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint. Empty disables trace export.
    /// Default: ""
    #[serde(default)]
    pub otlp_endpoint: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: String::new(),
        }
    }
}
