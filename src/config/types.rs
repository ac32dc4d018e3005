//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Line, outbox and mailbox limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Built-in configuration listening on `0.0.0.0:port`.
    ///
    /// Used by `slchatd --port N`. The metrics endpoint stays off unless a
    /// config file asks for it.
    pub fn with_port(port: u16) -> Self {
        Self {
            server: ServerConfig {
                metrics_port: Some(0),
                ..ServerConfig::default()
            },
            listen: ListenConfig::any(port),
            limits: LimitsConfig::default(),
        }
    }

    /// Replace the port of `listen.address`, keeping its IP.
    pub fn override_port(&mut self, port: u16) {
        self.listen.address.set_port(port);
    }

    /// Port for the Prometheus endpoint, `None` when disabled.
    pub fn metrics_port(&self) -> Option<u16> {
        match self.server.metrics_port.unwrap_or(DEFAULT_METRICS_PORT) {
            0 => None,
            port => Some(port),
        }
    }
}

/// Metrics port used when `server.metrics_port` is absent.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name used in logs (e.g., "chat.local").
    pub name: String,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    pub metrics_port: Option<u16>,
    /// Idle timeout configuration for ping keepalive.
    #[serde(default)]
    pub idle_timeouts: IdleTimeoutsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "slchatd".to_string(),
            metrics_port: None,
            idle_timeouts: IdleTimeoutsConfig::default(),
        }
    }
}

/// Idle timeout configuration for client connection keepalive.
///
/// The server sends a `ping` after `ping` seconds without traffic from the
/// client. If nothing arrives within `timeout` further seconds the session is
/// closed with "Ping timeout", which the liveness monitor turns into a
/// departure.
#[derive(Debug, Clone, Deserialize)]
pub struct IdleTimeoutsConfig {
    /// Seconds of idle before sending ping to client (default: 90).
    #[serde(default = "default_ping_interval")]
    pub ping: u64,

    /// Seconds to wait for any traffic after a ping before disconnect (default: 120).
    /// Total idle time before disconnect = ping + timeout.
    #[serde(default = "default_ping_timeout")]
    pub timeout: u64,
}

impl Default for IdleTimeoutsConfig {
    fn default() -> Self {
        Self {
            ping: default_ping_interval(),
            timeout: default_ping_timeout(),
        }
    }
}

fn default_ping_interval() -> u64 {
    90
}

fn default_ping_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
[server]
name = "chat.local"
metrics_port = 9191

[server.idle_timeouts]
ping = 30
timeout = 45

[listen]
address = "127.0.0.1:5000"

[limits]
max_line_len = 1024
sendq = 16
mailbox = 256
"#;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.name, "chat.local");
        assert_eq!(config.metrics_port(), Some(9191));
        assert_eq!(config.server.idle_timeouts.ping, 30);
        assert_eq!(config.server.idle_timeouts.timeout, 45);
        assert_eq!(config.listen.address.to_string(), "127.0.0.1:5000");
        assert_eq!(config.limits.max_line_len, 1024);
        assert_eq!(config.limits.sendq, 16);
        assert_eq!(config.limits.mailbox, 256);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
name = "chat.local"

[listen]
address = "0.0.0.0:4242"
"#,
        )
        .unwrap();
        assert_eq!(config.metrics_port(), Some(DEFAULT_METRICS_PORT));
        assert_eq!(config.server.idle_timeouts.ping, 90);
        assert_eq!(config.server.idle_timeouts.timeout, 120);
        assert_eq!(config.limits.sendq, 64);
    }

    #[test]
    fn test_metrics_port_zero_disables() {
        let mut config = Config::with_port(4242);
        assert_eq!(config.metrics_port(), None);
        config.server.metrics_port = Some(0);
        assert_eq!(config.metrics_port(), None);
    }

    #[test]
    fn test_with_port_and_override() {
        let config = Config::with_port(7000);
        assert_eq!(config.listen.address.to_string(), "0.0.0.0:7000");

        let mut loaded: Config = toml::from_str(FULL).unwrap();
        loaded.override_port(6000);
        assert_eq!(loaded.listen.address.to_string(), "127.0.0.1:6000");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server\nname = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
