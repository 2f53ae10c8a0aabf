#![deny(unsafe_code)]

//! Configuration loading and validation for blinkd.
//!
//! Loads TOML configuration files and validates them against expected
//! schemas. Provides the [`AppConfig`] type as the central configuration
//! structure shared by the daemon and the CLI. Every field has a default,
//! so an absent or empty config file yields a fully usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// GPIO line selection.
    #[serde(default)]
    pub gpio: GpioConfig,

    /// Control endpoint naming and socket placement.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Event loop timing.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which GPIO line drives the LED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpioConfig {
    /// GPIO chip name (e.g. "gpiochip0") or an absolute device path.
    #[serde(default = "default_chip")]
    pub chip: String,

    /// Line offset on the chip.
    #[serde(default = "default_line")]
    pub line: u32,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chip: default_chip(),
            line: default_line(),
        }
    }
}

fn default_chip() -> String {
    "gpiochip0".to_string()
}

fn default_line() -> u32 {
    13
}

/// Naming and transport configuration for the control endpoint.
///
/// The service and interface names parameterize the deployment artifacts;
/// the object path is the route the `set`/`get` operations are mounted at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Reverse-DNS service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Object path the control operations are served under.
    #[serde(default = "default_object_path")]
    pub object_path: String,

    /// Interface name, used in the access-policy artifact.
    #[serde(default = "default_interface_name")]
    pub interface_name: String,

    /// Unix socket path the endpoint binds. `None` uses the built-in default.
    #[serde(default)]
    pub socket_path: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            object_path: default_object_path(),
            interface_name: default_interface_name(),
            socket_path: None,
        }
    }
}

fn default_service_name() -> String {
    "org.blinkd.Indicator".to_string()
}

fn default_object_path() -> String {
    "/org/blinkd/Indicator".to_string()
}

fn default_interface_name() -> String {
    "org.blinkd.Indicator".to_string()
}

/// Event loop timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Poll timeout in milliseconds. Bounds worst-case blink latency and
    /// shutdown latency; must not exceed the blink interval.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Blink half-period in milliseconds.
    #[serde(default = "default_blink_interval_ms")]
    pub blink_interval_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            blink_interval_ms: default_blink_interval_ms(),
        }
    }
}

fn default_poll_timeout_ms() -> u64 {
    100
}

fn default_blink_interval_ms() -> u64 {
    500
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gpio.chip.is_empty() {
            return Err(ConfigError::Validation(
                "gpio.chip must not be empty".to_string(),
            ));
        }
        if self.daemon.poll_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "daemon.poll_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.daemon.blink_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "daemon.blink_interval_ms must be non-zero".to_string(),
            ));
        }
        // A poll timeout longer than the blink half-period would visibly
        // miss toggles.
        if self.daemon.poll_timeout_ms > self.daemon.blink_interval_ms {
            return Err(ConfigError::Validation(format!(
                "daemon.poll_timeout_ms ({}) must not exceed daemon.blink_interval_ms ({})",
                self.daemon.poll_timeout_ms, self.daemon.blink_interval_ms
            )));
        }
        if self.endpoint.service_name.is_empty() {
            return Err(ConfigError::Validation(
                "endpoint.service_name must not be empty".to_string(),
            ));
        }
        if self.endpoint.interface_name.is_empty() {
            return Err(ConfigError::Validation(
                "endpoint.interface_name must not be empty".to_string(),
            ));
        }
        if !self.endpoint.object_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "endpoint.object_path must start with '/', got {:?}",
                self.endpoint.object_path
            )));
        }
        if let Some(path) = &self.endpoint.socket_path {
            if path.is_empty() {
                return Err(ConfigError::Validation(
                    "endpoint.socket_path must not be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gpio.chip, "gpiochip0");
        assert_eq!(config.gpio.line, 13);
        assert_eq!(config.endpoint.service_name, "org.blinkd.Indicator");
        assert_eq!(config.endpoint.object_path, "/org/blinkd/Indicator");
        assert_eq!(config.daemon.poll_timeout_ms, 100);
        assert_eq!(config.daemon.blink_interval_ms, 500);
        assert_eq!(config.logging.level, "info");
        assert!(config.endpoint.socket_path.is_none());
    }

    #[test]
    fn test_default_config_validates() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = "";
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.gpio.line, 13);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [gpio]
            chip = "gpiochip2"
            line = 27

            [endpoint]
            service_name = "com.example.Led"
            object_path = "/com/example/Led"
            interface_name = "com.example.Led"
            socket_path = "/run/example-led.sock"

            [daemon]
            poll_timeout_ms = 50
            blink_interval_ms = 250

            [logging]
            level = "debug"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.gpio.chip, "gpiochip2");
        assert_eq!(config.gpio.line, 27);
        assert_eq!(config.endpoint.service_name, "com.example.Led");
        assert_eq!(
            config.endpoint.socket_path.as_deref(),
            Some("/run/example-led.sock")
        );
        assert_eq!(config.daemon.poll_timeout_ms, 50);
        assert_eq!(config.daemon.blink_interval_ms, 250);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_empty_chip() {
        let toml = r#"
            [gpio]
            chip = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_poll_timeout() {
        let toml = r#"
            [daemon]
            poll_timeout_ms = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_blink_interval() {
        let toml = r#"
            [daemon]
            blink_interval_ms = 0
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_poll_slower_than_blink() {
        let toml = r#"
            [daemon]
            poll_timeout_ms = 600
            blink_interval_ms = 500
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_poll_equal_to_blink_interval_is_allowed() {
        let toml = r#"
            [daemon]
            poll_timeout_ms = 500
            blink_interval_ms = 500
        "#;
        AppConfig::parse(toml).unwrap();
    }

    #[test]
    fn test_validation_rejects_relative_object_path() {
        let toml = r#"
            [endpoint]
            object_path = "org/blinkd/Indicator"
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_service_name() {
        let toml = r#"
            [endpoint]
            service_name = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_socket_path() {
        let toml = r#"
            [endpoint]
            socket_path = ""
        "#;
        assert!(AppConfig::parse(toml).is_err());
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blinkd.toml");
        tokio::fs::write(&path, b"[gpio]\nchip = \"gpiochip1\"\nline = 4\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.gpio.chip, "gpiochip1");
        assert_eq!(config.gpio.line, 4);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/blinkd.toml")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(result.is_err());
    }

    // ── Error display ─────────────────────────────────────────────────

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
