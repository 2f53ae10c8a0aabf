//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values
//! without repeating boilerplate across crate boundaries.

use blinkd_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .socket_path("/tmp/blinkd-test.sock")
///     .line(4)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn chip(mut self, chip: &str) -> Self {
        self.config.gpio.chip = chip.to_string();
        self
    }

    pub fn line(mut self, line: u32) -> Self {
        self.config.gpio.line = line;
        self
    }

    pub fn service_name(mut self, name: &str) -> Self {
        self.config.endpoint.service_name = name.to_string();
        self
    }

    pub fn object_path(mut self, path: &str) -> Self {
        self.config.endpoint.object_path = path.to_string();
        self
    }

    pub fn socket_path(mut self, path: &str) -> Self {
        self.config.endpoint.socket_path = Some(path.to_string());
        self
    }

    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.config.daemon.poll_timeout_ms = ms;
        self
    }

    pub fn blink_interval_ms(mut self, ms: u64) -> Self {
        self.config.daemon.blink_interval_ms = ms;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
