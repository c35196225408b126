//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the harness, supporting:
//! - Environment variables for the target, driver, timing and credentials
//! - Defaults matching the public demo bank deployment
//! - Builder-style overrides for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BANK_UI_BASE_URL` | Root URL of the banking application | `https://parabank.parasoft.com/parabank/` |
//! | `BANK_UI_WEBDRIVER_URL` | WebDriver endpoint | `http://localhost:9515` |
//! | `BANK_UI_BROWSER` | Browser name sent in capabilities | `chrome` |
//! | `BANK_UI_HEADLESS` | Run the browser headless | `false` |
//! | `BANK_UI_TIMEOUT` | Default wait timeout in seconds | `20` |
//! | `BANK_UI_POLL_INTERVAL` | Readiness poll interval in milliseconds | `250` |
//! | `BANK_UI_ARTIFACT_DIR` | Base directory for screenshot runs | `./artifacts` |
//! | `BANK_UI_USERNAME` | Username of the pre-provisioned customer | `john` |
//! | `BANK_UI_PASSWORD` | Password of the pre-provisioned customer | `demo` |
//!
//! # Example
//!
//! ```bash
//! # Drive a local deployment through geckodriver
//! export BANK_UI_BASE_URL="http://localhost:8080/parabank/"
//! export BANK_UI_WEBDRIVER_URL="http://localhost:4444"
//! export BANK_UI_BROWSER="firefox"
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Default application root
pub const DEFAULT_BASE_URL: &str = "https://parabank.parasoft.com/parabank/";

/// Default WebDriver endpoint (chromedriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Default browser name
pub const DEFAULT_BROWSER: &str = "chrome";

/// Default wait timeout (seconds)
pub const DEFAULT_WAIT_TIMEOUT: u64 = 20;

/// Default readiness poll interval (milliseconds)
pub const DEFAULT_POLL_INTERVAL: u64 = 250;

/// Default artifact base directory
pub const DEFAULT_ARTIFACT_DIR: &str = "./artifacts";

/// Default username
pub const DEFAULT_USERNAME: &str = "john";

/// Default password
pub const DEFAULT_PASSWORD: &str = "demo";

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_BASE_URL: &str = "BANK_UI_BASE_URL";
pub const ENV_WEBDRIVER_URL: &str = "BANK_UI_WEBDRIVER_URL";
pub const ENV_BROWSER: &str = "BANK_UI_BROWSER";
pub const ENV_HEADLESS: &str = "BANK_UI_HEADLESS";
pub const ENV_WAIT_TIMEOUT: &str = "BANK_UI_TIMEOUT";
pub const ENV_POLL_INTERVAL: &str = "BANK_UI_POLL_INTERVAL";
pub const ENV_ARTIFACT_DIR: &str = "BANK_UI_ARTIFACT_DIR";
pub const ENV_USERNAME: &str = "BANK_UI_USERNAME";
pub const ENV_PASSWORD: &str = "BANK_UI_PASSWORD";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for a harness run
#[derive(Debug, Clone)]
pub struct Config {
    /// Target application settings
    pub target: TargetSettings,
    /// WebDriver settings
    pub driver: DriverSettings,
    /// Wait engine timing
    pub timing: TimingSettings,
    /// Artifact output settings
    pub artifacts: ArtifactSettings,
}

/// Target application settings
#[derive(Debug, Clone)]
pub struct TargetSettings {
    /// Application root, always ending in `/`
    pub base_url: String,
    /// Username of the pre-provisioned customer
    pub username: String,
    /// Password of the pre-provisioned customer
    pub password: String,
}

/// WebDriver settings
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// WebDriver endpoint URL
    pub endpoint: String,
    /// Browser name for the capabilities request
    pub browser: String,
    /// Whether to request a headless browser
    pub headless: bool,
}

/// Wait engine timing
#[derive(Debug, Clone, Copy)]
pub struct TimingSettings {
    /// Default wait timeout (seconds)
    pub wait_timeout: u64,
    /// Poll interval (milliseconds)
    pub poll_interval: u64,
}

/// Artifact output settings
#[derive(Debug, Clone)]
pub struct ArtifactSettings {
    /// Base directory for run directories
    pub base_dir: PathBuf,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            target: TargetSettings::from_env(),
            driver: DriverSettings::from_env(),
            timing: TimingSettings::from_env(),
            artifacts: ArtifactSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            target: TargetSettings::defaults(),
            driver: DriverSettings::defaults(),
            timing: TimingSettings::defaults(),
            artifacts: ArtifactSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TargetSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: normalize_base_url(
                &env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ),
            username: env::var(ENV_USERNAME).unwrap_or_else(|_| DEFAULT_USERNAME.to_string()),
            password: env::var(ENV_PASSWORD).unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }

    /// Override the application root
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }
}

impl DriverSettings {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var(ENV_WEBDRIVER_URL)
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
            browser: env::var(ENV_BROWSER).unwrap_or_else(|_| DEFAULT_BROWSER.to_string()),
            headless: env::var(ENV_HEADLESS)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),
        }
    }

    pub fn defaults() -> Self {
        Self {
            endpoint: DEFAULT_WEBDRIVER_URL.to_string(),
            browser: DEFAULT_BROWSER.to_string(),
            headless: false,
        }
    }
}

impl TimingSettings {
    pub fn from_env() -> Self {
        Self {
            wait_timeout: env::var(ENV_WAIT_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WAIT_TIMEOUT),
            poll_interval: env::var(ENV_POLL_INTERVAL)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }

    pub fn defaults() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Default wait timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout)
    }

    /// Poll interval as a `Duration`
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

impl ArtifactSettings {
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var(ENV_ARTIFACT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Ensure the base URL ends with a slash so relative pages join cleanly
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

/// Parse common boolean spellings used in environment variables
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the configured base URL (convenience function)
pub fn base_url() -> String {
    get().target.base_url.clone()
}

/// Get the configured artifact directory (convenience function)
pub fn artifact_dir() -> PathBuf {
    get().artifacts.base_dir.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://host/app"), "http://host/app/");
        assert_eq!(normalize_base_url("http://host/app/"), "http://host/app/");
        assert_eq!(normalize_base_url("  http://host/ "), "http://host/");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert_eq!(config.target.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.target.username, DEFAULT_USERNAME);
        assert_eq!(config.driver.endpoint, DEFAULT_WEBDRIVER_URL);
        assert_eq!(config.timing.timeout(), Duration::from_secs(20));
        assert!(!config.driver.headless);
    }

    #[test]
    fn test_base_url_override() {
        let target = TargetSettings::defaults().base_url("http://localhost:8080/parabank");
        assert_eq!(target.base_url, "http://localhost:8080/parabank/");
    }
}
