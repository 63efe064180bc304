//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (GRANOLA_MCP_*)
//! 2. TOML config file (if GRANOLA_MCP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which backend serves the document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Desktop application's pre-synced cache file.
    #[default]
    Local,
    /// Remote paginated HTTP API.
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Remote => "remote",
        }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GRANOLA_MCP_*)
/// 2. TOML config file (if GRANOLA_MCP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend selection, `local` or `remote`.
    ///
    /// Set via GRANOLA_MCP_SOURCE environment variable.
    #[serde(default)]
    pub source: SourceKind,

    /// Path to the desktop application's cache file.
    ///
    /// Set via GRANOLA_MCP_LOCAL_PATH environment variable.
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// Bearer token for the remote API.
    ///
    /// Set via GRANOLA_MCP_API_TOKEN environment variable.
    /// Required only when `source = "remote"`.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Remote API base address.
    ///
    /// Set via GRANOLA_MCP_API_BASE environment variable.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Directory holding one file per cached remote page.
    ///
    /// Set via GRANOLA_MCP_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Freshness window for cached pages, in seconds.
    ///
    /// Set via GRANOLA_MCP_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-attempt HTTP timeout in milliseconds.
    ///
    /// Set via GRANOLA_MCP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Documents requested per remote page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Attempts per remote page before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds; doubles on each retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// User-Agent sent to the remote API.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Value of the X-Client-Version identification header.
    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Ask the remote API to include last-viewed panel content.
    #[serde(default = "default_true")]
    pub include_last_viewed_panel: bool,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_local_path() -> PathBuf {
    home_dir().join("Library/Application Support/Granola/cache-v3.json")
}

fn default_api_base() -> String {
    "https://api.granola.ai".into()
}

fn default_cache_dir() -> PathBuf {
    home_dir().join(".granola/remote_cache")
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_page_size() -> u32 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_user_agent() -> String {
    "Granola/5.354.0".into()
}

fn default_client_version() -> String {
    "5.354.0".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Local,
            local_path: default_local_path(),
            api_token: None,
            api_base: default_api_base(),
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_ms: default_timeout_ms(),
            page_size: default_page_size(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            user_agent: default_user_agent(),
            client_version: default_client_version(),
            include_last_viewed_panel: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// First retry delay as Duration.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GRANOLA_MCP_`
    /// 2. TOML file from `GRANOLA_MCP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GRANOLA_MCP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GRANOLA_MCP_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Fetch the API token (deferred validation, only the remote source needs it).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is unset or blank.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "api_token".into(),
                hint: "Set GRANOLA_MCP_API_TOKEN environment variable".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source, SourceKind::Local);
        assert!(config.local_path.ends_with("Granola/cache-v3.json"));
        assert!(config.cache_dir.ends_with(".granola/remote_cache"));
        assert_eq!(config.api_base, "https://api.granola.ai");
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_attempts, 3);
        assert!(config.include_last_viewed_panel);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_default_paths_live_under_home() {
        let Some(home) = dirs::home_dir() else { return };
        let config = AppConfig::default();
        assert!(config.local_path.starts_with(&home));
        assert!(config.cache_dir.starts_with(&home));
        assert_eq!(config.cache_dir, home.join(".granola/remote_cache"));
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(15_000));
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
    }

    #[test]
    fn test_require_api_token_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_api_token(), Err(ConfigError::Missing { .. })));

        let blank = AppConfig { api_token: Some("  ".into()), ..Default::default() };
        assert!(matches!(blank.require_api_token(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_api_token_present() {
        let config = AppConfig { api_token: Some("test-token".into()), ..Default::default() };
        assert_eq!(config.require_api_token().unwrap(), "test-token");
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GRANOLA_MCP_SOURCE", "remote");
            jail.set_env("GRANOLA_MCP_API_TOKEN", "tok");
            jail.set_env("GRANOLA_MCP_CACHE_TTL_SECS", "60");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.source, SourceKind::Remote);
            assert_eq!(config.api_token.as_deref(), Some("tok"));
            assert_eq!(config.cache_ttl_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("granola.toml", "page_size = 50\ncache_ttl_secs = 10\n")?;
            jail.set_env("GRANOLA_MCP_CONFIG_FILE", "granola.toml");
            jail.set_env("GRANOLA_MCP_CACHE_TTL_SECS", "20");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.page_size, 50);
            assert_eq!(config.cache_ttl_secs, 20);
            Ok(())
        });
    }
}
