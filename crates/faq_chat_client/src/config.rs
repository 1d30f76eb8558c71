//! Client config load/save for `~/.faq-chat/config.yaml`.
//! Two sections: `api.*` (backend location and transport timeouts) and `chat.*`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default API root. The dev proxy serves the backend under `/api`.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FAQ_CHAT_CONFIG";

/// API section (base_url, request_timeout_secs, connect_timeout_secs).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl ApiSection {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}

/// Chat section (suggestion_count).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_count: Option<usize>,
}

impl ChatSection {
    pub fn suggestion_count(&self) -> usize {
        self.suggestion_count.unwrap_or(DEFAULT_SUGGESTION_COUNT)
    }
}

/// Full config file.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub chat: ChatSection,
}

/// Returns the default config file path: `~/.faq-chat/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".faq-chat").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Where the config comes from, and whether it has to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by `--config` or `FAQ_CHAT_CONFIG`; must exist.
    Explicit(PathBuf),
    /// The default path; a missing file means defaults.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Default(p) => p,
        }
    }
}

/// Resolve the config location: flag, then `FAQ_CHAT_CONFIG`, then the default path.
pub fn resolve_source(flag: Option<&Path>) -> Result<ConfigSource, ConfigError> {
    if let Some(p) = flag {
        return Ok(ConfigSource::Explicit(p.to_path_buf()));
    }
    if let Some(val) = std::env::var_os(CONFIG_ENV_VAR) {
        return Ok(ConfigSource::Explicit(PathBuf::from(val)));
    }
    default_config_path()
        .map(ConfigSource::Default)
        .ok_or(ConfigError::NoHomeDir)
}

/// Load the config for `source`, falling back to defaults when the default file is absent.
pub fn load_from(source: &ConfigSource) -> Result<Config, ConfigError> {
    match source {
        ConfigSource::Explicit(path) => load(path),
        ConfigSource::Default(path) if !path.exists() => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        ConfigSource::Default(path) => load(path),
    }
}

/// Load config from a YAML file. Path is typically `~/.faq-chat/config.yaml`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Config load/save error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unable to determine config path (set --config or FAQ_CHAT_CONFIG)")]
    NoHomeDir,
}
