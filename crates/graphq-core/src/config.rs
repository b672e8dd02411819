use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchRerunPolicy;
use crate::connection::HttpOptions;
use crate::retry::RetryPolicy;

/// Environment variable that overrides `password` from the config file.
pub const PASSWORD_ENV: &str = "GRAPHQ_PASSWORD";

/// Per-query retry parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per query (including the first).
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff when the server
    /// does not advise a wait.
    pub base_delay_ms: u64,
    /// Maximum computed backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Optional cap on total waiting per query, in milliseconds.
    #[serde(default)]
    pub max_total_wait_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 9,
            base_delay_ms: 250,
            max_delay_ms: 30_000,
            max_total_wait_ms: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_total_wait: self.max_total_wait_ms.map(Duration::from_millis),
        }
    }
}

/// Whole-batch rerun parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerunConfig {
    /// Total runs allowed for a batch, the first included.
    pub max_runs: u32,
    /// Seconds to wait between an aborted run and the next.
    pub delay_secs: u64,
}

impl Default for RerunConfig {
    fn default() -> Self {
        Self {
            max_runs: 1,
            delay_secs: 60,
        }
    }
}

impl RerunConfig {
    pub fn to_policy(&self) -> BatchRerunPolicy {
        BatchRerunPolicy {
            max_runs: self.max_runs.max(1),
            delay: Duration::from_secs(self.delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/graphq/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqConfig {
    /// Gremlin HTTP endpoint.
    pub endpoint: String,
    /// Optional user name for basic auth.
    #[serde(default)]
    pub username: Option<String>,
    /// Optional password; `GRAPHQ_PASSWORD` takes precedence.
    #[serde(default)]
    pub password: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional batch rerun policy; if missing, a batch runs once.
    #[serde(default)]
    pub rerun: Option<RerunConfig>,
}

impl Default for GraphqConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8182/gremlin".to_string(),
            username: None,
            password: None,
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            retry: None,
            rerun: None,
        }
    }
}

impl GraphqConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn rerun_policy(&self) -> BatchRerunPolicy {
        self.rerun.clone().unwrap_or_default().to_policy()
    }

    /// Connection settings, with the password taken from `GRAPHQ_PASSWORD`
    /// when that is set.
    pub fn http_options(&self) -> HttpOptions {
        let password = std::env::var(PASSWORD_ENV)
            .ok()
            .or_else(|| self.password.clone());
        HttpOptions {
            endpoint: self.endpoint.clone(),
            username: self.username.clone(),
            password,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("graphq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GraphqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GraphqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<GraphqConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: GraphqConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
