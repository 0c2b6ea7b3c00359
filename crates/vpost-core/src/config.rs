use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::driver::DriverConfig;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per schedule (including the first).
    pub max_attempts: u32,
    /// Fixed delay in seconds between attempts.
    pub retry_delay_secs: u64,
    /// Settle delay in seconds before the first attempt (lets the browser start up).
    pub initial_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_secs: 20,
            initial_delay_secs: 3,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            initial_delay: Duration::from_secs(self.initial_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/vpost/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpostConfig {
    /// Poller period in seconds.
    pub poll_interval_secs: u64,
    /// Schedules created within this many seconds of "now" are uploaded
    /// immediately instead of waiting for the next poll tick.
    pub immediate_horizon_secs: u64,
    /// Capacity of the immediate-trigger queue; requests beyond it fall back
    /// to the poller.
    pub trigger_queue_capacity: usize,
    /// Directory imported videos are copied into (default: XDG data dir).
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
    /// Directory holding per-profile cookies files (default: XDG config dir).
    #[serde(default)]
    pub cookies_dir: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional upload-driver tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub driver: Option<DriverConfig>,
}

impl Default for VpostConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            immediate_horizon_secs: 120,
            trigger_queue_capacity: 16,
            library_dir: None,
            cookies_dir: None,
            retry: None,
            driver: None,
        }
    }
}

impl VpostConfig {
    /// Effective retry policy (config section or defaults).
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }

    /// Effective driver config (config section or defaults).
    pub fn driver_config(&self) -> DriverConfig {
        self.driver.clone().unwrap_or_default()
    }

    /// Directory imported videos live in.
    pub fn library_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.library_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vpost")?;
        Ok(xdg_dirs.get_data_home().join("videos"))
    }

    /// Directory per-profile cookies files live in.
    pub fn cookies_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cookies_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vpost")?;
        Ok(xdg_dirs.get_config_home().join("cookies"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vpost")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VpostConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VpostConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VpostConfig = toml::from_str(&data)?;
    Ok(cfg)
}
