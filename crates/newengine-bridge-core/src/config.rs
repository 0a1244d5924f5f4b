use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::negotiate::SurfaceProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Period of the device disconnect sweep.
    #[serde(default = "default_sweep_period_ms")]
    pub sweep_period_ms: u64,

    /// Idle time after which a device is re-checked for presence.
    #[serde(default = "default_staleness_threshold_ms")]
    pub staleness_threshold_ms: u64,

    #[serde(default = "default_notification_pool_capacity")]
    pub notification_pool_capacity: usize,

    #[serde(default)]
    pub surface: SurfaceProfile,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// env_logger filter directives, e.g. `info,newengine_bridge=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_sweep_period_ms() -> u64 {
    3000
}
fn default_staleness_threshold_ms() -> u64 {
    3000
}
fn default_notification_pool_capacity() -> usize {
    64
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sweep_period_ms: default_sweep_period_ms(),
            staleness_threshold_ms: default_staleness_threshold_ms(),
            notification_pool_capacity: default_notification_pool_capacity(),
            surface: SurfaceProfile::default(),
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    #[inline]
    pub fn sweep_period(&self) -> Duration {
        Duration::from_millis(self.sweep_period_ms)
    }

    #[inline]
    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_millis(self.staleness_threshold_ms)
    }

    /// Missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
