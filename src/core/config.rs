use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::enclosure::ChassisModel;
use super::severity::{Classifier, Severity, SeverityClassMap, StateClassMap, UsedSpaceThresholds};
use super::usage::DEFAULT_USAGE_COMMAND;
use crate::platform::locate::DEFAULT_SYSFS_ROOT;

/// Dashboard configuration, read once at startup.
///
/// Unknown keys and unknown severity names are load errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub main: MainConfig,
    pub www: WwwConfig,
    pub severity: SeverityConfig,
    pub leds: LedConfig,
    pub chassis: ChassisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MainConfig {
    /// Command listing dataset usage; the pool name is appended.
    pub usage_command: String,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            usage_command: DEFAULT_USAGE_COMMAND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WwwConfig {
    pub bind: SocketAddr,
    /// URL prefix all pages live under, e.g. `/zfs`. Empty for `/`.
    pub root: String,
    /// Number of entries kept by the logs page.
    pub log_buffer: usize,
    pub severity_class: SeverityClassMap,
    pub pool_state_class: StateClassMap,
    pub device_state_class: StateClassMap,
    pub used_space_class: SeverityClassMap,
}

impl Default for WwwConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8990)),
            root: String::new(),
            log_buffer: 1000,
            severity_class: [
                (Severity::Emerg, "text-danger"),
                (Severity::Alert, "text-danger"),
                (Severity::Crit, "text-danger"),
                (Severity::Err, "text-danger"),
                (Severity::Warning, "text-warning"),
                (Severity::Notice, "text-info"),
                (Severity::Debug, "muted"),
            ]
            .into_iter()
            .map(|(s, c)| (s, c.to_string()))
            .collect(),
            pool_state_class: [
                ("ONLINE", "text-success"),
                ("DEGRADED", "text-warning"),
                ("FAULTED", "text-danger"),
                ("OFFLINE", "text-danger"),
                ("UNAVAIL", "text-danger"),
                ("REMOVED", "text-danger"),
            ]
            .into_iter()
            .collect(),
            device_state_class: [
                ("ONLINE", "text-success"),
                ("AVAIL", "text-success"),
                ("INUSE", "text-info"),
                ("DEGRADED", "text-warning"),
                ("FAULTED", "text-danger"),
                ("OFFLINE", "text-danger"),
                ("UNAVAIL", "text-danger"),
                ("REMOVED", "text-danger"),
            ]
            .into_iter()
            .collect(),
            used_space_class: [
                (Severity::Warning, "progress-bar-warning"),
                (Severity::Err, "progress-bar-danger"),
                (Severity::Crit, "progress-bar-danger"),
            ]
            .into_iter()
            .map(|(s, c)| (s, c.to_string()))
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeverityConfig {
    /// Used-space percentage at which each severity starts.
    pub used_space: UsedSpaceThresholds,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            used_space: [(Severity::Warning, 80), (Severity::Err, 90), (Severity::Crit, 95)]
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedConfig {
    pub enable: bool,
    pub sysfs_root: PathBuf,
    /// Upper bound for all locate queries of one page.
    pub query_timeout_ms: u64,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            enable: false,
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            query_timeout_ms: 2000,
        }
    }
}

impl LedConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChassisConfig {
    pub model: Option<ChassisModel>,
}

impl Config {
    /// Load the config from `path`, or from the default location when no
    /// path is given. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !config_path.exists() {
            ensure!(!explicit, "Config file not found: {:?}", config_path);
            log::info!("No config at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("Invalid config file: {:?}", config_path))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(data).context("Failed to parse config")?;
        config.normalize()?;
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("poolwatch").join("config.toml"))
    }

    fn normalize(&mut self) -> Result<()> {
        let root = self.www.root.trim_end_matches('/');
        ensure!(
            root.is_empty() || root.starts_with('/'),
            "www.root must start with '/': {:?}",
            self.www.root
        );
        self.www.root = root.to_string();

        ensure!(
            !self.main.usage_command.trim().is_empty(),
            "main.usage_command must not be empty"
        );
        ensure!(self.leds.query_timeout_ms > 0, "leds.query_timeout_ms must be positive");
        Ok(())
    }

    /// Class maps for the view builders
    pub fn classifier(&self) -> Classifier {
        Classifier {
            pool_state: self.www.pool_state_class.clone(),
            device_state: self.www.device_state_class.clone(),
            used_space: self.www.used_space_class.clone(),
            log_severity: self.www.severity_class.clone(),
            used_space_thresholds: self.severity.used_space.clone(),
        }
    }
}
