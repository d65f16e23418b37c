//! Severity levels and presentation class lookup.
//!
//! Maps pool states, device states, used-space severities and log severities
//! to the CSS class names the renderer uses. Lookups are total: an unmapped
//! key resolves to the empty class.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PoolwatchError;

/// Notifier severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emerg => "emerg",
            Severity::Alert => "alert",
            Severity::Crit => "crit",
            Severity::Err => "err",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = PoolwatchError;

    fn from_str(s: &str) -> Result<Self, PoolwatchError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emerg" | "emergency" => Ok(Severity::Emerg),
            "alert" => Ok(Severity::Alert),
            "crit" | "critical" => Ok(Severity::Crit),
            "err" | "error" => Ok(Severity::Err),
            "warning" | "warn" => Ok(Severity::Warning),
            "notice" => Ok(Severity::Notice),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            other => Err(PoolwatchError::config(format!("unknown severity {:?}", other))),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = PoolwatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// Severity -> class lookup. Keys are validated when the config is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityClassMap(HashMap<Severity, String>);

impl SeverityClassMap {
    pub fn classify(&self, severity: Severity) -> &str {
        self.0.get(&severity).map(String::as_str).unwrap_or("")
    }

    /// Same as [`classify`](Self::classify) but tolerates "no severity".
    pub fn classify_opt(&self, severity: Option<Severity>) -> &str {
        severity.map(|s| self.classify(s)).unwrap_or("")
    }
}

impl FromIterator<(Severity, String)> for SeverityClassMap {
    fn from_iter<I: IntoIterator<Item = (Severity, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Free-form state string -> class lookup (pool and device states).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateClassMap(HashMap<String, String>);

impl StateClassMap {
    pub fn classify(&self, state: &str) -> &str {
        self.0.get(state).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StateClassMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Used-space percentage thresholds per severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedSpaceThresholds(HashMap<Severity, u32>);

impl UsedSpaceThresholds {
    /// Severity of the highest threshold reached by `percent`.
    ///
    /// When two severities share a threshold the more severe one wins.
    pub fn severity_for(&self, percent: i64) -> Option<Severity> {
        self.0
            .iter()
            .filter(|(_, threshold)| i64::from(**threshold) <= percent)
            .max_by(|(sa, ta), (sb, tb)| ta.cmp(tb).then_with(|| sb.cmp(sa)))
            .map(|(severity, _)| *severity)
    }
}

impl FromIterator<(Severity, u32)> for UsedSpaceThresholds {
    fn from_iter<I: IntoIterator<Item = (Severity, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The class maps loaded at startup. Each domain has its own map and
/// the domains are not interchangeable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classifier {
    pub pool_state: StateClassMap,
    pub device_state: StateClassMap,
    pub used_space: SeverityClassMap,
    pub log_severity: SeverityClassMap,
    pub used_space_thresholds: UsedSpaceThresholds,
}

impl Classifier {
    pub fn pool_state_class(&self, state: &str) -> &str {
        self.pool_state.classify(state)
    }

    pub fn device_state_class(&self, state: &str) -> &str {
        self.device_state.classify(state)
    }

    /// Class for a used-space percentage, via the threshold table.
    pub fn used_space_class(&self, used_percent: i64) -> &str {
        self.used_space
            .classify_opt(self.used_space_thresholds.severity_for(used_percent))
    }
}
