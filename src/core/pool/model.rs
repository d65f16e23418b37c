use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One pool as published by the poller. Replaced wholesale on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub see: String,
    #[serde(default)]
    pub scan: String,
    #[serde(default)]
    pub errors: String,
    #[serde(default)]
    pub devices: Vec<DeviceState>,
}

/// A device row of a pool. Identity is its position in `PoolState::devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub read: u64,
    #[serde(default)]
    pub write: u64,
    #[serde(default)]
    pub cksum: u64,
    #[serde(default)]
    pub rest: String,
    /// Index of the parent device in the same pool, `None` for a root.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Indices of the direct sub-devices (mirror/raidz members etc).
    #[serde(default)]
    pub sub_devices: Vec<usize>,
}

impl DeviceState {
    pub fn is_leaf(&self) -> bool {
        self.sub_devices.is_empty()
    }
}

/// Space accounting for one pool, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStat {
    pub avail: u64,
    pub used: u64,
}

/// Usage keyed by pool name. A missing entry means "unknown", not zero.
pub type UsageMap = HashMap<String, UsageStat>;

impl UsageStat {
    pub fn new(avail: u64, used: u64) -> Self {
        Self { avail, used }
    }

    pub fn total(&self) -> u64 {
        self.avail.saturating_add(self.used)
    }

    /// Available space as a rounded integer percentage of the total.
    /// An empty pool (total of zero) reports 0.
    pub fn avail_percent(&self) -> i64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.avail as f64 / total as f64 * 100.0).round() as i64
    }

    /// Used space percentage, the complement of [`avail_percent`](Self::avail_percent).
    pub fn used_percent(&self) -> i64 {
        if self.total() == 0 {
            return 0;
        }
        100 - self.avail_percent()
    }
}
