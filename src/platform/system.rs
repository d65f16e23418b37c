// Host uptime and load for the dashboard

use std::time::Duration;
use sysinfo::System;

use crate::error::{PoolwatchError, Result};

/// Seconds since boot.
pub fn system_uptime() -> Result<u64> {
    match System::uptime() {
        0 => Err(PoolwatchError::other("system uptime unavailable")),
        secs => Ok(secs),
    }
}

/// 1, 5 and 15 minute load averages.
pub fn load_average() -> Result<[f64; 3]> {
    if cfg!(windows) {
        return Err(PoolwatchError::other("load average not supported on this platform"));
    }
    let load = System::load_average();
    Ok([load.one, load.five, load.fifteen])
}

/// Human-readable duration, e.g. `3 days, 4:05:06` or `0:12:30`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    match days {
        0 => format!("{}:{:02}:{:02}", hours, minutes, seconds),
        1 => format!("1 day, {}:{:02}:{:02}", hours, minutes, seconds),
        n => format!("{} days, {}:{:02}:{:02}", n, hours, minutes, seconds),
    }
}
