//! Enclosure locate LEDs through the Linux SES sysfs interface.
//!
//! Layout under the root (normally `/sys/class/enclosure`):
//!
//! ```text
//! <enclosure>/<slot>/locate              "0" or "1"
//! <enclosure>/<slot>/device/block/<dev>  present when <dev> sits in <slot>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::locate::LocateProvider;
use crate::error::{PoolwatchError, Result};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/enclosure";

/// Locate LEDs driven through enclosure sysfs attributes
#[derive(Debug, Clone)]
pub struct SysfsLocator {
    root: PathBuf,
}

impl SysfsLocator {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn subdirs(dir: &Path) -> Vec<PathBuf> {
        match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Slot directory holding `device`, searched across all enclosures.
    fn find_slot(&self, device: &str) -> Result<PathBuf> {
        if !self.root.is_dir() {
            return Err(PoolwatchError::locate(format!(
                "enclosure directory {} not found",
                self.root.display()
            )));
        }

        Self::subdirs(&self.root)
            .into_iter()
            .flat_map(|enclosure| Self::subdirs(&enclosure))
            .find(|slot| slot.join("device").join("block").join(device).exists())
            .ok_or_else(|| PoolwatchError::locate(format!("{} is not in any enclosure slot", device)))
    }
}

impl LocateProvider for SysfsLocator {
    fn query(&self, device: &str) -> Result<bool> {
        let locate = self.find_slot(device)?.join("locate");
        let value = fs::read_to_string(&locate)?;
        match value.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(PoolwatchError::locate(format!(
                "{}: unexpected value {:?}",
                locate.display(),
                other
            ))),
        }
    }

    fn set(&self, device: &str, on: bool) -> Result<()> {
        let locate = self.find_slot(device)?.join("locate");
        fs::write(&locate, if on { "1" } else { "0" })?;
        log::info!("locate LED for {} turned {}", device, if on { "on" } else { "off" });
        Ok(())
    }

    fn name(&self) -> &str {
        "sysfs"
    }
}
