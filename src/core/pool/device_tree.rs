//! Device tree flattening.
//!
//! A pool's devices arrive as a flat list where each entry points at its
//! parent by index. The display order is the list order; flattening only
//! annotates each device with an indent derived from its depth.

use std::fmt;

use super::model::DeviceState;

/// A device annotated with its display indent.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDevice<'a> {
    pub index: usize,
    pub device: &'a DeviceState,
    pub indent: usize,
}

/// Inconsistent parent links found while walking up from a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDefect {
    /// The parent chain never reaches a root.
    Cycle { start: usize },
    /// A parent index points outside the device list.
    DanglingParent { device: usize, parent: usize },
    /// The starting index itself is outside the device list.
    OutOfRange { index: usize },
}

impl fmt::Display for TreeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeDefect::Cycle { start } => {
                write!(f, "parent chain of device {} does not reach a root", start)
            }
            TreeDefect::DanglingParent { device, parent } => {
                write!(f, "device {} refers to missing parent {}", device, parent)
            }
            TreeDefect::OutOfRange { index } => write!(f, "no device at index {}", index),
        }
    }
}

/// Number of ancestors between `index` and its root.
///
/// A chain longer than the device list can only be a cycle, so the walk
/// is bounded by `devices.len()` steps.
pub fn device_depth(devices: &[DeviceState], index: usize) -> Result<usize, TreeDefect> {
    let mut depth = 0;
    let mut current_index = index;
    let mut current = devices
        .get(index)
        .ok_or(TreeDefect::OutOfRange { index })?;

    while let Some(parent) = current.parent {
        current = devices.get(parent).ok_or(TreeDefect::DanglingParent {
            device: current_index,
            parent,
        })?;
        depth += 1;
        if depth > devices.len() {
            return Err(TreeDefect::Cycle { start: index });
        }
        current_index = parent;
    }

    Ok(depth)
}

/// Display indent for a device at `depth`.
pub fn indent_for_depth(depth: usize) -> usize {
    1 + 2 * depth
}

/// Flatten a pool's devices into display order with indents.
///
/// A device whose parent chain is broken is shown at root level and the
/// defect is logged; the rest of the list is unaffected.
pub fn flatten_devices(devices: &[DeviceState]) -> Vec<FlatDevice<'_>> {
    devices
        .iter()
        .enumerate()
        .map(|(index, device)| {
            let depth = device_depth(devices, index).unwrap_or_else(|defect| {
                log::warn!("device {:?}: {}", device.name, defect);
                0
            });
            FlatDevice {
                index,
                device,
                indent: indent_for_depth(depth),
            }
        })
        .collect()
}
