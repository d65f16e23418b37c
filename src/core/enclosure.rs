//! Enclosure bay map.
//!
//! Devices are labelled by bay, e.g. `1-12` for column one, slot twelve.
//! Every device of every pool is sorted into the two physical columns;
//! anything without a bay label is left out.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::pool::{flatten_devices, PoolState};

/// Supported chassis layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChassisModel {
    #[serde(rename = "45drives-15")]
    FortyFiveDrives15,
    #[serde(rename = "45drives-30")]
    FortyFiveDrives30,
    #[serde(rename = "45drives-45")]
    FortyFiveDrives45,
    #[serde(rename = "45drives-45l")]
    FortyFiveDrives45Lite,
    #[serde(rename = "45drives-60")]
    FortyFiveDrives60,
}

/// Physical column of a bay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayColumn {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BayDevice {
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnclosureView {
    pub chassis_enabled: bool,
    pub model: Option<ChassisModel>,
    pub drives1: Vec<BayDevice>,
    pub drives2: Vec<BayDevice>,
}

/// Column for a device name.
///
/// Accepted grammar: `1-<anything>` is column one, `2-<anything>` is
/// column two. Everything else has no bay.
pub fn bay_column(name: &str) -> Option<BayColumn> {
    if name.starts_with("1-") {
        Some(BayColumn::First)
    } else if name.starts_with("2-") {
        Some(BayColumn::Second)
    } else {
        None
    }
}

/// Bay order: first character of the name ascending, then state
/// descending. Devices equal on both keys keep their input order.
pub fn compare_bays(a: &BayDevice, b: &BayDevice) -> Ordering {
    let first = |d: &BayDevice| d.name.chars().next();
    first(a)
        .cmp(&first(b))
        .then_with(|| b.state.cmp(&a.state))
}

/// Split the devices of all pools into the two sorted bay columns.
pub fn group_bays(pools: &[PoolState]) -> (Vec<BayDevice>, Vec<BayDevice>) {
    let mut column1 = Vec::new();
    let mut column2 = Vec::new();

    for pool in pools {
        for flat in flatten_devices(&pool.devices) {
            let bay = BayDevice {
                name: flat.device.name.clone(),
                state: flat.device.state.clone(),
            };
            match bay_column(&bay.name) {
                Some(BayColumn::First) => column1.push(bay),
                Some(BayColumn::Second) => column2.push(bay),
                None => {}
            }
        }
    }

    column1.sort_by(compare_bays);
    column2.sort_by(compare_bays);
    (column1, column2)
}

pub fn build_enclosure_view(pools: &[PoolState], model: Option<ChassisModel>) -> EnclosureView {
    let (drives1, drives2) = group_bays(pools);
    EnclosureView {
        chassis_enabled: model.is_some(),
        model,
        drives1,
        drives2,
    }
}
