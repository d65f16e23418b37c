//! Render-ready pool views.
//!
//! Everything the renderer needs is resolved here: classes, usage
//! percentages, indents and per-device locate state.

use serde::Serialize;

use super::device_tree::flatten_devices;
use super::model::{PoolState, UsageMap};
use crate::core::locate::LocateProvider;
use crate::core::severity::Classifier;

/// Marker for usage figures that are not known.
pub const UNKNOWN: i64 = -1;

/// Inputs shared by every pool view built for one request.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub classifier: &'a Classifier,
    /// URL root prefix, passed through for link building.
    pub root: &'a str,
    /// `None` when locate LED integration is disabled.
    pub locate: Option<&'a dyn LocateProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceView {
    pub indent: usize,
    pub name: String,
    pub enable_led: bool,
    pub locate: bool,
    pub state: String,
    pub state_class: String,
    pub read: u64,
    pub write: u64,
    pub cksum: u64,
    pub rest: String,
    pub root: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolView {
    pub n: usize,
    pub name: String,
    pub state: String,
    pub state_class: String,
    pub status: String,
    pub action: String,
    pub see: String,
    pub scan: String,
    pub devices: Vec<DeviceView>,
    pub errors: String,
    pub used: i64,
    pub used_percent: i64,
    pub used_class: String,
    pub avail: i64,
    pub avail_percent: i64,
    pub total: i64,
    pub root: String,
}

fn bytes(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Build the view of one pool from a captured snapshot.
pub fn build_pool_view(pool: &PoolState, usage: &UsageMap, ctx: &ViewContext<'_>) -> PoolView {
    let classifier = ctx.classifier;
    let mut view = PoolView {
        name: pool.name.clone(),
        state: pool.state.clone(),
        state_class: classifier.pool_state_class(&pool.state).to_string(),
        status: pool.status.clone(),
        action: pool.action.clone(),
        see: pool.see.clone(),
        scan: pool.scan.clone(),
        errors: pool.errors.clone(),
        used: UNKNOWN,
        used_percent: UNKNOWN,
        avail: UNKNOWN,
        avail_percent: UNKNOWN,
        total: UNKNOWN,
        root: ctx.root.to_string(),
        ..Default::default()
    };

    if let Some(stat) = usage.get(&pool.name) {
        let used_percent = stat.used_percent();
        view.avail = bytes(stat.avail);
        view.avail_percent = stat.avail_percent();
        view.used = bytes(stat.used);
        view.used_percent = used_percent;
        view.total = bytes(stat.total());
        view.used_class = classifier.used_space_class(used_percent).to_string();
    }

    view.devices = flatten_devices(&pool.devices)
        .into_iter()
        .map(|flat| {
            let dev = flat.device;
            let mut devw = DeviceView {
                indent: flat.indent,
                name: dev.name.clone(),
                state: dev.state.clone(),
                state_class: classifier.device_state_class(&dev.state).to_string(),
                read: dev.read,
                write: dev.write,
                cksum: dev.cksum,
                rest: dev.rest.clone(),
                root: ctx.root.to_string(),
                ..Default::default()
            };

            if let Some(locate) = ctx.locate.filter(|_| dev.is_leaf()) {
                match locate.query(&dev.name) {
                    Ok(lit) => {
                        devw.enable_led = true;
                        devw.locate = lit;
                    }
                    Err(e) => {
                        log::debug!("{}: no locate control for {}: {}", locate.name(), dev.name, e);
                    }
                }
            }
            devw
        })
        .collect();

    view
}
