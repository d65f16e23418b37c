//! Pool state, device trees and the pool views built from them.

pub mod device_tree;
mod model;
pub mod view;

pub use device_tree::{device_depth, flatten_devices, indent_for_depth, FlatDevice, TreeDefect};
pub use model::{DeviceState, PoolState, UsageMap, UsageStat};
pub use view::{build_pool_view, DeviceView, PoolView, ViewContext, UNKNOWN};
