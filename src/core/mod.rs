// Core business logic module

pub mod config;
pub mod enclosure;
pub mod event_log;
pub mod locate;
pub mod pool;
pub mod severity;
pub mod state_store;
pub mod usage;
pub mod validation;

// Re-export commonly used items
pub use config::Config;
pub use enclosure::{build_enclosure_view, group_bays, BayDevice, ChassisModel, EnclosureView};
pub use event_log::{EventLog, LogEntry, Notification, NotificationKind};
pub use locate::LocateProvider;
pub use pool::{DeviceState, PoolState, PoolView, UsageMap, UsageStat};
pub use severity::{Classifier, Severity};
pub use state_store::{MonitorSnapshot, StateStore};
