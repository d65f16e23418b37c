// Poolwatch Library - Public API

// Re-export error types
pub mod error;
pub use error::{PoolwatchError, Result};

// Module declarations
pub mod core;
pub mod platform;
pub mod web;

// Re-export commonly used types
pub use core::config::Config;
pub use core::event_log::{EventLog, Notification};
pub use core::state_store::StateStore;
pub use web::AppState;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
