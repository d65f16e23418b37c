// Platform-specific code module

pub mod locate;
pub mod system;

// Re-exports for cleaner imports
pub use locate::SysfsLocator;
pub use system::{format_duration, load_average, system_uptime};
