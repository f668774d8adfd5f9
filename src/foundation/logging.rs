//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging at an explicit level, ignoring the environment.
///
/// Used by hosts that configure the level from [`crate::EngineConfig`]
/// instead of `RUST_LOG`.
pub fn init_with_level(level: log::LevelFilter) {
    env_logger::Builder::new().filter_level(level).init();
}
