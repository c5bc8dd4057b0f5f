//! Utilities
//!
//! Logging setup and timing helpers.

mod logger;
mod timer;

pub use logger::{init_logger, log_filter, LogLevel, CASE_LOG_TARGET};
pub use timer::Timer;
