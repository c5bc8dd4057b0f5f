//! Logging setup

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Directive string for the crate's own spans and events
    fn directive(self) -> String {
        format!("substrate_tests={}", self.to_tracing_level())
    }
}

/// Target of the per-case result lines, enabled at every log level
pub const CASE_LOG_TARGET: &str = "substrate_tests::cases";

fn directives(level: LogLevel, rust_log: Option<&str>) -> String {
    let base = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| level.directive());
    format!("{base},{CASE_LOG_TARGET}=info")
}

/// Filter for the given level; `RUST_LOG` replaces the level when set.
pub fn log_filter(level: LogLevel, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(directives(level, rust_log))
        .unwrap_or_else(|_| EnvFilter::new(directives(level, None)))
}

/// Initialize the logger with specified level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logger(level: LogLevel) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(level, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
