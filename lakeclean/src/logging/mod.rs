//! Progress logging.
//!
//! Pipeline progress goes through `tracing`; the CLI installs a formatting
//! subscriber on stderr. The `log_*` helpers mirror the status levels shown to
//! the operator and tag each event with a `status` field.

use tracing_subscriber::EnvFilter;

/// Status of a progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "lakeclean=debug"
    } else {
        "lakeclean=info"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log(level: LogLevel, message: impl AsRef<str>) {
    let message = message.as_ref();
    let status = level.as_str();
    match level {
        LogLevel::Info | LogLevel::Success => tracing::info!(status = status, "{}", message),
        LogLevel::Warning => tracing::warn!(status = status, "{}", message),
        LogLevel::Error => tracing::error!(status = status, "{}", message),
    }
}

pub fn log_info(msg: impl AsRef<str>) {
    log(LogLevel::Info, msg);
}

pub fn log_success(msg: impl AsRef<str>) {
    log(LogLevel::Success, msg);
}

pub fn log_warning(msg: impl AsRef<str>) {
    log(LogLevel::Warning, msg);
}

pub fn log_error(msg: impl AsRef<str>) {
    log(LogLevel::Error, msg);
}
