//! Logging system for pressdock.
//!
//! Structured diagnostics go through `tracing`; operator progress lines are
//! printed by [`crate::term`].

use pressdock_types::config::{LogConfig, LogFormat};
use pressdock_types::{LogLevel, PressdockError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, otherwise `warn` globally and
/// `level` for pressdock's own crates.
pub fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pressdock={}", level.as_directive())))
}

/// Initialize logging from configuration.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = filter_for(config.level);
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| PressdockError::Other(format!("Failed to initialize logging: {}", e)))
}
