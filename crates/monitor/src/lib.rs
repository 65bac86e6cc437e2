//! Drowsiness Monitor
//!
//! Frame driver for the DMS core: feeds detector output into a `DmsModule`,
//! renders per-frame status, and hands alert edges to the alarm dispatcher.

pub mod cli;
pub mod driver;
pub mod overlay;
pub mod settings;

pub use cli::CliArgs;
pub use driver::{run, RunSummary};
pub use settings::{LogFormat, OutputMode, Settings, SinkKind};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dms(#[from] dms::DmsError),

    #[error(transparent)]
    Alarm(#[from] alerting::AlarmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging already initialised")]
    Logging,
}

/// Initialize logging
///
/// Logs go to stderr so stdout carries only frame output. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging(format: LogFormat) -> Result<(), MonitorError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.map_err(|_| MonitorError::Logging)
}
