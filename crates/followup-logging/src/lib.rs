//! # followup-logging
//!
//! Logging for the followup interview loop.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! Diagnostics go through `tracing`; [`init_tracing`] installs the
//! subscriber, optionally mirroring everything to a JSON log file.

mod events;

pub use events::{LogEvent, LogFormat, Logger};

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application.
///
/// `RUST_LOG` overrides `level`. Keep the returned guard alive for as long
/// as the log file should be written.
pub fn init_tracing(
    level: &str,
    format: LogFormat,
    log_file: Option<&Path>,
) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "log file path has no file name")
            })?;
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(fmt::layer().with_target(false).with_writer(io::stderr))
                .init();
        }
    }

    Ok(guard)
}
