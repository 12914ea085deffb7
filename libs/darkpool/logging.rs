//! Logging initialization

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()))
}

/// Initialize tracing to stdout, optionally mirrored to a file
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(level: &str, log_file: Option<&str>) -> std::io::Result<()> {
    let stdout = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false);

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(stdout)
        .with(file)
        .try_init();

    Ok(())
}
