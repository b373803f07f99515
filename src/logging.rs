use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Filter used by [`init`]. `RUST_LOG` is only honoured when debug logging
/// is enabled so a stray variable cannot make release runs verbose.
pub fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("runecaster.log");
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?)
}

/// Initialise logging, to stdout or to `log_file` when given.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(debug: bool, log_file: Option<PathBuf>) -> bool {
    let filter = env_filter(debug);

    let appender = match log_file.as_deref().map(file_appender) {
        Some(Ok(appender)) => Some(appender),
        Some(Err(err)) => {
            eprintln!("failed to open log file, logging to stdout: {err}");
            None
        }
        None => None,
    };

    match appender {
        Some(appender) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(appender)
            .try_init()
            .is_ok(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok(),
    }
}
