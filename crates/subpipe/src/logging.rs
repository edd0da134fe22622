//! Dual-channel log setup.
//!
//! Three layers on one subscriber: a general file log at INFO, a
//! changelog file at WARN and above (notable events like rows pushed or
//! table creation), and a stdout mirror at INFO. `log` records from the
//! database layer flow in through the tracing-log bridge.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::error::LoggingError;

/// Installs the global subscriber. Call once, before the first run.
pub fn init(log_file: &Path, changelog_file: &Path) -> Result<(), LoggingError> {
    build(log_file, changelog_file)?
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

/// Builds the layered subscriber without installing it.
fn build(
    log_file: &Path,
    changelog_file: &Path,
) -> Result<impl tracing::Subscriber + Send + Sync + 'static, LoggingError> {
    let general = open_append(log_file)?;
    let changelog = open_append(changelog_file)?;

    Ok(tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(general))
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(changelog))
                .with_filter(LevelFilter::WARN),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stdout)
                .with_filter(LevelFilter::INFO),
        ))
}

fn open_append(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| LoggingError::OpenFile {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source: e,
        })
}
