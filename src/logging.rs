//! Log sink.
//!
//! One `tracing` subscriber per process, writing plain text to the layer's
//! log file. When the file cannot be created the subscriber writes to stderr
//! instead; when the host already installed a global subscriber, events go
//! to the host's. Logging never affects the call chain.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directives, `RUST_LOG` syntax.
pub const LOG_ENV: &str = "WIDESCREEN_FOV_LOG";

/// Where log events end up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    /// The layer's own log file.
    File(PathBuf),
    /// stderr; the log file could not be created.
    Stderr,
    /// A subscriber installed by the host process.
    Host,
}

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Install the subscriber on first call; later calls return the first sink.
pub fn init(log_file: &Path) -> &'static LogSink {
    SINK.get_or_init(|| install(log_file))
}

fn default_directive() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "info" }
}

fn install(log_file: &Path) -> LogSink {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive()));

    let mut open_error = None;
    let (installed, sink) = match File::create(log_file) {
        Ok(file) => (
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init(),
            LogSink::File(log_file.to_path_buf()),
        ),
        Err(error) => {
            open_error = Some(error);
            (
                tracing_subscriber::registry()
                    .with(filter)
                    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                    .try_init(),
                LogSink::Stderr,
            )
        }
    };

    match installed {
        Ok(()) => {
            if let Some(error) = open_error {
                warn!(%error, path = %log_file.display(), "cannot create log file");
            }
            debug!(sink = ?sink, "logging initialized");
            sink
        }
        Err(_) => LogSink::Host,
    }
}
