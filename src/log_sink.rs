//! Scoped log sink.
//!
//! Diagnostics go to stderr through `tracing`; when a log file is requested,
//! every event and every user-facing report line is duplicated into it. The
//! file is owned by the returned session and closed when the session drops.

use anyhow::{Context, Result};
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const LOG_ENV: &str = "SCRIVENER_LOG";

pub struct LogSession {
    _guard: DefaultGuard,
    file: Option<Arc<File>>,
    path: Option<PathBuf>,
}

impl LogSession {
    /// Installs the subscriber for the current thread until the session drops.
    ///
    /// Stderr shows warnings by default and debug output with `verbose`;
    /// `SCRIVENER_LOG` overrides either. The log file records info and above.
    pub fn install(verbose: bool, log_file: Option<&Path>) -> Result<Self> {
        let level = if verbose { "debug" } else { "warn" };
        let stderr_filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(stderr_filter);

        let file = match log_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create log directory: {}", parent.display())
                    })?;
                }
                let handle = File::create(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                Some(Arc::new(handle))
            }
            None => None,
        };

        let file_layer = file.clone().map(|handle| {
            fmt::layer()
                .with_writer(handle)
                .with_ansi(false)
                .with_target(false)
                .with_filter(EnvFilter::new(if verbose { "debug" } else { "info" }))
        });

        let subscriber = Registry::default().with(stderr_layer).with(file_layer);
        let guard = tracing::subscriber::set_default(subscriber);

        if let Some(path) = log_file {
            tracing::debug!(path = %path.display(), "tee logging enabled");
        }

        Ok(Self {
            _guard: guard,
            file,
            path: log_file.map(Path::to_path_buf),
        })
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Prints a user-facing line to stdout and copies it into the log file.
    pub fn report(&self, message: impl Display) {
        println!("{}", message);
        if let Some(file) = &self.file {
            let mut handle: &File = file;
            if let Err(e) = writeln!(handle, "{}", message) {
                eprintln!("Failed to write log file: {}", e);
            }
        }
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let mut handle: &File = file;
            let _ = handle.flush();
        }
    }
}
