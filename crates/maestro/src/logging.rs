// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing setup: human-readable output on stderr plus one log file per
//! session under the configured log directory.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Path of a session's log file.
pub fn session_log_path(log_dir: &Path, session_id: &str) -> PathBuf {
    log_dir.join(format!("{session_id}.log"))
}

/// Default filter: Maestro crates at `level`, everything else at warn.
pub fn default_filter(level: &str) -> String {
    format!("maestro={level},warn")
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// The session log is opened in append mode, so a resumed session keeps
/// writing to the same file.
pub fn init_tracing(level: &str, log_dir: &Path, session_id: &str) -> std::io::Result<PathBuf> {
    let path = session_log_path(log_dir, session_id);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(path)
}
