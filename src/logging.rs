use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::data_dir;

/// Route `tracing` output to `~/.taskboard/taskboard.log`; the terminal
/// belongs to the UI. `TASKBOARD_LOG` sets the filter and
/// `TASKBOARD_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() -> Result<()> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join("taskboard.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("TASKBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("taskboard=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);
    let writer = Mutex::new(file);

    let installed = match std::env::var("TASKBOARD_LOG_FORMAT").as_deref() {
        Ok("json") => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(writer))
            .try_init(),
        _ => registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init(),
    };
    installed.context("Failed to install tracing subscriber")
}
