// File: src/logging.rs
use crate::paths::AppPaths;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Routes `log` records into `eventdesk.log` in the data directory.
///
/// The terminal is in raw mode while the UI runs, so nothing may go to stderr.
/// The level comes from `RUST_LOG` and defaults to `info`.
pub fn init() -> Result<PathBuf> {
    let path = AppPaths::get_log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(path)
}

/// Appends panics to `eventdesk_panic.log` before the default hook runs.
pub fn install_panic_hook() {
    let panic_log = AppPaths::get_panic_log_path()
        .unwrap_or_else(|_| PathBuf::from("eventdesk_panic.log"));
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        use std::io::Write;
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&panic_log)
        {
            let _ = writeln!(file, "PANIC: {:?}", info);
        }
        default_hook(info);
    }));
}
