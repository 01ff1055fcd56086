// ABOUTME: Shared logging setup for piper binaries
// ABOUTME: Two functions: init() for stderr, init_file() for an append-only log file

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
/// Stdout stays untouched so a host process can own it.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Append logs to the given file. Default: INFO level, RUST_LOG override.
/// If the file cannot be opened, prints a warning to stderr and falls back to init().
pub fn init_file(path: &Path) {
    if let Err(e) = init_file_inner(path) {
        eprintln!("Warning: failed to set up file logging: {e}");
        init();
    }
}

fn init_file_inner(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_ansi(false)
        .init();

    Ok(())
}
