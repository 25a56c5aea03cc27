use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "spendguard=info";

static INIT: Once = Once::new();

pub(crate) enum LogTarget {
    Stderr,
    /// Appends to a file; the TUI owns the terminal.
    File(PathBuf),
}

/// Installs the global subscriber. Later calls are no-ops.
pub(crate) fn init(target: &LogTarget) -> Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| result = install(target));
    result
}

fn install(target: &LogTarget) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt().with_env_filter(filter).with_target(false);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|e| anyhow!("Failed to install logger: {e}"))
}
