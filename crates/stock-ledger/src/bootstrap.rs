use std::path::{Path, PathBuf};
use std::sync::Mutex;

use stock_core::settings::Settings;
use stock_data::reader::latest_ledger_file;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.stock-ledger/` exists.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(home.join(".stock-ledger"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG|INFO|WARNING|ERROR|CRITICAL` level name to an `EnvFilter`
/// directive. Unknown names pass through unchanged.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to `log_file` when given (appending, no ANSI colours) and to
/// stderr otherwise; stdout carries only query output. Falls back to
/// `"info"` if the level is not recognised.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }

    Ok(())
}

// ── Ledger resolution ──────────────────────────────────────────────────────────

/// The ledger to load: `--ledger` (or the remembered one) first, otherwise
/// the newest `.csv` under `--data-dir`. `None` when neither is available.
pub fn resolve_ledger(settings: &Settings) -> stock_core::Result<Option<PathBuf>> {
    if let Some(ledger) = &settings.ledger {
        return Ok(Some(ledger.clone()));
    }
    match &settings.data_dir {
        Some(dir) => latest_ledger_file(dir).map(Some),
        None => Ok(None),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
