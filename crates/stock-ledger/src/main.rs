mod bootstrap;
mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use stock_core::settings::{Command, LastUsedParams, Settings};
use stock_core::LedgerError;
use stock_runtime::watcher::LedgerWatcher;
use stock_runtime::EngineHandle;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("stock-ledger v{} starting", env!("CARGO_PKG_VERSION"));

    if settings.clear && settings.ledger.is_none() && settings.data_dir.is_none() {
        tracing::info!("Saved ledger cleared");
        return Ok(());
    }

    let ledger = bootstrap::resolve_ledger(&settings)?;
    let command = settings.command_or_default();

    if let Command::Watch { interval } = command {
        let source = ledger.ok_or(LedgerError::NotReady)?;
        remember(&source);
        return watch(source, Duration::from_secs(interval)).await;
    }

    let handle = EngineHandle::new(ledger.clone());
    let engine = handle.engine()?;
    if let Some(path) = &ledger {
        remember(path);
    }

    let output = commands::run_query(&engine, &command)?;
    println!("{}", commands::render(&output, settings.pretty)?);

    Ok(())
}

/// Save `ledger` as the default for the next run; failure is only logged.
fn remember(ledger: &std::path::Path) {
    if let Err(e) = Settings::remember_ledger(ledger, &LastUsedParams::config_path()) {
        tracing::warn!(error = %e, "could not save last-used ledger");
    }
}

/// Print one JSON snapshot line per (re)build until Ctrl+C.
async fn watch(source: PathBuf, interval: Duration) -> Result<()> {
    tracing::info!("Watching {} every {}s", source.display(), interval.as_secs());

    let handle = Arc::new(EngineHandle::new(None));
    let (mut rx, watcher) = LedgerWatcher::new(handle, source, interval).start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            snapshot = rx.recv() => match snapshot {
                Some(snapshot) => println!("{}", serde_json::to_string(&snapshot)?),
                None => break,
            },
            _ = &mut ctrl_c => {
                tracing::info!("Ctrl+C received; stopping watcher");
                watcher.abort();
                break;
            }
        }
    }

    Ok(())
}
