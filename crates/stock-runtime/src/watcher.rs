//! Ledger file watcher.
//!
//! Polls the active ledger's modification time in a tokio task. When the file
//! changes the [`EngineHandle`] is rebuilt and a [`LedgerSnapshot`] is sent
//! through an `mpsc` channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use stock_core::reports::DashboardStats;
use stock_data::BuildMetadata;
use tokio::sync::mpsc;
use tokio::time;

use crate::engine_handle::EngineHandle;

// ── Public types ──────────────────────────────────────────────────────────────

/// State of the engine after one (re)build attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    /// Ledger file being watched.
    pub source: String,
    /// `false` when the last build failed and the slot is empty.
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DashboardStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BuildMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── LedgerWatcher ─────────────────────────────────────────────────────────────

pub struct LedgerWatcher {
    handle: Arc<EngineHandle>,
    source: PathBuf,
    poll_interval: Duration,
}

impl LedgerWatcher {
    pub fn new(handle: Arc<EngineHandle>, source: PathBuf, poll_interval: Duration) -> Self {
        Self {
            handle,
            source,
            poll_interval,
        }
    }

    /// Start polling in a background task.
    ///
    /// The first snapshot reflects the current file; later ones are sent only
    /// when its modification time changes. The loop exits when the receiver
    /// is dropped or [`WatchHandle::abort`] is called.
    pub fn start(self) -> (mpsc::Receiver<LedgerSnapshot>, WatchHandle) {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(async move {
            self.watch_loop(tx).await;
        });
        (rx, WatchHandle { task })
    }

    async fn watch_loop(self, tx: mpsc::Sender<LedgerSnapshot>) {
        let mut last_seen = modified_time(&self.source);
        if !self.rebuild_and_send(&tx).await {
            return;
        }

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick fires immediately; the initial build is already done.
        interval.tick().await;

        loop {
            interval.tick().await;
            if tx.is_closed() {
                tracing::debug!("watch channel closed; exiting loop");
                break;
            }

            let current = modified_time(&self.source);
            if current == last_seen {
                continue;
            }
            tracing::info!(source = %self.source.display(), "ledger changed; rebuilding");
            last_seen = current;

            if !self.rebuild_and_send(&tx).await {
                break;
            }
        }
    }

    /// Rebuild off the async runtime and forward the result. Returns `false`
    /// once the receiver is gone.
    async fn rebuild_and_send(&self, tx: &mpsc::Sender<LedgerSnapshot>) -> bool {
        let handle = Arc::clone(&self.handle);
        let source = self.source.clone();
        let built = tokio::task::spawn_blocking(move || handle.replace_source(source)).await;

        let snapshot = match built {
            Ok(Ok(engine)) => LedgerSnapshot {
                source: self.source.display().to_string(),
                ready: true,
                stats: Some(engine.dashboard_stats()),
                metadata: self.handle.metadata(),
                error: None,
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "rebuild failed; engine slot is empty");
                self.failed_snapshot(e.to_string())
            }
            Err(join_err) => {
                tracing::warn!(error = %join_err, "rebuild task did not complete");
                self.handle.invalidate();
                self.failed_snapshot(join_err.to_string())
            }
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::debug!(error = %e, "snapshot receiver dropped");
            return false;
        }
        true
    }

    fn failed_snapshot(&self, error: String) -> LedgerSnapshot {
        LedgerSnapshot {
            source: self.source.display().to_string(),
            ready: false,
            stats: None,
            metadata: None,
            error: Some(error),
        }
    }
}

// ── WatchHandle ───────────────────────────────────────────────────────────────

/// Handle to the background watch task. Call [`WatchHandle::abort`] to stop it.
pub struct WatchHandle {
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
