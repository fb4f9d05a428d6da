//! Single-slot owner of the current inventory engine.
//!
//! [`EngineHandle`] replaces a lazily initialised global. It holds at most
//! one built engine for one ledger source. The slot is guarded by a single
//! mutex that stays locked across the build, so concurrent callers never
//! parse the same file twice and never observe a half-built engine.
//! Callers receive an `Arc` and query it without holding the lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use stock_core::{LedgerError, Result};
use stock_data::analysis::{load_engine, BuildMetadata};
use stock_data::InventoryEngine;

/// Maximum number of load attempts for transient I/O failures.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── Slot ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Slot {
    source: Option<PathBuf>,
    engine: Option<Arc<InventoryEngine>>,
    metadata: Option<BuildMetadata>,
    built_at: Option<Instant>,
    last_error: Option<String>,
}

impl Slot {
    fn clear(&mut self) {
        self.engine = None;
        self.metadata = None;
        self.built_at = None;
    }
}

// ── EngineHandle ──────────────────────────────────────────────────────────────

/// Owned build-or-reuse cache for one [`InventoryEngine`].
///
/// # Example
/// ```no_run
/// use stock_runtime::engine_handle::EngineHandle;
///
/// let handle = EngineHandle::new(Some("ledger.csv".into()));
/// let engine = handle.engine()?;
/// println!("{} positions", engine.positions().len());
/// # Ok::<(), stock_core::LedgerError>(())
/// ```
#[derive(Default)]
pub struct EngineHandle {
    slot: Mutex<Slot>,
}

impl EngineHandle {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                source,
                ..Slot::default()
            }),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// The current engine, building it first when the slot is empty.
    ///
    /// Fails with [`LedgerError::NotReady`] when no source is configured.
    pub fn engine(&self) -> Result<Arc<InventoryEngine>> {
        let mut slot = self.lock();
        if let Some(engine) = slot.engine.as_ref() {
            tracing::debug!("reusing cached inventory engine");
            return Ok(Arc::clone(engine));
        }
        Self::build_into(&mut slot)
    }

    /// Discard the current engine and build a fresh one from the same source.
    pub fn rebuild(&self) -> Result<Arc<InventoryEngine>> {
        let mut slot = self.lock();
        slot.clear();
        Self::build_into(&mut slot)
    }

    /// Point the handle at a new ledger and build it immediately.
    ///
    /// On failure the slot is left empty; the previous engine is not kept.
    pub fn replace_source(&self, source: impl Into<PathBuf>) -> Result<Arc<InventoryEngine>> {
        let mut slot = self.lock();
        slot.clear();
        slot.source = Some(source.into());
        Self::build_into(&mut slot)
    }

    /// Drop the cached engine; the next [`engine`](Self::engine) call rebuilds.
    pub fn invalidate(&self) {
        self.lock().clear();
        tracing::debug!("inventory engine invalidated");
    }

    pub fn source(&self) -> Option<PathBuf> {
        self.lock().source.clone()
    }

    /// `true` when an engine is built and cached.
    pub fn is_ready(&self) -> bool {
        self.lock().engine.is_some()
    }

    /// Metadata of the cached build, if any.
    pub fn metadata(&self) -> Option<BuildMetadata> {
        self.lock().metadata.clone()
    }

    /// Age of the cached engine, or `None` when the slot is empty.
    pub fn cache_age(&self) -> Option<Duration> {
        self.lock().built_at.map(|ts| ts.elapsed())
    }

    /// Description of the last failed build, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A panic mid-build leaves the slot cleared, which is a valid state.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_into(slot: &mut Slot) -> Result<Arc<InventoryEngine>> {
        let Some(source) = slot.source.clone() else {
            return Err(LedgerError::NotReady);
        };

        match load_with_retry(&source) {
            Ok(loaded) => {
                let engine = Arc::new(loaded.engine);
                slot.engine = Some(Arc::clone(&engine));
                slot.metadata = Some(loaded.metadata);
                slot.built_at = Some(Instant::now());
                slot.last_error = None;
                Ok(engine)
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "inventory build failed");
                slot.clear();
                slot.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Load `source`, retrying transient I/O errors with linear back-off
/// (0 ms, 100 ms, 200 ms).
fn load_with_retry(source: &Path) -> Result<stock_data::LoadedEngine> {
    let mut attempt = 0;
    loop {
        match load_engine(source) {
            Ok(loaded) => return Ok(loaded),
            Err(e) if e.is_transient() && attempt + 1 < MAX_RETRY_ATTEMPTS => {
                attempt += 1;
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, error = %e, "retrying ledger load");
                thread::sleep(Duration::from_millis(sleep_ms));
            }
            Err(e) => return Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
