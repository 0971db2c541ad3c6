//! Fetch-and-store coordination for one asset directory.
//!
//! [`ImageResolver`] fetches each distinct URL at most once, allocates a
//! unique filename for the bytes, writes them, and memoizes the outcome.
//! Concurrent `resolve` calls for the same URL wait for the in-flight fetch
//! instead of starting another one. All filename allocation goes through a
//! single lock so names stay unique under concurrency.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use crate::fetch::{FetchError, FetchErrorKind, Fetcher};
use crate::filename::FilenameAllocator;
use crate::storage::AssetStore;

/// Result of resolving one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Stored {
        url: String,
        local_path: PathBuf,
    },
    Failed {
        url: String,
        kind: FetchErrorKind,
        detail: String,
    },
}

impl FetchOutcome {
    fn failed(url: &str, err: &FetchError) -> Self {
        FetchOutcome::Failed {
            url: url.to_string(),
            kind: err.kind(),
            detail: err.detail(url),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Stored { url, .. } | FetchOutcome::Failed { url, .. } => url,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, FetchOutcome::Stored { .. })
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            FetchOutcome::Stored { local_path, .. } => Some(local_path),
            FetchOutcome::Failed { .. } => None,
        }
    }

    /// Summary line for failures.
    pub fn error_detail(&self) -> Option<&str> {
        match self {
            FetchOutcome::Stored { .. } => None,
            FetchOutcome::Failed { detail, .. } => Some(detail),
        }
    }
}

/// Names taken in the asset directory and the URLs already stored there.
///
/// The taken set only grows; every stored path's file name is in it.
#[derive(Debug, Default)]
pub struct AllocatorState {
    names: FilenameAllocator,
    stored: HashMap<String, PathBuf>,
}

impl AllocatorState {
    pub fn new(existing: Vec<String>) -> Self {
        Self {
            names: FilenameAllocator::with_taken(existing),
            stored: HashMap::new(),
        }
    }
}

type Slot = Arc<OnceLock<FetchOutcome>>;

/// Fetch-and-store coordinator bound to one asset directory.
pub struct ImageResolver {
    dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn AssetStore>,
    timeout: Duration,
    state: Mutex<AllocatorState>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ImageResolver {
    /// Creates `dir` if needed and seeds the taken names from its contents.
    pub fn open(
        dir: impl Into<PathBuf>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn AssetStore>,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        let dir = dir.into();
        store.ensure_dir(&dir)?;
        let existing = store.list(&dir)?;
        tracing::debug!(dir = %dir.display(), existing = existing.len(), "opened asset directory");
        Ok(Self {
            dir,
            fetcher,
            store,
            timeout,
            state: Mutex::new(AllocatorState::new(existing)),
            slots: Mutex::new(HashMap::new()),
        })
    }

    /// Resolves `url`, fetching it only if no earlier call has.
    pub fn resolve(&self, url: &str) -> FetchOutcome {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(url.to_string()).or_default())
        };
        if let Some(outcome) = slot.get() {
            tracing::debug!(url, "resolution cache hit");
            return outcome.clone();
        }
        slot.get_or_init(|| self.fetch_and_store(url)).clone()
    }

    /// Resolves every URL with at most `max_concurrent` fetches in flight.
    /// Outcomes are returned in input order.
    pub fn resolve_all(&self, urls: &[String], max_concurrent: usize) -> Vec<FetchOutcome> {
        let workers = max_concurrent.max(1).min(urls.len());
        if workers <= 1 {
            return urls.iter().map(|u| self.resolve(u)).collect();
        }

        let work: Mutex<VecDeque<(usize, &str)>> =
            Mutex::new(urls.iter().map(String::as_str).enumerate().collect());
        let (tx, rx) = mpsc::channel();
        std::thread::scope(|s| {
            for _ in 0..workers {
                let tx = tx.clone();
                let work = &work;
                s.spawn(move || loop {
                    let Some((index, url)) = lock(work).pop_front() else {
                        break;
                    };
                    if tx.send((index, self.resolve(url))).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut outcomes: Vec<Option<FetchOutcome>> = vec![None; urls.len()];
        for (index, outcome) in rx {
            outcomes[index] = Some(outcome);
        }
        outcomes.into_iter().flatten().collect()
    }

    /// Snapshot of URL → stored path for every successful resolution so far.
    pub fn stored_paths(&self) -> HashMap<String, PathBuf> {
        lock(&self.state).stored.clone()
    }

    fn fetch_and_store(&self, url: &str) -> FetchOutcome {
        let attempt =
            panic::catch_unwind(AssertUnwindSafe(|| self.fetcher.fetch(url, self.timeout)));
        let fetched = match attempt.unwrap_or_else(|payload| Err(panic_error(payload))) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(url, error = %e, "image fetch failed");
                return FetchOutcome::failed(url, &e);
            }
        };

        let name = lock(&self.state).names.claim(
            url,
            Some(&fetched.bytes),
            fetched.content_type.as_deref(),
        );

        match self.store.write(&self.dir, &name, &fetched.bytes) {
            Ok(local_path) => {
                lock(&self.state)
                    .stored
                    .insert(url.to_string(), local_path.clone());
                tracing::info!(url, path = %local_path.display(), "stored image");
                FetchOutcome::Stored {
                    url: url.to_string(),
                    local_path,
                }
            }
            Err(e) => {
                tracing::warn!(url, name = %name, error = %e, "image write failed");
                FetchOutcome::failed(url, &FetchError::Storage(e))
            }
        }
    }
}

/// A fetcher panic becomes an `Other` error so it fails only its own URL.
fn panic_error(payload: Box<dyn Any + Send>) -> FetchError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "fetcher panicked".to_string());
    FetchError::Other(format!("fetcher panicked: {message}"))
}

/// Locks a mutex, recovering the data if another thread panicked while holding it.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
