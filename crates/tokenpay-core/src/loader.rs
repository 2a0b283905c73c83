//! # Client Runtime Loading
//!
//! Processors ship their tokenization runtime as a script the client
//! fetches once per process. [`ScriptRegistry`] tracks the load state
//! of each script URL explicitly (`NotStarted`, `Loading`, `Loaded`,
//! `Failed`) so the "already loading" and "already loaded" branches
//! are plain state transitions rather than environment probing.
//!
//! Concurrency contract: any number of callers may request the same
//! URL at once; exactly one fetch runs and every caller settles with
//! its result through a shared pending handle. A failed load is not
//! retried automatically, but the next request for that URL starts a
//! fresh fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::{PaymentError, PaymentResult};

/// Fetches a processor's client runtime.
///
/// The registry owns all caching and single-flight behavior; an
/// implementation just performs one network fetch per call.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn fetch(&self, url: &str) -> PaymentResult<()>;
}

/// Observable load state of one script URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

type SharedLoad = Shared<BoxFuture<'static, Result<(), PaymentError>>>;

enum Entry {
    Loading { epoch: u64, pending: SharedLoad },
    Loaded,
    Failed(PaymentError),
}

struct Inner {
    entries: HashMap<String, Entry>,
    next_epoch: u64,
}

/// Load-state registry, one entry per script URL.
///
/// Process-wide singleton available via [`ScriptRegistry::global`];
/// tests construct their own instances instead.
pub struct ScriptRegistry {
    inner: Mutex<Inner>,
}

impl ScriptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_epoch: 0,
            }),
        }
    }

    /// The process-wide registry shared by all gateway instances, so a
    /// runtime fetched by one instance is visible to the others
    pub fn global() -> Arc<ScriptRegistry> {
        static GLOBAL: OnceLock<Arc<ScriptRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ScriptRegistry::new())).clone()
    }

    /// Ensure `url` is loaded, fetching it with `loader` if nobody has
    /// yet. Concurrent calls for the same URL share one fetch.
    pub async fn ensure_loaded(
        &self,
        url: &str,
        loader: Arc<dyn ScriptLoader>,
    ) -> PaymentResult<()> {
        // The lock is never held across an await: take the pending
        // handle (starting the fetch if needed) and release.
        let (pending, epoch) = {
            let mut inner = self.lock();
            match inner.entries.get(url) {
                Some(Entry::Loaded) => return Ok(()),
                Some(Entry::Loading { epoch, pending }) => (pending.clone(), *epoch),
                Some(Entry::Failed(_)) | None => {
                    inner.next_epoch += 1;
                    let epoch = inner.next_epoch;
                    let url_owned = url.to_string();
                    let pending = async move { loader.fetch(&url_owned).await }
                        .boxed()
                        .shared();
                    inner.entries.insert(
                        url.to_string(),
                        Entry::Loading {
                            epoch,
                            pending: pending.clone(),
                        },
                    );
                    (pending, epoch)
                }
            }
        };

        let result = pending.await;
        self.finish(url, epoch, &result);
        result
    }

    /// Record that the runtime behind `url` is already present, e.g.
    /// loaded by the host application itself. Subsequent
    /// [`ensure_loaded`](Self::ensure_loaded) calls return immediately
    /// without fetching.
    pub fn mark_loaded(&self, url: &str) {
        let mut inner = self.lock();
        inner.entries.insert(url.to_string(), Entry::Loaded);
    }

    /// Current state of `url`
    pub fn status(&self, url: &str) -> ScriptStatus {
        let inner = self.lock();
        match inner.entries.get(url) {
            None => ScriptStatus::NotStarted,
            Some(Entry::Loading { .. }) => ScriptStatus::Loading,
            Some(Entry::Loaded) => ScriptStatus::Loaded,
            Some(Entry::Failed(_)) => ScriptStatus::Failed,
        }
    }

    /// True once `url` reached `Loaded`
    pub fn is_loaded(&self, url: &str) -> bool {
        self.status(url) == ScriptStatus::Loaded
    }

    /// The error from the most recent failed load of `url`, if any
    pub fn last_error(&self, url: &str) -> Option<PaymentError> {
        let inner = self.lock();
        match inner.entries.get(url) {
            Some(Entry::Failed(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// Settle the entry for a finished fetch. The epoch guard keeps a
    /// stale completion from clobbering a newer load or an adoption
    /// via [`mark_loaded`](Self::mark_loaded).
    fn finish(&self, url: &str, epoch: u64, result: &Result<(), PaymentError>) {
        let mut inner = self.lock();
        let matches_epoch = matches!(
            inner.entries.get(url),
            Some(Entry::Loading { epoch: current, .. }) if *current == epoch
        );
        if matches_epoch {
            let settled = match result {
                Ok(()) => Entry::Loaded,
                Err(err) => Entry::Failed(err.clone()),
            };
            inner.entries.insert(url.to_string(), settled);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::new()
    }
}
