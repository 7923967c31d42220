//! Process-lifetime resource cache.
//!
//! # Responsibilities
//! - Run an async initializer once per key and share its result
//! - Keep scoped resources open until shutdown, then release them
//!
//! # Design Decisions
//! - Lives outside any request deadline and outside the pipeline
//! - Keys are strings; values are type-erased and downcast on read
//! - Release runs in reverse acquisition order on [`ResourceCache::close`]
//! - Cached values are shared, not locked: concurrent batch records must
//!   only use resources that tolerate concurrent access

use std::any::Any;
use std::future::Future;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::error::BoxError;

type Shared = Arc<dyn Any + Send + Sync>;
type Release = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Resource cache failures.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("initializing resource '{key}' failed: {source}")]
    Init {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("resource '{key}' holds a different type")]
    TypeMismatch { key: String },
}

/// Shared async resources, initialized once per process.
#[derive(Default)]
pub struct ResourceCache {
    cells: DashMap<String, Arc<OnceCell<Shared>>>,
    scoped: Mutex<Vec<(String, Release)>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value under `key`, running `init` if no caller has yet.
    ///
    /// Concurrent callers wait for the first initializer. A failed
    /// initializer leaves the key empty so a later call can retry.
    pub async fn get_or_init<T, F, Fut, E>(&self, key: &str, init: F) -> Result<Arc<T>, ResourceError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        // Clone the cell out so no map guard is held across the await.
        let cell = self.cells.entry(key.to_string()).or_default().clone();

        let value = cell
            .get_or_try_init(|| async {
                match init().await {
                    Ok(value) => Ok(Arc::new(value) as Shared),
                    Err(error) => Err(ResourceError::Init {
                        key: key.to_string(),
                        source: error.into(),
                    }),
                }
            })
            .await?
            .clone();

        value.downcast::<T>().map_err(|_| ResourceError::TypeMismatch { key: key.to_string() })
    }

    /// Acquire a resource once and register `release` for [`close`](Self::close).
    pub async fn enter<T, A, Fut, E, R, RFut>(&self, key: &str, acquire: A, release: R) -> Result<Arc<T>, ResourceError>
    where
        T: Any + Send + Sync,
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        R: FnOnce(Arc<T>) -> RFut + Send + 'static,
        RFut: Future<Output = ()> + Send + 'static,
    {
        let mut acquired = false;
        let value = self
            .get_or_init(key, || {
                acquired = true;
                acquire()
            })
            .await?;

        if acquired {
            let resource = value.clone();
            let release: Release = Box::new(move || release(resource).boxed());
            self.lock_scoped().push((key.to_string(), release));
            tracing::debug!(key, "Scoped resource acquired");
        }
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cells.get(key).is_some_and(|cell| cell.initialized())
    }

    /// Number of scoped resources awaiting release.
    pub fn pending_releases(&self) -> usize {
        self.lock_scoped().len()
    }

    /// Release scoped resources, most recent first. Returns how many ran.
    pub async fn close(&self) -> usize {
        let scoped = std::mem::take(&mut *self.lock_scoped());
        let count = scoped.len();

        for (key, release) in scoped.into_iter().rev() {
            release().await;
            self.cells.remove(&key);
            tracing::debug!(key = %key, "Scoped resource released");
        }
        count
    }

    fn lock_scoped(&self) -> std::sync::MutexGuard<'_, Vec<(String, Release)>> {
        self.scoped.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("cached", &self.cells.len())
            .field("pending_releases", &self.pending_releases())
            .finish()
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        let pending = self.pending_releases();
        if pending > 0 {
            tracing::warn!(pending, "Resource cache dropped without close; scoped resources not released");
        }
    }
}
