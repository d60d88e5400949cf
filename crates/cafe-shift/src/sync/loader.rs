use super::remote::{GetAllShiftsResponse, ShiftSource};
use super::store::{read_cached_shifts, write_cached_shifts, SnapshotStore, StoreError};
use crate::schedule::{normalize_all, RawShiftRecord, ShiftRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    Remote,
    Cache,
}

/// Immutable record list produced by one load.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftSnapshot {
    pub records: Vec<ShiftRecord>,
    pub source: SnapshotSource,
    pub loaded_at: DateTime<Utc>,
}

impl ShiftSnapshot {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            source: SnapshotSource::Cache,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("shift cache unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("shift cache worker stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Fetch-or-fallback loader: the cache is read first, one remote attempt
/// follows when a source is configured, and a successful fetch overwrites the
/// cache. Concurrent callers share a single in-flight load.
pub struct ShiftLoader<S> {
    store: Arc<S>,
    remote: Option<Arc<dyn ShiftSource>>,
    in_flight: Mutex<()>,
    generation: AtomicU64,
    latest: RwLock<Arc<ShiftSnapshot>>,
}

impl<S> ShiftLoader<S>
where
    S: SnapshotStore,
{
    pub fn new(store: Arc<S>, remote: Option<Arc<dyn ShiftSource>>) -> Self {
        Self {
            store,
            remote,
            in_flight: Mutex::new(()),
            generation: AtomicU64::new(0),
            latest: RwLock::new(Arc::new(ShiftSnapshot::empty())),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Most recently published snapshot (empty before the first load).
    pub fn latest(&self) -> Arc<ShiftSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<S> ShiftLoader<S>
where
    S: SnapshotStore + 'static,
{
    pub async fn load(&self) -> Result<Arc<ShiftSnapshot>, LoadError> {
        let observed = self.generation.load(Ordering::Acquire);
        let _guard = self.in_flight.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            debug!("reusing snapshot from the load that was already in flight");
            return Ok(self.latest());
        }

        let snapshot = Arc::new(self.fetch_or_fallback().await?);
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        self.generation.fetch_add(1, Ordering::AcqRel);

        Ok(snapshot)
    }

    async fn fetch_or_fallback(&self) -> Result<ShiftSnapshot, LoadError> {
        let cached = self.with_store(read_cached_shifts::<S>).await?;
        info!(count = cached.len(), "read cached shift records");

        let (raw, source) = match &self.remote {
            None => {
                info!("spreadsheet API not configured; using cached shifts only");
                (cached, SnapshotSource::Cache)
            }
            Some(remote) => self.fetch_remote(remote.as_ref(), cached).await,
        };

        let records = normalize_all(&raw);
        info!(count = records.len(), ?source, "shift snapshot ready");
        if let Some(sample) = records.first() {
            debug!(?sample, "first shift record");
        }

        Ok(ShiftSnapshot {
            records,
            source,
            loaded_at: Utc::now(),
        })
    }

    async fn fetch_remote(
        &self,
        remote: &dyn ShiftSource,
        cached: Vec<RawShiftRecord>,
    ) -> (Vec<RawShiftRecord>, SnapshotSource) {
        match remote.get_all_shifts().await {
            Ok(GetAllShiftsResponse {
                success: true,
                shifts: Some(shifts),
                ..
            }) => {
                let to_cache = shifts.clone();
                let written = self
                    .with_store(move |store| write_cached_shifts(store, &to_cache))
                    .await;
                if let Err(err) = written {
                    warn!(error = %err, "fetched shifts but could not refresh the cache");
                }
                info!(count = shifts.len(), "fetched shifts from spreadsheet API");
                (shifts, SnapshotSource::Remote)
            }
            Ok(response) => {
                warn!(
                    success = response.success,
                    message = response.message.as_deref().unwrap_or(""),
                    "getAllShifts returned no shifts; using cached data"
                );
                (cached, SnapshotSource::Cache)
            }
            Err(err) => {
                warn!(error = %err, "getAllShifts failed; using cached data");
                (cached, SnapshotSource::Cache)
            }
        }
    }

    /// Store implementations do blocking I/O, so it stays off the async workers.
    async fn with_store<T, F>(&self, operation: F) -> Result<T, LoadError>
    where
        F: FnOnce(&S) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || operation(&*store)).await?;
        Ok(outcome?)
    }
}
