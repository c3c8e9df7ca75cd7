use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{Config, StorageConfig};
use crate::error::AppError;
use crate::models::optimization::OptimizationRecord;
use crate::models::prediction::PredictionRecord;
use crate::services::weather_service::WeatherSource;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub weather: Arc<dyn WeatherSource>,
    pub storage: StorageConfig,
    pub started_at: Instant,
    /// Serializes snapshot writes so a stale snapshot never lands last.
    persist_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Store, weather: Arc<dyn WeatherSource>, config: &Config) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            weather,
            storage: config.storage.clone(),
            started_at: Instant::now(),
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    fn snapshot_path(&self) -> Option<PathBuf> {
        self.storage.snapshot_path.as_ref().map(PathBuf::from)
    }

    fn resolve_limit(limit: Option<usize>, default: usize) -> usize {
        match limit {
            Some(n) if n > 0 => n,
            _ => default,
        }
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn insert_prediction(&self, record: PredictionRecord) -> Result<Uuid, AppError> {
        self.commit(
            |store| Ok(store.predictions.insert(record)),
            |store, id| {
                store.predictions.remove(id);
            },
        )
        .await
    }

    pub async fn insert_optimization(&self, record: OptimizationRecord) -> Result<Uuid, AppError> {
        self.commit(
            |store| Ok(store.optimizations.insert(record)),
            |store, id| {
                store.optimizations.remove(id);
            },
        )
        .await
    }

    pub fn user_predictions(&self, user_id: &str, limit: Option<usize>) -> Vec<PredictionRecord> {
        let limit = Self::resolve_limit(limit, self.storage.default_prediction_limit);
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.predictions.by_user(user_id, limit)
    }

    pub fn user_optimizations(&self, user_id: &str, limit: Option<usize>) -> Vec<OptimizationRecord> {
        let limit = Self::resolve_limit(limit, self.storage.default_optimization_limit);
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.optimizations.by_user(user_id, limit)
    }

    pub async fn delete_prediction(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        self.commit(
            |store| store.predictions.delete_owned(id, user_id),
            |store, removed| store.predictions.restore(removed),
        )
        .await
        .map(|_| ())
    }

    pub async fn delete_optimization(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        self.commit(
            |store| store.optimizations.delete_owned(id, user_id),
            |store, removed| store.optimizations.restore(removed),
        )
        .await
        .map(|_| ())
    }

    /// Removes all of the caller's predictions; returns how many were dropped.
    pub async fn clear_predictions(&self, user_id: &str) -> Result<usize, AppError> {
        let removed = self
            .commit(
                |store| Ok(store.predictions.delete_all_owned(user_id)),
                |store, removed| {
                    for r in removed {
                        store.predictions.restore(r);
                    }
                },
            )
            .await?;
        Ok(removed.len())
    }

    pub fn counts(&self) -> (usize, usize) {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        (store.predictions.len(), store.optimizations.len())
    }

    /// Applies a mutation and rewrites the snapshot, if one is configured.
    /// A failed write runs `undo`, so memory never diverges from disk.
    async fn commit<R>(
        &self,
        apply: impl FnOnce(&mut Store) -> Result<R, AppError>,
        undo: impl FnOnce(&mut Store, R),
    ) -> Result<R, AppError> {
        let Some(path) = self.snapshot_path() else {
            let mut store = self.write_store();
            return apply(&mut *store);
        };

        let _guard = self.persist_lock.lock().await;
        let (applied, bytes) = {
            let mut store = self.write_store();
            let applied = apply(&mut *store)?;
            match store.to_snapshot_json() {
                Ok(bytes) => (applied, bytes),
                Err(e) => {
                    undo(&mut *store, applied);
                    return Err(e);
                }
            }
        };

        if let Err(e) = write_snapshot(&path, &bytes).await {
            warn!(path = %path.display(), error = %e, "snapshot write failed, change rolled back");
            undo(&mut *self.write_store(), applied);
            return Err(e);
        }
        debug!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
        Ok(applied)
    }
}

async fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
