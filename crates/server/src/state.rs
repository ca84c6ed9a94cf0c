#![forbid(unsafe_code)]

use crate::ApiError;
use ob_storage::{SqliteStore, StoreError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

/// Shared handler state. The store lock is only taken inside synchronous
/// closures, never across an `.await`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    uploads: Arc<UploadSettings>,
}

impl AppState {
    pub fn new(store: SqliteStore, uploads: UploadSettings) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            uploads: Arc::new(uploads),
        }
    }

    pub fn uploads(&self) -> &UploadSettings {
        &self.uploads
    }

    pub(crate) fn with_store<T>(
        &self,
        op: impl FnOnce(&mut SqliteStore) -> Result<T, StoreError>,
    ) -> Result<T, ApiError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| ApiError::internal("store lock poisoned"))?;
        op(&mut store).map_err(ApiError::from)
    }
}
