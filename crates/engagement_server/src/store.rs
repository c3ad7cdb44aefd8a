//! Storage handle injected into request handlers.
//!
//! # Invariants
//! - The handle holds only the database location; each request opens its
//!   own connection so concurrent requests contend in SQLite, not in a
//!   process-wide lock.
//! - Blocking storage work never runs on the async executor threads.

use crate::error::{ApiError, ApiResult};
use engagement_core::db::open_db;
use engagement_core::{ServiceError, ServiceResult};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
}

impl Store {
    /// Opens (creating and migrating when needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref().to_path_buf();
        drop(open_db(&path).map_err(ServiceError::from)?);
        info!(
            "event=store_open module=server status=ok path={}",
            path.display()
        );
        Ok(Self {
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Runs `work` against a fresh connection on the blocking pool.
    ///
    /// If the caller goes away mid-request the work still runs to its
    /// commit or rollback; the transaction is never left half-applied.
    pub async fn run<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> ServiceResult<T> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        let joined = tokio::task::spawn_blocking(move || {
            let mut conn = open_db(path.as_path()).map_err(ServiceError::from)?;
            work(&mut conn)
        })
        .await;

        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => Err(ApiError::TaskFailed(err.to_string())),
        }
    }
}
