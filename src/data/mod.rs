pub mod local_store;
pub mod migrations;
pub mod orders;
pub mod preferences;

pub use local_store::{MemoryStore, SqliteStore};

use crate::error::AppError;

/// Client-local persistent key-value storage. The surface is infallible by
/// contract: implementations degrade to `None`/no-op on internal failure and
/// log, rather than surfacing storage errors to callers (soft-fail).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

pub fn default_db_path() -> Result<std::path::PathBuf, AppError> {
    let dirs = directories::ProjectDirs::from("app", "bhakti", "bhakti")
        .ok_or_else(|| AppError::General("failed to resolve app data dir".to_string()))?;
    let dir = dirs.data_dir();
    std::fs::create_dir_all(dir)?;
    Ok(dir.join("bhakti.db"))
}
