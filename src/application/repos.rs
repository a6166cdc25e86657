//! Storage contracts consumed by the application services.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("backing table `{table}` does not exist")]
    StoreUnavailable { table: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn store_unavailable(table: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            table: table.into(),
        }
    }
}

/// Generic key/value record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepoError>;
    /// All values whose key starts with `prefix`, ordered by key.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, RepoError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), RepoError>;
    /// Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), RepoError>;
}

/// A row of the settings table.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRow {
    pub key: String,
    pub settings: Value,
    pub updated_at: OffsetDateTime,
    pub updated_by: Option<String>,
}

/// Table-shaped store holding the settings override document.
///
/// Implementations report a missing table as [`RepoError::StoreUnavailable`]
/// and a missing row as `Ok(None)`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn fetch_row(&self, key: &str) -> Result<Option<SettingsRow>, RepoError>;
    async fn row_exists(&self, key: &str) -> Result<bool, RepoError>;
    async fn insert_row(&self, row: &SettingsRow) -> Result<(), RepoError>;
    async fn update_row(&self, row: &SettingsRow) -> Result<(), RepoError>;
}
