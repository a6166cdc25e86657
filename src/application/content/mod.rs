//! CRUD services for the portfolio content kept in the record store.

mod categories;
mod messages;
mod projects;
mod services;

pub use categories::{CategoryService, CreateCategoryCommand, UpdateCategoryCommand};
pub use messages::{CreateMessageCommand, MessageService};
pub use projects::{CreateProjectCommand, ProjectService, UpdateProjectCommand};
pub use services::{
    CreateServiceCommand, ServiceCatalogService, ServiceSeedOutcome, UpdateServiceCommand,
};

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::application::repos::{RecordStore, RepoError};
use crate::domain::entities::ContentRecord;

const TARGET: &str = "vitrine::content";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Typed access to all records sharing one key prefix.
struct Collection<R> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<R: ContentRecord> Collection<R> {
    fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Every record ordered by creation time. Values that no longer decode are
    /// skipped.
    async fn list(&self) -> Result<Vec<R>, RepoError> {
        let values = self.store.get_by_prefix(R::KEY_PREFIX).await?;
        let mut records: Vec<R> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<R>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(
                        target = TARGET,
                        entity = R::ENTITY,
                        error = %err,
                        "Skipping undecodable record"
                    );
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(records)
    }

    async fn find(&self, id: &str) -> Result<Option<R>, RepoError> {
        let Some(value) = self.store.get(&R::store_key(id)).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| RepoError::from_persistence(format!("corrupt {} record: {err}", R::ENTITY)))
    }

    async fn load(&self, id: &str) -> Result<R, ContentError> {
        self.find(id)
            .await?
            .ok_or(ContentError::NotFound { entity: R::LABEL })
    }

    async fn put(&self, record: &R) -> Result<(), RepoError> {
        let value = serde_json::to_value(record).map_err(|err| RepoError::InvalidInput {
            message: err.to_string(),
        })?;
        self.store.set(&R::store_key(record.id()), value).await
    }

    async fn remove(&self, id: &str) -> Result<(), RepoError> {
        self.store.delete(&R::store_key(id)).await
    }
}

fn required(value: &str, message: &'static str) -> Result<String, ContentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContentError::ConstraintViolation(message));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
