use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::RecordStore;
use crate::domain::entities::CategoryRecord;

use super::{Collection, ContentError, TARGET, required};

const DEFAULT_ICON: &str = "Folder";

#[derive(Debug, Clone, Default)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    records: Collection<CategoryRecord>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Collection::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<CategoryRecord>, ContentError> {
        Ok(self.records.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<CategoryRecord, ContentError> {
        self.records.load(id).await
    }

    pub async fn create(
        &self,
        actor: &str,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, ContentError> {
        let name = required(&command.name, "name is required")?;
        let record = CategoryRecord {
            id: format!("cat-{}", Uuid::new_v4()),
            name,
            description: command.description.unwrap_or_default(),
            icon: super::non_blank(command.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
            created_at: OffsetDateTime::now_utc(),
            created_by: actor.to_string(),
            updated_at: None,
        };
        self.records.put(&record).await?;
        info!(target = TARGET, id = %record.id, actor, "Category created");
        Ok(record)
    }

    pub async fn update(
        &self,
        id: &str,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, ContentError> {
        let mut record = self.records.load(id).await?;
        if let Some(name) = command.name {
            record.name = required(&name, "name is required")?;
        }
        if let Some(description) = command.description {
            record.description = description;
        }
        if let Some(icon) = command.icon {
            record.icon = icon;
        }
        record.updated_at = Some(OffsetDateTime::now_utc());
        self.records.put(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.records.remove(id).await?;
        Ok(())
    }
}
