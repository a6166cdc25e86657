use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::RecordStore;
use crate::domain::entities::{CategoryRecord, ProjectRecord};
use crate::domain::project_code::project_code;

use super::{Collection, ContentError, TARGET, required};

#[derive(Debug, Clone, Default)]
pub struct CreateProjectCommand {
    pub name: String,
    pub category_id: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub main_image: Option<String>,
    pub additional_images: Vec<String>,
    pub demo_link: Option<String>,
}

/// Partial update. `project_code` is not settable.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectCommand {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub additional_images: Option<Vec<String>>,
    pub demo_link: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    records: Collection<ProjectRecord>,
    categories: Collection<CategoryRecord>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Collection::new(Arc::clone(&store)),
            categories: Collection::new(store),
        }
    }

    pub async fn list(&self, category_id: Option<&str>) -> Result<Vec<ProjectRecord>, ContentError> {
        let mut projects = self.records.list().await?;
        if let Some(category_id) = category_id {
            projects.retain(|project| project.category_id == category_id);
        }
        Ok(projects)
    }

    pub async fn get(&self, id: &str) -> Result<ProjectRecord, ContentError> {
        self.records.load(id).await
    }

    pub async fn create(
        &self,
        actor: &str,
        command: CreateProjectCommand,
    ) -> Result<ProjectRecord, ContentError> {
        let name = required(&command.name, "name is required")?;
        let category_id = required(&command.category_id, "categoryId is required")?;

        let category = self.categories.find(&category_id).await?;
        let created_at = OffsetDateTime::now_utc();
        let main_image = command.main_image.unwrap_or_default();
        let record = ProjectRecord {
            id: format!("proj-{}", Uuid::new_v4()),
            project_code: project_code(category.as_ref().map(|c| c.name.as_str()), created_at),
            name,
            category_id,
            description: command.description.unwrap_or_default(),
            tech_stack: command.tech_stack,
            images: ProjectRecord::gallery(&main_image, &command.additional_images),
            main_image,
            additional_images: command.additional_images,
            demo_link: command.demo_link.unwrap_or_default(),
            created_at,
            created_by: actor.to_string(),
            updated_at: None,
        };
        self.records.put(&record).await?;
        info!(
            target = TARGET,
            id = %record.id,
            code = %record.project_code,
            actor,
            "Project created"
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        id: &str,
        command: UpdateProjectCommand,
    ) -> Result<ProjectRecord, ContentError> {
        let mut record = self.records.load(id).await?;
        if let Some(name) = command.name {
            record.name = required(&name, "name is required")?;
        }
        if let Some(category_id) = command.category_id {
            record.category_id = required(&category_id, "categoryId is required")?;
        }
        if let Some(description) = command.description {
            record.description = description;
        }
        if let Some(tech_stack) = command.tech_stack {
            record.tech_stack = tech_stack;
        }
        if let Some(main_image) = command.main_image {
            record.main_image = main_image;
        }
        if let Some(additional_images) = command.additional_images {
            record.additional_images = additional_images;
        }
        if let Some(demo_link) = command.demo_link {
            record.demo_link = demo_link;
        }
        record.images = ProjectRecord::gallery(&record.main_image, &record.additional_images);
        record.updated_at = Some(OffsetDateTime::now_utc());
        self.records.put(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.records.remove(id).await?;
        Ok(())
    }
}
