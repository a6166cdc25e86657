use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::content::{
    CreateCategoryCommand, CreateMessageCommand, CreateProjectCommand, CreateServiceCommand,
    UpdateCategoryCommand, UpdateProjectCommand, UpdateServiceCommand,
};
use crate::cache::SettingsSource;
use crate::domain::site_config::Document;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryCreateRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<CategoryCreateRequest> for CreateCategoryCommand {
    fn from(request: CategoryCreateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            icon: request.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<CategoryUpdateRequest> for UpdateCategoryCommand {
    fn from(request: CategoryUpdateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            icon: request.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category_id: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub main_image: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    pub demo_link: Option<String>,
}

impl From<ProjectCreateRequest> for CreateProjectCommand {
    fn from(request: ProjectCreateRequest) -> Self {
        Self {
            name: request.name,
            category_id: request.category_id,
            description: request.description,
            tech_stack: request.tech_stack,
            main_image: request.main_image,
            additional_images: request.additional_images,
            demo_link: request.demo_link,
        }
    }
}

/// `projectCode` is accepted for compatibility and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateRequest {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub additional_images: Option<Vec<String>>,
    pub demo_link: Option<String>,
}

impl From<ProjectUpdateRequest> for UpdateProjectCommand {
    fn from(request: ProjectUpdateRequest) -> Self {
        Self {
            name: request.name,
            category_id: request.category_id,
            description: request.description,
            tech_stack: request.tech_stack,
            main_image: request.main_image,
            additional_images: request.additional_images,
            demo_link: request.demo_link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceCreateRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl From<ServiceCreateRequest> for CreateServiceCommand {
    fn from(request: ServiceCreateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            features: request.features,
            icon: request.icon,
            color: request.color,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl From<ServiceUpdateRequest> for UpdateServiceCommand {
    fn from(request: ServiceUpdateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            features: request.features,
            icon: request.icon,
            color: request.color,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl From<MessageCreateRequest> for CreateMessageCommand {
    fn from(request: MessageCreateRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            phone: request.phone,
            project_type: request.project_type,
            budget: request.budget,
            message: request.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub image: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub url: String,
}

/// Either `["home", "hero", "title"]` or `"home.hero.title"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SettingsPathSpec {
    Segments(Vec<String>),
    Dotted(String),
}

impl SettingsPathSpec {
    pub fn into_segments(self) -> Vec<String> {
        match self {
            SettingsPathSpec::Segments(segments) => segments,
            SettingsPathSpec::Dotted(path) if path.is_empty() => Vec::new(),
            SettingsPathSpec::Dotted(path) => path.split('.').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsPatchRequest {
    pub path: SettingsPathSpec,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse<'a> {
    pub settings: &'a Document,
    pub source: SettingsSource,
    /// Click-to-chat link with the widget's default message.
    pub whatsapp_url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn patch_path_accepts_array_or_dotted_string() {
        let array: SettingsPatchRequest =
            serde_json::from_value(json!({"path": ["contact", "phone"], "value": "1"}))
                .expect("array");
        let dotted: SettingsPatchRequest =
            serde_json::from_value(json!({"path": "contact.phone", "value": "1"})).expect("dotted");

        assert_eq!(array.path.into_segments(), vec!["contact", "phone"]);
        assert_eq!(dotted.path.into_segments(), vec!["contact", "phone"]);
    }

    #[test]
    fn project_create_reads_camel_case() {
        let request: ProjectCreateRequest = serde_json::from_value(json!({
            "name": "Tracker",
            "categoryId": "cat-1",
            "techStack": ["Rust"],
            "additionalImages": ["/uploads/a.png"]
        }))
        .expect("request");

        let command = CreateProjectCommand::from(request);
        assert_eq!(command.category_id, "cat-1");
        assert_eq!(command.tech_stack, vec!["Rust"]);
        assert_eq!(command.additional_images, vec!["/uploads/a.png"]);
    }
}
