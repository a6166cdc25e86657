//! Content records kept in the record store.
//!
//! Every record serializes with camelCase field names and RFC 3339 timestamps,
//! which is also the JSON shape the HTTP API returns.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

/// A record stored under `{KEY_PREFIX}{id}` in the record store.
pub trait ContentRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KEY_PREFIX: &'static str;
    const ENTITY: &'static str;
    /// Human-facing name used in error messages.
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> OffsetDateTime;

    fn store_key(id: &str) -> String {
        format!("{}{id}", Self::KEY_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub icon: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl ContentRecord for CategoryRecord {
    const KEY_PREFIX: &'static str = "category:";
    const ENTITY: &'static str = "category";
    const LABEL: &'static str = "Category";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub project_code: String,
    pub name: String,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub main_image: String,
    #[serde(default)]
    pub additional_images: Vec<String>,
    /// `main_image` followed by `additional_images`, empty entries removed.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub demo_link: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl ProjectRecord {
    pub fn gallery(main_image: &str, additional_images: &[String]) -> Vec<String> {
        std::iter::once(main_image)
            .chain(additional_images.iter().map(String::as_str))
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ContentRecord for ProjectRecord {
    const KEY_PREFIX: &'static str = "project:";
    const ENTITY: &'static str = "project";
    const LABEL: &'static str = "Project";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub icon: String,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl ContentRecord for ServiceRecord {
    const KEY_PREFIX: &'static str = "service:";
    const ENTITY: &'static str = "service";
    const LABEL: &'static str = "Service";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    pub message: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub read_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_by: Option<String>,
}

impl ContentRecord for MessageRecord {
    const KEY_PREFIX: &'static str = "message:";
    const ENTITY: &'static str = "message";
    const LABEL: &'static str = "Message";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}
