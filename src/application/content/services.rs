use std::sync::Arc;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::application::repos::RecordStore;
use crate::domain::entities::ServiceRecord;

use super::{Collection, ContentError, TARGET, non_blank, required};

const DEFAULT_ICON: &str = "Settings";
const DEFAULT_COLOR: &str = "from-cyan-500 to-blue-600";

struct SeedService {
    title: &'static str,
    description: &'static str,
    features: [&'static str; 4],
    icon: &'static str,
    color: &'static str,
}

const SEED_SERVICES: [SeedService; 6] = [
    SeedService {
        title: "Web Development",
        description: "Custom web applications built with modern frameworks and technologies",
        features: [
            "React & Angular",
            "ASP.NET Core",
            "Progressive Web Apps",
            "E-commerce Solutions",
        ],
        icon: "Globe",
        color: "from-cyan-500 to-blue-600",
    },
    SeedService {
        title: "Mobile Applications",
        description: "Native and cross-platform mobile apps for iOS and Android",
        features: [
            "React Native",
            "Flutter",
            "Native iOS/Android",
            "App Store Deployment",
        ],
        icon: "Smartphone",
        color: "from-blue-500 to-purple-600",
    },
    SeedService {
        title: "AI & Machine Learning",
        description: "Intelligent solutions powered by artificial intelligence",
        features: [
            "Predictive Analytics",
            "Natural Language Processing",
            "Computer Vision",
            "ChatBots",
        ],
        icon: "Brain",
        color: "from-purple-500 to-pink-600",
    },
    SeedService {
        title: "Cloud Integration",
        description: "Scalable cloud infrastructure and migration services",
        features: [
            "AWS & Azure",
            "Cloud Migration",
            "Microservices",
            "DevOps & CI/CD",
        ],
        icon: "Cloud",
        color: "from-green-500 to-teal-600",
    },
    SeedService {
        title: "UI/UX Design",
        description: "Beautiful, intuitive interfaces that users love",
        features: [
            "User Research",
            "Wireframing",
            "Prototyping",
            "Design Systems",
        ],
        icon: "Palette",
        color: "from-pink-500 to-rose-600",
    },
    SeedService {
        title: "Maintenance & Support",
        description: "Ongoing support to keep your applications running smoothly",
        features: [
            "24/7 Monitoring",
            "Bug Fixes",
            "Performance Optimization",
            "Security Updates",
        ],
        icon: "Settings",
        color: "from-orange-500 to-red-600",
    },
];

#[derive(Debug, Clone, Default)]
pub struct CreateServiceCommand {
    pub title: String,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateServiceCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Result of seeding the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSeedOutcome {
    pub message: &'static str,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceRecord>,
}

#[derive(Clone)]
pub struct ServiceCatalogService {
    records: Collection<ServiceRecord>,
}

impl ServiceCatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Collection::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<ServiceRecord>, ContentError> {
        Ok(self.records.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<ServiceRecord, ContentError> {
        self.records.load(id).await
    }

    pub async fn create(
        &self,
        actor: &str,
        command: CreateServiceCommand,
    ) -> Result<ServiceRecord, ContentError> {
        let title = required(&command.title, "title is required")?;
        let record = ServiceRecord {
            id: new_id(),
            title,
            description: command.description.unwrap_or_default(),
            features: command.features,
            icon: non_blank(command.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
            color: non_blank(command.color).unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            created_at: OffsetDateTime::now_utc(),
            created_by: actor.to_string(),
            updated_at: None,
        };
        self.records.put(&record).await?;
        info!(target = TARGET, id = %record.id, actor, "Service created");
        Ok(record)
    }

    pub async fn update(
        &self,
        id: &str,
        command: UpdateServiceCommand,
    ) -> Result<ServiceRecord, ContentError> {
        let mut record = self.records.load(id).await?;
        if let Some(title) = command.title {
            record.title = required(&title, "title is required")?;
        }
        if let Some(description) = command.description {
            record.description = description;
        }
        if let Some(features) = command.features {
            record.features = features;
        }
        if let Some(icon) = command.icon {
            record.icon = icon;
        }
        if let Some(color) = command.color {
            record.color = color;
        }
        record.updated_at = Some(OffsetDateTime::now_utc());
        self.records.put(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.records.remove(id).await?;
        Ok(())
    }

    /// Seed the default catalog when no service exists yet.
    pub async fn initialize(&self, actor: &str) -> Result<ServiceSeedOutcome, ContentError> {
        let existing = self.records.list().await?;
        if !existing.is_empty() {
            return Ok(ServiceSeedOutcome {
                message: "Services already initialized",
                count: existing.len(),
                services: Vec::new(),
            });
        }

        let base = OffsetDateTime::now_utc();
        let mut services = Vec::with_capacity(SEED_SERVICES.len());
        for (offset, seed) in (0_i64..).zip(SEED_SERVICES.iter()) {
            let record = ServiceRecord {
                id: new_id(),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                features: seed.features.iter().map(|f| f.to_string()).collect(),
                icon: seed.icon.to_string(),
                color: seed.color.to_string(),
                // Distinct timestamps keep the seeded order stable in listings.
                created_at: base + Duration::milliseconds(offset),
                created_by: actor.to_string(),
                updated_at: None,
            };
            self.records.put(&record).await?;
            services.push(record);
        }
        info!(target = TARGET, count = services.len(), actor, "Service catalog seeded");

        Ok(ServiceSeedOutcome {
            message: "Services initialized successfully",
            count: services.len(),
            services,
        })
    }
}

fn new_id() -> String {
    format!("service-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryStore;

    #[tokio::test]
    async fn create_applies_icon_and_color_defaults() {
        let service = ServiceCatalogService::new(Arc::new(MemoryStore::new()));

        let record = service
            .create(
                "admin-1",
                CreateServiceCommand {
                    title: "Audits".into(),
                    icon: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("create");

        assert!(record.id.starts_with("service-"));
        assert_eq!(record.icon, "Settings");
        assert_eq!(record.color, "from-cyan-500 to-blue-600");
    }

    #[tokio::test]
    async fn initialize_seeds_once_in_order() {
        let service = ServiceCatalogService::new(Arc::new(MemoryStore::new()));

        let first = service.initialize("admin-1").await.expect("seed");
        assert_eq!(first.count, 6);
        assert_eq!(first.message, "Services initialized successfully");

        let listed = service.list().await.expect("list");
        let titles: Vec<_> = listed.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles.first(), Some(&"Web Development"));
        assert_eq!(titles.last(), Some(&"Maintenance & Support"));

        let second = service.initialize("admin-1").await.expect("noop");
        assert_eq!(second.message, "Services already initialized");
        assert_eq!(second.count, 6);
        assert!(second.services.is_empty());
        assert_eq!(service.list().await.expect("list").len(), 6);
    }
}
