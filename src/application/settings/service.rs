use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::auth::AdminPrincipal;
use crate::cache::{ResolvedSettings, SettingsCache, SettingsSource};
use crate::domain::error::DomainError;
use crate::domain::site_config::{Document, SiteConfig, merge, set_path};

use super::adapter::{FetchOutcome, SaveError, SettingsAdapter, StoredSettings};
use super::validation::validate_effective;

const TARGET: &str = "vitrine::settings::service";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("Settings already exist in database")]
    AlreadyInitialized,
    #[error("Database table not found. Please run database setup first.")]
    StoreUnavailable,
    #[error("{0}")]
    Transient(String),
}

impl From<SaveError> for SettingsError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Unauthorized => SettingsError::Unauthorized,
            SaveError::StoreUnavailable => SettingsError::StoreUnavailable,
            SaveError::Transient(message) => SettingsError::Transient(message),
        }
    }
}

/// Admin-facing view of where the effective settings come from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsStatus {
    pub source: SettingsSource,
    pub store_unavailable: bool,
    pub setup_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl SettingsStatus {
    fn from_outcome(outcome: FetchOutcome) -> Self {
        let mut status = Self {
            source: SettingsSource::Defaults,
            store_unavailable: false,
            setup_required: false,
            error: None,
            updated_at: None,
            updated_by: None,
        };
        match outcome {
            FetchOutcome::Found(stored) => {
                status.source = SettingsSource::Database;
                status.updated_at = Some(stored.updated_at);
                status.updated_by = stored.updated_by;
            }
            FetchOutcome::NotYetConfigured => {}
            FetchOutcome::StoreUnavailable => {
                status.store_unavailable = true;
                status.setup_required = true;
            }
            FetchOutcome::Transient(message) => status.error = Some(message),
        }
        status
    }
}

#[derive(Clone)]
pub struct SiteSettingsService {
    adapter: Arc<SettingsAdapter>,
    cache: Arc<SettingsCache>,
}

impl SiteSettingsService {
    pub fn new(adapter: Arc<SettingsAdapter>, cache: Arc<SettingsCache>) -> Self {
        Self { adapter, cache }
    }

    /// Synchronous read of whatever the cache holds right now.
    pub fn effective(&self) -> Arc<Document> {
        self.cache.get()
    }

    pub async fn resolve(&self) -> Arc<Document> {
        self.cache.load().await
    }

    /// Effective document together with where it came from.
    pub async fn resolved(&self) -> Arc<ResolvedSettings> {
        self.cache.resolve().await
    }

    pub async fn source(&self) -> SettingsSource {
        self.resolved().await.source
    }

    pub async fn site_config(&self) -> SiteConfig {
        let document = self.resolve().await;
        SiteConfig::from_document(&*document)
    }

    /// Reads the store directly so admins see the state as of now.
    pub async fn status(&self) -> SettingsStatus {
        SettingsStatus::from_outcome(self.adapter.fetch().await)
    }

    pub async fn save(
        &self,
        principal: Option<&AdminPrincipal>,
        document: Document,
    ) -> Result<StoredSettings, SettingsError> {
        if principal.is_none() {
            return Err(SettingsError::Unauthorized);
        }
        validate_effective(&merge(&self.cache.defaults(), &document))?;

        let stored = self.adapter.save(principal, document).await?;
        self.cache.reload().await;
        Ok(stored)
    }

    /// Set one value inside the effective document and save the result.
    pub async fn update_path(
        &self,
        principal: Option<&AdminPrincipal>,
        path: &[String],
        value: Value,
    ) -> Result<StoredSettings, SettingsError> {
        if principal.is_none() {
            return Err(SettingsError::Unauthorized);
        }
        let mut document = (*self.resolve().await).clone();
        set_path(&mut document, path, value)?;
        self.save(principal, document).await
    }

    /// Persist the defaults as the first override.
    pub async fn initialize(
        &self,
        principal: Option<&AdminPrincipal>,
    ) -> Result<StoredSettings, SettingsError> {
        if principal.is_none() {
            return Err(SettingsError::Unauthorized);
        }
        match self.adapter.fetch().await {
            FetchOutcome::Found(_) => return Err(SettingsError::AlreadyInitialized),
            FetchOutcome::StoreUnavailable => return Err(SettingsError::StoreUnavailable),
            FetchOutcome::Transient(message) => return Err(SettingsError::Transient(message)),
            FetchOutcome::NotYetConfigured => {}
        }

        let stored = self
            .save(principal, (*self.cache.defaults()).clone())
            .await?;
        info!(target = TARGET, "Settings initialized from defaults");
        Ok(stored)
    }

    pub async fn reload(&self) -> Arc<Document> {
        self.cache.reload().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::site_config::{defaults, document_from_value};
    use crate::infra::memory::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> SiteSettingsService {
        let adapter = Arc::new(SettingsAdapter::new(store));
        let cache = Arc::new(SettingsCache::new(adapter.clone()));
        SiteSettingsService::new(adapter, cache)
    }

    fn admin() -> AdminPrincipal {
        AdminPrincipal {
            user_id: "admin-1".into(),
            email: Some("admin@example.com".into()),
            name: None,
        }
    }

    fn doc(value: Value) -> Document {
        document_from_value(value).expect("object")
    }

    #[tokio::test]
    async fn save_refreshes_effective_document() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store);
        service.resolve().await;

        service
            .save(Some(&admin()), doc(json!({"contact": {"phone": "+1 555 0100"}})))
            .await
            .expect("save");

        let effective = service.effective();
        assert_eq!(effective["contact"]["phone"], "+1 555 0100");
        assert_eq!(effective["contact"]["email"], defaults()["contact"]["email"]);
        assert_eq!(service.source().await, SettingsSource::Database);
    }

    #[tokio::test]
    async fn site_config_view_reflects_override() {
        let service = service(Arc::new(MemoryStore::new()));
        assert_eq!(service.site_config().await.company.name, "SOF for Software");

        service
            .save(Some(&admin()), doc(json!({"company": {"name": "Acme"}})))
            .await
            .expect("save");

        let site = service.site_config().await;
        assert_eq!(site.company.name, "Acme");
        assert_eq!(site.company.name_short, "SOF");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_without_store_io() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let err = service
            .save(Some(&admin()), doc(json!({"contact": {"email": "not-an-email"}})))
            .await
            .expect_err("invalid email");

        assert!(matches!(err, SettingsError::Validation(_)));
        assert_eq!(store.settings_operations(), 0);
    }

    #[tokio::test]
    async fn anonymous_save_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let err = service
            .save(None, doc(json!({})))
            .await
            .expect_err("anonymous");

        assert!(matches!(err, SettingsError::Unauthorized));
        assert_eq!(store.settings_operations(), 0);
    }

    #[tokio::test]
    async fn update_path_sets_nested_value() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store);

        service
            .update_path(
                Some(&admin()),
                &["home".to_string(), "stats".to_string(), "0".to_string(), "value".to_string()],
                json!("99+"),
            )
            .await
            .expect("update");

        assert_eq!(service.effective()["home"]["stats"][0]["value"], "99+");
    }

    #[tokio::test]
    async fn update_path_rejects_empty_path() {
        let service = service(Arc::new(MemoryStore::new()));

        let err = service
            .update_path(Some(&admin()), &[], json!(1))
            .await
            .expect_err("empty path");

        assert!(matches!(err, SettingsError::Validation(_)));
    }

    #[tokio::test]
    async fn initialize_only_once() {
        let service = service(Arc::new(MemoryStore::new()));

        let stored = service.initialize(Some(&admin())).await.expect("first");
        assert_eq!(stored.document, *defaults());

        let err = service
            .initialize(Some(&admin()))
            .await
            .expect_err("second");
        assert_eq!(err.to_string(), "Settings already exist in database");
    }

    #[tokio::test]
    async fn status_reports_missing_table() {
        let service = service(Arc::new(MemoryStore::without_settings_table()));

        let status = service.status().await;

        assert!(status.store_unavailable);
        assert!(status.setup_required);
        assert_eq!(status.source, SettingsSource::Defaults);

        let err = service
            .save(Some(&admin()), doc(json!({})))
            .await
            .expect_err("no table");
        assert!(matches!(err, SettingsError::StoreUnavailable));
    }
}
