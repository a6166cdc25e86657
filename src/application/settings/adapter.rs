use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::application::auth::AdminPrincipal;
use crate::application::repos::{RepoError, SettingsRow, SettingsStore};
use crate::domain::site_config::{Document, SETTINGS_ROW_KEY, document_from_value};

const METRIC_SETTINGS_FETCH_TOTAL: &str = "vitrine_settings_fetch_total";
const TARGET: &str = "vitrine::settings::adapter";

/// Persisted override document with its audit columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSettings {
    pub document: Document,
    pub updated_at: OffsetDateTime,
    pub updated_by: Option<String>,
}

/// Result of reading the override document.
///
/// Only `Found` carries data; the other variants all degrade to the defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(StoredSettings),
    /// The row does not exist yet. Expected before the first save.
    NotYetConfigured,
    /// The settings table itself is missing.
    StoreUnavailable,
    /// Any other store failure.
    Transient(String),
}

impl FetchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Found(_) => "found",
            FetchOutcome::NotYetConfigured => "not_configured",
            FetchOutcome::StoreUnavailable => "store_unavailable",
            FetchOutcome::Transient(_) => "transient",
        }
    }

    pub fn report(&self) -> SettingsFetchReport {
        let (settings, store_unavailable, error) = match self {
            FetchOutcome::Found(stored) => (Some(stored.document.clone()), false, None),
            FetchOutcome::NotYetConfigured => (None, false, None),
            FetchOutcome::StoreUnavailable => (None, true, None),
            FetchOutcome::Transient(message) => (None, false, Some(message.clone())),
        };
        SettingsFetchReport {
            success: true,
            settings,
            store_unavailable,
            error,
        }
    }
}

/// Wire shape of a fetch: reads never report `success = false`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFetchReport {
    pub success: bool,
    pub settings: Option<Document>,
    pub store_unavailable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Database table not found. Please run database setup first.")]
    StoreUnavailable,
    #[error("{0}")]
    Transient(String),
}

impl From<RepoError> for SaveError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::StoreUnavailable { .. } => SaveError::StoreUnavailable,
            other => SaveError::Transient(other.to_string()),
        }
    }
}

/// Wire shape of a save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSaveReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Document>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub store_unavailable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SettingsSaveReport {
    pub fn saved(stored: &StoredSettings) -> Self {
        Self {
            success: true,
            settings: Some(stored.document.clone()),
            store_unavailable: false,
            error: None,
        }
    }

    pub fn failed(error: &SaveError) -> Self {
        Self {
            success: false,
            settings: None,
            store_unavailable: matches!(error, SaveError::StoreUnavailable),
            error: Some(error.to_string()),
        }
    }
}

/// Reads and writes the override document under a fixed row key.
pub struct SettingsAdapter {
    store: Arc<dyn SettingsStore>,
    key: String,
}

impl SettingsAdapter {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            key: SETTINGS_ROW_KEY.to_string(),
        }
    }

    pub async fn fetch(&self) -> FetchOutcome {
        let outcome = match self.store.fetch_row(&self.key).await {
            Ok(Some(row)) => match document_from_value(row.settings) {
                Some(document) => FetchOutcome::Found(StoredSettings {
                    document,
                    updated_at: row.updated_at,
                    updated_by: row.updated_by,
                }),
                None => FetchOutcome::Transient("stored settings are not a JSON object".into()),
            },
            Ok(None) => FetchOutcome::NotYetConfigured,
            Err(RepoError::StoreUnavailable { table }) => {
                debug!(target = TARGET, table = %table, "Settings table missing");
                FetchOutcome::StoreUnavailable
            }
            Err(err) => FetchOutcome::Transient(err.to_string()),
        };

        if let FetchOutcome::Transient(message) = &outcome {
            warn!(target = TARGET, error = %message, "Settings fetch failed; defaults apply");
        }
        counter!(METRIC_SETTINGS_FETCH_TOTAL, "outcome" => outcome.label()).increment(1);

        outcome
    }

    /// Persist `document` as the whole override.
    ///
    /// Without a principal nothing touches the store. Otherwise the row is
    /// checked for existence first and then inserted or updated.
    pub async fn save(
        &self,
        principal: Option<&AdminPrincipal>,
        document: Document,
    ) -> Result<StoredSettings, SaveError> {
        let principal = principal.ok_or(SaveError::Unauthorized)?;

        let row = SettingsRow {
            key: self.key.clone(),
            settings: Value::Object(document.clone()),
            updated_at: OffsetDateTime::now_utc(),
            updated_by: Some(principal.actor_label().to_string()),
        };

        let exists = self.store.row_exists(&self.key).await?;
        if exists {
            self.store.update_row(&row).await?;
        } else {
            self.store.insert_row(&row).await?;
        }

        info!(
            target = TARGET,
            actor = principal.actor_label(),
            created = !exists,
            "Settings saved"
        );

        Ok(StoredSettings {
            document,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::infra::memory::MemoryStore;

    struct BrokenStore;

    #[async_trait]
    impl SettingsStore for BrokenStore {
        async fn fetch_row(&self, _key: &str) -> Result<Option<SettingsRow>, RepoError> {
            Err(RepoError::from_persistence("connection reset"))
        }

        async fn row_exists(&self, _key: &str) -> Result<bool, RepoError> {
            Err(RepoError::Timeout)
        }

        async fn insert_row(&self, _row: &SettingsRow) -> Result<(), RepoError> {
            Err(RepoError::Timeout)
        }

        async fn update_row(&self, _row: &SettingsRow) -> Result<(), RepoError> {
            Err(RepoError::Timeout)
        }
    }

    fn admin() -> AdminPrincipal {
        AdminPrincipal {
            user_id: "user-1".into(),
            email: Some("admin@example.com".into()),
            name: None,
        }
    }

    fn doc(value: Value) -> Document {
        document_from_value(value).expect("object")
    }

    #[tokio::test]
    async fn missing_row_is_not_an_error() {
        let adapter = SettingsAdapter::new(Arc::new(MemoryStore::new()));
        let outcome = adapter.fetch().await;

        assert_eq!(outcome, FetchOutcome::NotYetConfigured);
        let report = outcome.report();
        assert!(report.success);
        assert!(report.settings.is_none());
        assert!(!report.store_unavailable);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn missing_table_degrades_silently() {
        let adapter = SettingsAdapter::new(Arc::new(MemoryStore::without_settings_table()));
        let report = adapter.fetch().await.report();

        assert!(report.success);
        assert!(report.store_unavailable);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn other_errors_are_informational() {
        let adapter = SettingsAdapter::new(Arc::new(BrokenStore));
        let outcome = adapter.fetch().await;

        assert!(matches!(&outcome, FetchOutcome::Transient(msg) if msg.contains("connection reset")));
        assert!(outcome.report().success);
    }

    #[tokio::test]
    async fn non_object_rows_are_transient() {
        let store = Arc::new(MemoryStore::new());
        store.put_settings_row(SettingsRow {
            key: SETTINGS_ROW_KEY.into(),
            settings: json!(["not", "an", "object"]),
            updated_at: OffsetDateTime::now_utc(),
            updated_by: None,
        });
        let adapter = SettingsAdapter::new(store);

        assert!(matches!(adapter.fetch().await, FetchOutcome::Transient(_)));
    }

    #[tokio::test]
    async fn save_without_principal_touches_nothing() {
        let store = Arc::new(MemoryStore::new());
        let adapter = SettingsAdapter::new(store.clone());

        let err = adapter
            .save(None, doc(json!({"company": {"name": "X"}})))
            .await
            .expect_err("unauthorized");

        assert_eq!(err, SaveError::Unauthorized);
        assert_eq!(err.to_string(), "Not authenticated");
        assert_eq!(store.settings_operations(), 0);
    }

    #[tokio::test]
    async fn save_inserts_then_updates_with_audit_columns() {
        let store = Arc::new(MemoryStore::new());
        let adapter = SettingsAdapter::new(store.clone());
        let principal = admin();

        adapter
            .save(Some(&principal), doc(json!({"contact": {"phone": "1"}})))
            .await
            .expect("first save inserts");
        let saved = adapter
            .save(Some(&principal), doc(json!({"contact": {"phone": "2"}})))
            .await
            .expect("second save updates");

        assert_eq!(saved.updated_by.as_deref(), Some("user-1"));
        match adapter.fetch().await {
            FetchOutcome::Found(stored) => {
                assert_eq!(stored.document["contact"]["phone"], "2");
                assert_eq!(stored.updated_by.as_deref(), Some("user-1"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_against_missing_table_reports_setup_hint() {
        let adapter = SettingsAdapter::new(Arc::new(MemoryStore::without_settings_table()));
        let err = adapter
            .save(Some(&admin()), Document::new())
            .await
            .expect_err("table missing");

        assert_eq!(err, SaveError::StoreUnavailable);
        let report = SettingsSaveReport::failed(&err);
        assert!(!report.success);
        assert!(report.store_unavailable);
        assert_eq!(
            report.error.as_deref(),
            Some("Database table not found. Please run database setup first.")
        );
    }

    #[tokio::test]
    async fn save_surfaces_transient_errors() {
        let adapter = SettingsAdapter::new(Arc::new(BrokenStore));
        let err = adapter
            .save(Some(&admin()), Document::new())
            .await
            .expect_err("broken store");

        assert_eq!(err, SaveError::Transient("database timeout".into()));
    }
}
