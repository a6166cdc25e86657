//! Single-flight cache of the effective site configuration.
//!
//! The cache moves through three states. `Empty` serves the defaults and
//! starts a fetch on the next `load`. `Loading` shares one in-flight fetch
//! between every concurrent `load`. `Ready` serves the merged document until
//! `invalidate` clears it. Loads never fail: any store problem resolves to the
//! defaults.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::{counter, histogram};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::application::settings::{FetchOutcome, SettingsAdapter};
use crate::domain::site_config::{self, Document, merge};

use super::lock::{rw_read, rw_write};

const TARGET: &str = "vitrine::settings::cache";
const METRIC_SETTINGS_LOAD_TOTAL: &str = "vitrine_settings_load_total";
const METRIC_SETTINGS_LOAD_MS: &str = "vitrine_settings_load_ms";
const METRIC_SETTINGS_INVALIDATE_TOTAL: &str = "vitrine_settings_invalidate_total";

/// Where the effective document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    Database,
    Defaults,
}

/// The effective document plus what the fetch behind it observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub document: Arc<Document>,
    pub source: SettingsSource,
    pub store_unavailable: bool,
    pub error: Option<String>,
    pub updated_at: Option<OffsetDateTime>,
    pub updated_by: Option<String>,
}

impl ResolvedSettings {
    fn from_outcome(defaults: &Arc<Document>, outcome: FetchOutcome) -> Self {
        let fallback = |store_unavailable, error| Self {
            document: Arc::clone(defaults),
            source: SettingsSource::Defaults,
            store_unavailable,
            error,
            updated_at: None,
            updated_by: None,
        };

        match outcome {
            FetchOutcome::Found(stored) => Self {
                document: Arc::new(merge(defaults, &stored.document)),
                source: SettingsSource::Database,
                store_unavailable: false,
                error: None,
                updated_at: Some(stored.updated_at),
                updated_by: stored.updated_by,
            },
            FetchOutcome::NotYetConfigured => fallback(false, None),
            FetchOutcome::StoreUnavailable => fallback(true, None),
            FetchOutcome::Transient(message) => fallback(false, Some(message)),
        }
    }
}

type SharedLoad = Shared<BoxFuture<'static, Arc<ResolvedSettings>>>;

enum CacheSlot {
    Empty,
    Loading { generation: u64, task: SharedLoad },
    Ready(Arc<ResolvedSettings>),
}

/// Process-wide holder of the effective configuration.
///
/// Construct one per application and share it behind an `Arc`.
pub struct SettingsCache {
    adapter: Arc<SettingsAdapter>,
    defaults: Arc<Document>,
    slot: RwLock<CacheSlot>,
    generation: AtomicU64,
}

impl SettingsCache {
    pub fn new(adapter: Arc<SettingsAdapter>) -> Self {
        Self::with_defaults(adapter, site_config::defaults())
    }

    pub fn with_defaults(adapter: Arc<SettingsAdapter>, defaults: Arc<Document>) -> Self {
        Self {
            adapter,
            defaults,
            slot: RwLock::new(CacheSlot::Empty),
            generation: AtomicU64::new(0),
        }
    }

    pub fn defaults(&self) -> Arc<Document> {
        Arc::clone(&self.defaults)
    }

    /// Non-blocking read. Returns the cached document when ready and the
    /// defaults otherwise; never starts a fetch.
    pub fn get(&self) -> Arc<Document> {
        match self.current() {
            Some(resolved) => Arc::clone(&resolved.document),
            None => {
                warn!(
                    target = TARGET,
                    "Settings requested before first load completed; serving defaults"
                );
                Arc::clone(&self.defaults)
            }
        }
    }

    /// The resolved settings, if a load has completed since the last
    /// invalidation.
    pub fn current(&self) -> Option<Arc<ResolvedSettings>> {
        match &*rw_read(&self.slot, TARGET, "current") {
            CacheSlot::Ready(resolved) => Some(Arc::clone(resolved)),
            CacheSlot::Empty | CacheSlot::Loading { .. } => None,
        }
    }

    /// Load the effective document, sharing any fetch already in flight.
    pub async fn load(&self) -> Arc<Document> {
        Arc::clone(&self.resolve().await.document)
    }

    /// Like [`SettingsCache::load`] but also returns fetch diagnostics.
    pub async fn resolve(&self) -> Arc<ResolvedSettings> {
        let started_at = Instant::now();
        let (generation, task, kind) = {
            let mut slot = rw_write(&self.slot, TARGET, "load");
            match &*slot {
                CacheSlot::Ready(resolved) => {
                    counter!(METRIC_SETTINGS_LOAD_TOTAL, "kind" => "cached").increment(1);
                    return Arc::clone(resolved);
                }
                CacheSlot::Loading { generation, task } => (*generation, task.clone(), "shared"),
                CacheSlot::Empty => {
                    let generation = self.generation.load(Ordering::Acquire);
                    let task = self.start_fetch();
                    *slot = CacheSlot::Loading {
                        generation,
                        task: task.clone(),
                    };
                    (generation, task, "fresh")
                }
            }
        };

        let resolved = task.await;
        self.publish(generation, &resolved);

        counter!(METRIC_SETTINGS_LOAD_TOTAL, "kind" => kind).increment(1);
        histogram!(METRIC_SETTINGS_LOAD_MS, "kind" => kind)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        debug!(
            target = TARGET,
            kind,
            source = ?resolved.source,
            store_unavailable = resolved.store_unavailable,
            "Settings load finished"
        );

        resolved
    }

    /// Drop the cached document and any in-flight load. The next `load`
    /// fetches again; loads started before this call do not repopulate the
    /// cache.
    pub fn invalidate(&self) {
        let mut slot = rw_write(&self.slot, TARGET, "invalidate");
        self.generation.fetch_add(1, Ordering::AcqRel);
        *slot = CacheSlot::Empty;
        counter!(METRIC_SETTINGS_INVALIDATE_TOTAL).increment(1);
    }

    pub async fn reload(&self) -> Arc<Document> {
        self.invalidate();
        self.load().await
    }

    fn start_fetch(&self) -> SharedLoad {
        let adapter = Arc::clone(&self.adapter);
        let defaults = Arc::clone(&self.defaults);
        async move {
            let outcome = adapter.fetch().await;
            Arc::new(ResolvedSettings::from_outcome(&defaults, outcome))
        }
        .boxed()
        .shared()
    }

    fn publish(&self, generation: u64, resolved: &Arc<ResolvedSettings>) {
        let mut slot = rw_write(&self.slot, TARGET, "publish");
        let still_current = matches!(
            &*slot,
            CacheSlot::Loading { generation: pending, .. } if *pending == generation
        );
        if still_current {
            *slot = CacheSlot::Ready(Arc::clone(resolved));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::Notify;

    use super::*;
    use crate::application::auth::AdminPrincipal;
    use crate::application::repos::{RepoError, SettingsRow, SettingsStore};
    use crate::domain::site_config::{SETTINGS_ROW_KEY, document_from_value};
    use crate::infra::memory::MemoryStore;

    /// Counts fetches and can hold them until released.
    struct GatedStore {
        inner: MemoryStore,
        fetches: AtomicUsize,
        gate: Notify,
        gated: bool,
    }

    impl GatedStore {
        fn new(gated: bool) -> Self {
            Self {
                inner: MemoryStore::new(),
                fetches: AtomicUsize::new(0),
                gate: Notify::new(),
                gated,
            }
        }
    }

    #[async_trait]
    impl SettingsStore for GatedStore {
        async fn fetch_row(&self, key: &str) -> Result<Option<SettingsRow>, RepoError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.gate.notified().await;
            } else {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            self.inner.fetch_row(key).await
        }

        async fn row_exists(&self, key: &str) -> Result<bool, RepoError> {
            self.inner.row_exists(key).await
        }

        async fn insert_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
            self.inner.insert_row(row).await
        }

        async fn update_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
            self.inner.update_row(row).await
        }
    }

    fn doc(value: Value) -> Document {
        document_from_value(value).expect("object")
    }

    fn row(settings: Value) -> SettingsRow {
        SettingsRow {
            key: SETTINGS_ROW_KEY.into(),
            settings,
            updated_at: OffsetDateTime::now_utc(),
            updated_by: Some("user-1".into()),
        }
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() {
        let store = Arc::new(GatedStore::new(false));
        let cache = SettingsCache::new(Arc::new(SettingsAdapter::new(store.clone())));

        let (first, second) = tokio::join!(cache.load(), cache.load());

        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        cache.load().await;
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_before_load_returns_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.put_settings_row(row(json!({"company": {"name": "Other"}})));
        let cache = SettingsCache::new(Arc::new(SettingsAdapter::new(store.clone())));

        assert_eq!(*cache.get(), *site_config::defaults());
        assert_eq!(store.settings_operations(), 0);
    }

    #[tokio::test]
    async fn override_merges_over_defaults() {
        let defaults = Arc::new(doc(json!({
            "contact": {"phone": "+1-000", "email": "hello@example.com"}
        })));
        let store = Arc::new(MemoryStore::new());
        store.put_settings_row(row(json!({"contact": {"phone": "+20 122 511 9842"}})));
        let cache =
            SettingsCache::with_defaults(Arc::new(SettingsAdapter::new(store)), defaults.clone());

        let effective = cache.load().await;

        assert_eq!(effective["contact"]["phone"], "+20 122 511 9842");
        assert_eq!(effective["contact"]["email"], defaults["contact"]["email"]);
        assert_eq!(cache.get(), effective);
        assert_eq!(
            cache.current().map(|r| r.source),
            Some(SettingsSource::Database)
        );
    }

    #[tokio::test]
    async fn missing_table_resolves_to_defaults() {
        let store = Arc::new(MemoryStore::without_settings_table());
        let cache = SettingsCache::new(Arc::new(SettingsAdapter::new(store)));

        let resolved = cache.resolve().await;

        assert_eq!(*resolved.document, *site_config::defaults());
        assert!(resolved.store_unavailable);
        assert_eq!(resolved.source, SettingsSource::Defaults);
    }

    /// Every settings call times out.
    struct TimingOutStore;

    #[async_trait]
    impl SettingsStore for TimingOutStore {
        async fn fetch_row(&self, _key: &str) -> Result<Option<SettingsRow>, RepoError> {
            Err(RepoError::Timeout)
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

    #[tokio::test]
    async fn transient_store_errors_resolve_to_defaults() {
        let cache = SettingsCache::new(Arc::new(SettingsAdapter::new(Arc::new(TimingOutStore))));

        assert_eq!(*cache.load().await, *site_config::defaults());

        let resolved = cache.current().expect("ready after load");
        assert_eq!(resolved.source, SettingsSource::Defaults);
        assert!(!resolved.store_unavailable);
        assert!(resolved.error.is_some());
        assert_eq!(*cache.get(), *site_config::defaults());
    }

    #[tokio::test]
    async fn reload_observes_saved_document() {
        let store = Arc::new(MemoryStore::new());
        let adapter = Arc::new(SettingsAdapter::new(store));
        let cache = SettingsCache::new(adapter.clone());
        assert_eq!(*cache.load().await, *site_config::defaults());

        let principal = AdminPrincipal {
            user_id: "user-1".into(),
            email: None,
            name: None,
        };
        let new_doc = doc(json!({"home": {"stats": []}, "company": {"name": "Renamed"}}));
        adapter
            .save(Some(&principal), new_doc.clone())
            .await
            .expect("save");

        assert_eq!(*cache.get(), *site_config::defaults());
        cache.reload().await;

        assert_eq!(*cache.get(), merge(&site_config::defaults(), &new_doc));
    }

    #[tokio::test]
    async fn invalidated_inflight_load_does_not_populate_cache() {
        let store = Arc::new(GatedStore::new(true));
        let cache = Arc::new(SettingsCache::new(Arc::new(SettingsAdapter::new(
            store.clone(),
        ))));

        let pending = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.load().await }
        });
        while store.fetches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        cache.invalidate();
        store.gate.notify_one();
        pending.await.expect("load task");

        assert!(cache.current().is_none());

        store.gate.notify_one();
        cache.load().await;
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
        assert!(cache.current().is_some());
    }
}
