use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use metrics_util::debugging::{DebuggingRecorder, Snapshotter};
use serial_test::serial;

use vitrine::application::settings::SettingsAdapter;
use vitrine::cache::SettingsCache;
use vitrine::infra::memory::MemoryStore;
use vitrine::infra::telemetry::describe_metrics;

fn snapshotter() -> &'static Snapshotter {
    static SNAPSHOTTER: OnceLock<Snapshotter> = OnceLock::new();
    SNAPSHOTTER.get_or_init(|| {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        recorder
            .install()
            .expect("debug metrics recorder should install in this test process");
        describe_metrics();
        snapshotter
    })
}

/// `name{label=value}` for every recorded series.
fn series(snapshotter: &Snapshotter) -> HashSet<String> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| {
            let key = composite_key.key();
            let labels: Vec<String> = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            format!("{}{{{}}}", key.name(), labels.join(","))
        })
        .collect()
}

fn cache_over(store: MemoryStore) -> SettingsCache {
    let adapter = Arc::new(SettingsAdapter::new(Arc::new(store)));
    SettingsCache::new(adapter)
}

#[tokio::test]
#[serial]
async fn settings_cache_paths_emit_expected_metric_keys() {
    let snapshotter = snapshotter();

    let cache = cache_over(MemoryStore::new());
    cache.load().await;
    cache.load().await;
    cache.reload().await;

    let missing_table = cache_over(MemoryStore::without_settings_table());
    missing_table.load().await;

    let names = series(snapshotter);
    let expected = [
        "vitrine_settings_fetch_total{outcome=not_configured}",
        "vitrine_settings_fetch_total{outcome=store_unavailable}",
        "vitrine_settings_load_total{kind=fresh}",
        "vitrine_settings_load_total{kind=cached}",
        "vitrine_settings_invalidate_total{}",
        "vitrine_settings_load_ms{kind=fresh}",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_loads_are_counted_as_shared() {
    let snapshotter = snapshotter();

    let cache = Arc::new(cache_over(MemoryStore::new()));
    let loads = (0..16).map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.load().await })
    });
    let mut documents = Vec::new();
    for handle in loads {
        documents.push(handle.await.expect("load task"));
    }

    assert!(documents.windows(2).all(|pair| pair[0] == pair[1]));
    let names = series(snapshotter);
    assert!(names.contains("vitrine_settings_load_total{kind=fresh}"));
    assert!(
        names.contains("vitrine_settings_load_total{kind=shared}")
            || names.contains("vitrine_settings_load_total{kind=cached}"),
        "joined loads must be recorded: {names:?}"
    );
}
