//! Postgres store coverage. Needs a reachable `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use serde_json::json;
use sqlx::PgPool;
use time::OffsetDateTime;

use vitrine::application::repos::{RecordStore, RepoError, SettingsRow, SettingsStore};
use vitrine::application::settings::{FetchOutcome, SettingsAdapter};
use vitrine::infra::db::{PostgresRepositories, TableNames};

fn settings_row(name: &str) -> SettingsRow {
    SettingsRow {
        key: "site_config".to_string(),
        settings: json!({ "company": { "name": name } }),
        updated_at: OffsetDateTime::now_utc(),
        updated_by: Some("admin-1".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn record_store_round_trips_and_scans_by_prefix(pool: PgPool) {
    let repos = PostgresRepositories::new(pool, TableNames::default());

    repos
        .set("project:b", json!({ "id": "b" }))
        .await
        .expect("set b");
    repos
        .set("project:a", json!({ "id": "a" }))
        .await
        .expect("set a");
    repos
        .set("project_x", json!({ "id": "x" }))
        .await
        .expect("set x");
    repos
        .set("project:a", json!({ "id": "a", "v": 2 }))
        .await
        .expect("upsert a");

    let scanned = repos.get_by_prefix("project:").await.expect("scan");
    assert_eq!(scanned, vec![json!({ "id": "a", "v": 2 }), json!({ "id": "b" })]);

    repos.delete("project:a").await.expect("delete");
    repos.delete("project:a").await.expect("delete is idempotent");
    assert_eq!(repos.get("project:a").await.expect("get"), None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn settings_store_distinguishes_missing_row_from_missing_table(pool: PgPool) {
    let repos = PostgresRepositories::new(pool.clone(), TableNames::default());
    assert_eq!(repos.fetch_row("site_config").await.expect("fetch"), None);
    assert!(matches!(
        repos.update_row(&settings_row("Acme")).await,
        Err(RepoError::NotFound)
    ));

    repos
        .insert_row(&settings_row("Acme"))
        .await
        .expect("insert");
    assert!(repos.row_exists("site_config").await.expect("exists"));

    let missing = PostgresRepositories::new(
        pool,
        TableNames {
            settings: "absent_settings".to_string(),
            records: "kv_store".to_string(),
        },
    );
    assert!(matches!(
        missing.fetch_row("site_config").await,
        Err(RepoError::StoreUnavailable { .. })
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn adapter_reports_store_unavailable_for_missing_table(pool: PgPool) {
    let repos = PostgresRepositories::new(
        pool,
        TableNames {
            settings: "absent_settings".to_string(),
            records: "kv_store".to_string(),
        },
    );
    let adapter = SettingsAdapter::new(std::sync::Arc::new(repos));
    assert_eq!(adapter.fetch().await, FetchOutcome::StoreUnavailable);
}
