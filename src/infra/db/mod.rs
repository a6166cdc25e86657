//! Postgres-backed store implementations.

mod records;
mod settings;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
};

/// Table names the stores read and write. Both must be plain SQL identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub settings: String,
    pub records: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            settings: "global_settings".to_string(),
            records: "kv_store".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
    tables: Arc<TableNames>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool, tables: TableNames) -> Self {
        Self {
            pool: Arc::new(pool),
            tables: Arc::new(tables),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }
}
