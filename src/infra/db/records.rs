use async_trait::async_trait;
use serde_json::Value;

use crate::application::repos::{RecordStore, RepoError};

use super::PostgresRepositories;
use super::util::{like_prefix, map_table_error};

#[async_trait]
impl RecordStore for PostgresRepositories {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepoError> {
        let table = self.tables.records.as_str();
        let sql = format!("SELECT value FROM {table} WHERE key = $1");
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(key)
            .fetch_optional(self.pool())
            .await
            .map_err(map_table_error(table))
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, RepoError> {
        let table = self.tables.records.as_str();
        let sql = format!("SELECT value FROM {table} WHERE key LIKE $1 ESCAPE '\\' ORDER BY key");
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(like_prefix(prefix))
            .fetch_all(self.pool())
            .await
            .map_err(map_table_error(table))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepoError> {
        let table = self.tables.records.as_str();
        let sql = format!(
            "INSERT INTO {table} (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value"
        );
        sqlx::query(&sql)
            .bind(key)
            .bind(value)
            .execute(self.pool())
            .await
            .map_err(map_table_error(table))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepoError> {
        let table = self.tables.records.as_str();
        let sql = format!("DELETE FROM {table} WHERE key = $1");
        sqlx::query(&sql)
            .bind(key)
            .execute(self.pool())
            .await
            .map_err(map_table_error(table))?;
        Ok(())
    }
}
