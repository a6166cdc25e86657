use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;

use crate::application::repos::{RepoError, SettingsRow, SettingsStore};

use super::PostgresRepositories;
use super::util::map_table_error;

#[derive(sqlx::FromRow)]
struct GlobalSettingsRow {
    key: String,
    settings: Value,
    updated_at: OffsetDateTime,
    updated_by: Option<String>,
}

impl From<GlobalSettingsRow> for SettingsRow {
    fn from(row: GlobalSettingsRow) -> Self {
        Self {
            key: row.key,
            settings: row.settings,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        }
    }
}

#[async_trait]
impl SettingsStore for PostgresRepositories {
    async fn fetch_row(&self, key: &str) -> Result<Option<SettingsRow>, RepoError> {
        let table = self.tables.settings.as_str();
        let sql = format!(
            "SELECT key, settings, updated_at, updated_by FROM {table} WHERE key = $1"
        );
        let row = sqlx::query_as::<_, GlobalSettingsRow>(&sql)
            .bind(key)
            .fetch_optional(self.pool())
            .await
            .map_err(map_table_error(table))?;
        Ok(row.map(SettingsRow::from))
    }

    async fn row_exists(&self, key: &str) -> Result<bool, RepoError> {
        let table = self.tables.settings.as_str();
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE key = $1)");
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(key)
            .fetch_one(self.pool())
            .await
            .map_err(map_table_error(table))
    }

    async fn insert_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
        let table = self.tables.settings.as_str();
        let sql = format!(
            "INSERT INTO {table} (key, settings, updated_at, updated_by) VALUES ($1, $2, $3, $4)"
        );
        sqlx::query(&sql)
            .bind(&row.key)
            .bind(&row.settings)
            .bind(row.updated_at)
            .bind(row.updated_by.as_deref())
            .execute(self.pool())
            .await
            .map_err(map_table_error(table))?;
        Ok(())
    }

    async fn update_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
        let table = self.tables.settings.as_str();
        let sql = format!(
            "UPDATE {table} SET settings = $2, updated_at = $3, updated_by = $4 WHERE key = $1"
        );
        let result = sqlx::query(&sql)
            .bind(&row.key)
            .bind(&row.settings)
            .bind(row.updated_at)
            .bind(row.updated_by.as_deref())
            .execute(self.pool())
            .await
            .map_err(map_table_error(table))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
