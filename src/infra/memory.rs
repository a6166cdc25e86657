//! In-process stores for tests and database-less runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use crate::application::repos::{RecordStore, RepoError, SettingsRow, SettingsStore};

const SETTINGS_TABLE: &str = "global_settings";

/// Record store and settings table kept in concurrent maps.
///
/// The settings table can be marked absent to reproduce a database whose
/// schema was never set up.
#[derive(Debug)]
pub struct MemoryStore {
    records: DashMap<String, Value>,
    settings: DashMap<String, SettingsRow>,
    settings_table_present: AtomicBool,
    settings_operations: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            settings: DashMap::new(),
            settings_table_present: AtomicBool::new(true),
            settings_operations: AtomicUsize::new(0),
        }
    }

    pub fn without_settings_table() -> Self {
        let store = Self::new();
        store.set_settings_table_present(false);
        store
    }

    pub fn set_settings_table_present(&self, present: bool) {
        self.settings_table_present.store(present, Ordering::SeqCst);
    }

    /// Seed a settings row without counting it as a store operation.
    pub fn put_settings_row(&self, row: SettingsRow) {
        self.settings.insert(row.key.clone(), row);
    }

    /// Number of settings-store calls made so far.
    pub fn settings_operations(&self) -> usize {
        self.settings_operations.load(Ordering::SeqCst)
    }

    fn enter_settings_table(&self) -> Result<(), RepoError> {
        self.settings_operations.fetch_add(1, Ordering::SeqCst);
        if self.settings_table_present.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepoError::store_unavailable(SETTINGS_TABLE))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepoError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, RepoError> {
        let mut matches: Vec<(String, Value)> = self
            .records
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matches.into_iter().map(|(_, value)| value).collect())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepoError> {
        self.records.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepoError> {
        self.records.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn fetch_row(&self, key: &str) -> Result<Option<SettingsRow>, RepoError> {
        self.enter_settings_table()?;
        Ok(self.settings.get(key).map(|entry| entry.value().clone()))
    }

    async fn row_exists(&self, key: &str) -> Result<bool, RepoError> {
        self.enter_settings_table()?;
        Ok(self.settings.contains_key(key))
    }

    async fn insert_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
        self.enter_settings_table()?;
        match self.settings.entry(row.key.clone()) {
            Entry::Occupied(_) => Err(RepoError::from_persistence(format!(
                "duplicate key `{}` in {SETTINGS_TABLE}",
                row.key
            ))),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(())
            }
        }
    }

    async fn update_row(&self, row: &SettingsRow) -> Result<(), RepoError> {
        self.enter_settings_table()?;
        match self.settings.get_mut(&row.key) {
            Some(mut existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}
