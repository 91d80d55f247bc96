use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use chrono::{
    DateTime,
    Duration,
    Utc,
};

use crate::{
    core::FlashcardError,
    persistence::get_app_data_dir,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CachedCatalog {
    pub body: String,
    pub stored_at: DateTime<Utc>,
}

impl CachedCatalog {
    pub fn new(body: String, stored_at: DateTime<Utc>) -> Self {
        Self { body, stored_at }
    }

    /// A timestamp from the future never counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age >= Duration::zero() && age < max_age
    }
}

/// Key/timestamp store for the raw catalog document.
pub trait CatalogCache: Send + Sync {
    fn read(&self) -> Result<Option<CachedCatalog>, FlashcardError>;
    fn write(&self, entry: &CachedCatalog) -> Result<(), FlashcardError>;
}

/// Stores `<key>.json` next to a `<key>_timestamp` file holding an RFC 3339 instant.
#[derive(Debug, Clone)]
pub struct FileCatalogCache {
    dir: PathBuf,
    key: String,
}

impl FileCatalogCache {
    pub fn new(dir: PathBuf, key: &str) -> Self {
        Self { dir, key: key.to_string() }
    }

    pub fn in_app_data(key: &str) -> Self {
        Self::new(get_app_data_dir(), key)
    }

    fn body_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn timestamp_path(&self) -> PathBuf {
        self.dir.join(format!("{}_timestamp", self.key))
    }
}

impl CatalogCache for FileCatalogCache {
    fn read(&self) -> Result<Option<CachedCatalog>, FlashcardError> {
        let body_path = self.body_path();
        let timestamp_path = self.timestamp_path();

        if !body_path.exists() || !timestamp_path.exists() {
            return Ok(None);
        }

        let body = fs::read_to_string(&body_path)?;
        let raw_timestamp = fs::read_to_string(&timestamp_path)?;
        let stored_at = DateTime::parse_from_rfc3339(raw_timestamp.trim())
            .map_err(|e| {
                FlashcardError::Custom(format!(
                    "Invalid cache timestamp in {}: {}",
                    timestamp_path.display(),
                    e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Some(CachedCatalog { body, stored_at }))
    }

    fn write(&self, entry: &CachedCatalog) -> Result<(), FlashcardError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.body_path(), &entry.body)?;
        fs::write(self.timestamp_path(), entry.stored_at.to_rfc3339())?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCatalogCache {
    entry: Mutex<Option<CachedCatalog>>,
}

impl MemoryCatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: CachedCatalog) -> Self {
        Self { entry: Mutex::new(Some(entry)) }
    }
}

impl CatalogCache for MemoryCatalogCache {
    fn read(&self) -> Result<Option<CachedCatalog>, FlashcardError> {
        self.entry
            .lock()
            .map(|entry| entry.clone())
            .map_err(|_| FlashcardError::Custom("Catalog cache lock poisoned".into()))
    }

    fn write(&self, entry: &CachedCatalog) -> Result<(), FlashcardError> {
        let mut slot = self
            .entry
            .lock()
            .map_err(|_| FlashcardError::Custom("Catalog cache lock poisoned".into()))?;
        *slot = Some(entry.clone());
        Ok(())
    }
}
