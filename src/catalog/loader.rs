use std::sync::Arc;

use chrono::{
    DateTime,
    Duration,
    Utc,
};
use futures::future::BoxFuture;
use log::{
    debug,
    info,
    warn,
};
use reqwest::Client;

use super::{
    cache::{
        CachedCatalog,
        CatalogCache,
        FileCatalogCache,
    },
    Catalog,
};
use crate::{
    config::EngineConfig,
    core::{
        http::{
            get_text,
            http_client,
        },
        FlashcardError,
    },
};

/// Where a fresh copy of the catalog document comes from.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FlashcardError>>;
}

pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: &str) -> Result<Self, FlashcardError> {
        Ok(Self { client: http_client()?, url: url.to_string() })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FlashcardError>> {
        let client = self.client.clone();
        let url = self.url.clone();
        Box::pin(async move { get_text(&client, &url).await })
    }
}

/// Cache-first catalog loading with a freshness window.
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    cache: Arc<dyn CatalogCache>,
    max_age: Duration,
}

impl CatalogLoader {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        cache: Arc<dyn CatalogCache>,
        max_age: Duration,
    ) -> Self {
        Self { source, cache, max_age }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, FlashcardError> {
        let source = HttpCatalogSource::new(&config.catalog_url)?;
        let cache = FileCatalogCache::in_app_data(&config.cache_key);
        Ok(Self::new(Arc::new(source), Arc::new(cache), config.cache_max_age()))
    }

    pub async fn load_at(&self, now: DateTime<Utc>) -> Result<Catalog, FlashcardError> {
        if let Some(catalog) = self.read_fresh_cache(now) {
            return Ok(catalog);
        }

        info!("[Catalog] Fetching catalog document");
        let body = self.source.fetch().await?;
        let catalog = Catalog::parse(&body)?;
        info!(
            "[Catalog] Loaded {} cards in {} categories",
            catalog.len(),
            catalog.categories().len() - 1
        );

        if let Err(e) = self.cache.write(&CachedCatalog::new(body, now)) {
            warn!("[Catalog] Failed to update cache: {}", e);
        }

        Ok(catalog)
    }

    fn read_fresh_cache(&self, now: DateTime<Utc>) -> Option<Catalog> {
        let entry = match self.cache.read() {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!("[Catalog] Ignoring unreadable cache: {}", e);
                return None;
            }
        };

        if !entry.is_fresh(now, self.max_age) {
            debug!("[Catalog] Cache entry from {} is stale", entry.stored_at);
            return None;
        }

        match Catalog::parse(&entry.body) {
            Ok(catalog) => {
                debug!("[Catalog] Using cached catalog from {}", entry.stored_at);
                Some(catalog)
            }
            Err(e) => {
                warn!("[Catalog] Ignoring corrupt cache entry: {}", e);
                None
            }
        }
    }
}
