use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};

use futures::future::BoxFuture;
use log::debug;
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    http::{
        get_bytes,
        http_client,
    },
    FlashcardError,
};

pub mod manager;
pub mod window;

pub use manager::{
    ImageState,
    PrefetchManager,
};
pub use window::compute_window;

/// Platform image fetch. Resolves once the image is usable for rendering.
///
/// Loaders backed by a platform texture cache can ignore the byte accessors; loaders that
/// own the decoded data hand it out through [`ImageLoader::image_bytes`].
pub trait ImageLoader: Send + Sync {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), FlashcardError>>;

    fn image_bytes(&self, _url: &str) -> Option<Arc<[u8]>> {
        None
    }

    /// Called when the prefetch window stops tracking `url`.
    fn release(&self, _url: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Never,
    OutsideWindow,
}

type ImageBytes = Arc<Mutex<HashMap<String, Arc<[u8]>>>>;

/// Downloads each image once and keeps the body until the prefetch window releases it.
pub struct HttpImageLoader {
    client: Client,
    bytes: ImageBytes,
}

impl HttpImageLoader {
    pub fn new() -> Result<Self, FlashcardError> {
        Ok(Self { client: http_client()?, bytes: Arc::new(Mutex::new(HashMap::new())) })
    }

    pub fn cached_count(&self) -> usize {
        self.bytes.lock().map(|bytes| bytes.len()).unwrap_or(0)
    }

    fn store(bytes: &ImageBytes, url: String, body: Vec<u8>) {
        if let Ok(mut bytes) = bytes.lock() {
            bytes.insert(url, Arc::from(body));
        }
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), FlashcardError>> {
        let client = self.client.clone();
        let bytes = Arc::clone(&self.bytes);
        let url = url.to_string();

        Box::pin(async move {
            let body = get_bytes(&client, &url).await?;
            if body.is_empty() {
                return Err(FlashcardError::ImageLoad { url, reason: "empty body".into() });
            }
            Self::store(&bytes, url, body);
            Ok(())
        })
    }

    fn image_bytes(&self, url: &str) -> Option<Arc<[u8]>> {
        self.bytes.lock().ok()?.get(url).cloned()
    }

    fn release(&self, url: &str) {
        if let Ok(mut bytes) = self.bytes.lock() {
            if bytes.remove(url).is_some() {
                debug!("[Prefetch] Released bytes for {}", url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_loader_keeps_bytes_until_released() {
        let loader = HttpImageLoader::new().unwrap();
        let url = "https://img.test/cat.png";
        assert!(loader.image_bytes(url).is_none());

        HttpImageLoader::store(&loader.bytes, url.to_string(), vec![0x89, b'P', b'N', b'G']);
        assert_eq!(loader.image_bytes(url).as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
        assert_eq!(loader.cached_count(), 1);

        loader.release(url);
        assert!(loader.image_bytes(url).is_none());
        assert_eq!(loader.cached_count(), 0);
    }
}
