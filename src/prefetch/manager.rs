use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::Arc,
};

use log::{
    debug,
    warn,
};

use super::{
    compute_window,
    EvictionPolicy,
    ImageLoader,
};
use crate::{
    config::EngineConfig,
    core::{
        tasks::TaskManager,
        FlashcardError,
        FlashcardItem,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Loaded,
    Failed,
}

/// Keeps the images around the current card warm.
///
/// Each URL is in at most one state; a URL with any state is never requested again until
/// it is evicted or explicitly retried.
pub struct PrefetchManager {
    loader: Arc<dyn ImageLoader>,
    radius: usize,
    eviction: EvictionPolicy,
    states: HashMap<String, ImageState>,
    window: HashSet<String>,
}

impl PrefetchManager {
    pub fn new(loader: Arc<dyn ImageLoader>, config: &EngineConfig) -> Self {
        Self {
            loader,
            radius: config.prefetch_radius,
            eviction: config.eviction,
            states: HashMap::new(),
            window: HashSet::new(),
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Recomputes the window around `position` and requests whatever is missing.
    ///
    /// Returns the number of new load requests.
    pub fn refresh(
        &mut self,
        tasks: &TaskManager,
        items: &[Arc<FlashcardItem>],
        position: usize,
    ) -> usize {
        let urls: Vec<String> = compute_window(position, items.len(), self.radius)
            .into_iter()
            .map(|index| items[index].image_url.clone())
            .collect();

        self.window = urls.iter().cloned().collect();
        if self.eviction == EvictionPolicy::OutsideWindow {
            self.evict_outside_window();
        }

        self.ensure_loaded(tasks, &urls)
    }

    pub fn ensure_loaded(&mut self, tasks: &TaskManager, urls: &[String]) -> usize {
        let mut requested = 0;

        for url in urls {
            if self.states.contains_key(url) {
                continue;
            }
            self.states.insert(url.clone(), ImageState::Pending);
            tasks.load_image(&self.loader, url.clone());
            requested += 1;
        }

        if requested > 0 {
            debug!("[Prefetch] Requested {} image(s)", requested);
        }
        requested
    }

    /// Records a load result. Results for URLs outside the window are kept as well.
    pub fn on_loaded(&mut self, url: &str, result: Result<(), FlashcardError>) -> ImageState {
        let state = match result {
            Ok(()) => ImageState::Loaded,
            Err(e) => {
                warn!("[Prefetch] Failed to load {}: {}", url, e);
                ImageState::Failed
            }
        };

        self.states.insert(url.to_string(), state);
        state
    }

    /// Forgets failed URLs and re-requests the ones inside the current window.
    pub fn retry_failed(&mut self, tasks: &TaskManager) -> usize {
        let failed: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| **state == ImageState::Failed)
            .map(|(url, _)| url.clone())
            .collect();

        for url in &failed {
            self.states.remove(url);
        }

        let in_window: Vec<String> =
            failed.into_iter().filter(|url| self.window.contains(url)).collect();
        self.ensure_loaded(tasks, &in_window)
    }

    pub fn state(&self, url: &str) -> Option<ImageState> {
        self.states.get(url).copied()
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.state(url) == Some(ImageState::Loaded)
    }

    pub fn in_window(&self, url: &str) -> bool {
        self.window.contains(url)
    }

    pub fn count(&self, state: ImageState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// Bytes for a loaded image, when the loader keeps them.
    pub fn image_bytes(&self, url: &str) -> Option<Arc<[u8]>> {
        if !self.is_loaded(url) {
            return None;
        }
        self.loader.image_bytes(url)
    }

    fn evict_outside_window(&mut self) {
        let evicted: Vec<String> = self
            .states
            .iter()
            .filter(|(url, state)| **state != ImageState::Failed && !self.window.contains(*url))
            .map(|(url, _)| url.clone())
            .collect();

        for url in &evicted {
            self.states.remove(url);
            self.loader.release(url);
        }

        if !evicted.is_empty() {
            debug!("[Prefetch] Evicted {} image(s) outside the window", evicted.len());
        }
    }
}
