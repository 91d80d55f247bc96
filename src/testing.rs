//! Fakes shared by the unit tests.

use std::{
    collections::HashSet,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
};

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::{
    catalog::{
        Catalog,
        CatalogSource,
    },
    core::{
        CardKey,
        FlashcardError,
        FlashcardItem,
    },
    prefetch::ImageLoader,
    speech::{
        SpeechEngine,
        SpeechError,
        Utterance,
        Voice,
    },
};

pub const SAMPLE_CATALOG_JSON: &str = r#"{
  "categories": [
    {
      "path": "Animal",
      "korName": "동물",
      "engName": "Animal",
      "items": [
        { "kor_word": "고양이", "eng_word": "Cat", "image": "https://img.test/cat.png",
          "category": { "path": "Animal", "kor": "동물", "eng": "Animal" } },
        { "kor_word": "강아지", "eng_word": "Dog", "image": "https://img.test/dog.png",
          "category": { "path": "Animal", "kor": "동물", "eng": "Animal" } }
      ]
    },
    {
      "path": "Fruit",
      "korName": "과일",
      "engName": "Fruit",
      "items": [
        { "kor_word": "사과", "eng_word": "Apple", "image": "https://img.test/apple.png" },
        { "kor_word": "바나나", "eng_word": "Banana", "image": "https://img.test/banana.png" },
        { "kor_word": "포도", "eng_word": "Grape", "image": "https://img.test/grape.png" }
      ]
    }
  ]
}"#;

pub fn sample_catalog() -> Catalog {
    Catalog::parse(SAMPLE_CATALOG_JSON).unwrap()
}

/// `count` cards in a single category with images `https://img.test/<n>.png`.
pub fn numbered_items(count: usize) -> Vec<Arc<FlashcardItem>> {
    (0..count)
        .map(|n| {
            Arc::new(FlashcardItem {
                id: CardKey { category: "Numbers".into(), slot: n },
                kor_word: format!("숫자{n}"),
                eng_word: format!("number {n}"),
                image_url: format!("https://img.test/{n}.png"),
                category: "Numbers".into(),
                order: None,
                catalog_index: n,
            })
        })
        .collect()
}

/// Serves a fixed body or HTTP status; the response can be swapped between fetches.
pub struct StaticCatalogSource {
    response: Mutex<Result<String, u16>>,
    fetches: AtomicUsize,
}

impl StaticCatalogSource {
    pub fn ok(body: &str) -> Self {
        Self { response: Mutex::new(Ok(body.to_string())), fetches: AtomicUsize::new(0) }
    }

    pub fn status(status: u16) -> Self {
        Self { response: Mutex::new(Err(status)), fetches: AtomicUsize::new(0) }
    }

    pub fn respond_with(&self, body: &str) {
        *self.response.lock().unwrap() = Ok(body.to_string());
    }

    pub fn fail_with(&self, status: u16) {
        *self.response.lock().unwrap() = Err(status);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl CatalogSource for StaticCatalogSource {
    fn fetch(&self) -> BoxFuture<'static, Result<String, FlashcardError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = self.response.lock().unwrap().clone();
        let response = response.map_err(|status| FlashcardError::HttpStatus {
            status,
            url: "https://catalog.test/flashcards.json".into(),
        });
        Box::pin(async move { response })
    }
}

/// Records utterances; each one stays in flight until finished or cancelled.
pub struct FakeSpeechEngine {
    voices: Vec<Voice>,
    spoken: Mutex<Vec<Utterance>>,
    in_flight: Mutex<Vec<oneshot::Sender<Result<(), SpeechError>>>>,
    cancels: AtomicUsize,
}

impl FakeSpeechEngine {
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            spoken: Mutex::new(Vec::new()),
            in_flight: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn korean() -> Self {
        Self::with_voices(vec![
            Voice { name: "Yuna".into(), locale: "ko-KR".into(), is_default: false },
            Voice { name: "Samantha".into(), locale: "en-US".into(), is_default: true },
        ])
    }

    pub fn without_voices() -> Self {
        Self::with_voices(Vec::new())
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn finish_latest(&self, result: Result<(), SpeechError>) {
        if let Some(sender) = self.in_flight.lock().unwrap().pop() {
            let _ = sender.send(result);
        }
    }
}

impl SpeechEngine for FakeSpeechEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance) -> BoxFuture<'static, Result<(), SpeechError>> {
        let (sender, receiver) = oneshot::channel();
        self.spoken.lock().unwrap().push(utterance);
        self.in_flight.lock().unwrap().push(sender);

        Box::pin(async move { receiver.await.unwrap_or(Err(SpeechError::Interrupted)) })
    }

    fn cancel_all(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        for sender in self.in_flight.lock().unwrap().drain(..) {
            let _ = sender.send(Err(SpeechError::Interrupted));
        }
    }
}

/// Resolves every load immediately and records the request order.
///
/// A loaded image's bytes are its URL.
pub struct CountingImageLoader {
    requests: Mutex<Vec<String>>,
    releases: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl CountingImageLoader {
    pub fn new() -> Self {
        Self::failing(Vec::<String>::new())
    }

    pub fn failing<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            releases: Mutex::new(Vec::new()),
            failing: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count_for(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn released(&self) -> Vec<String> {
        self.releases.lock().unwrap().clone()
    }
}

impl ImageLoader for CountingImageLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<(), FlashcardError>> {
        self.requests.lock().unwrap().push(url.to_string());

        let result = if self.failing.contains(url) {
            Err(FlashcardError::ImageLoad { url: url.to_string(), reason: "404".into() })
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn image_bytes(&self, url: &str) -> Option<Arc<[u8]>> {
        if self.failing.contains(url) || self.count_for(url) == 0 {
            return None;
        }
        Some(Arc::from(url.as_bytes()))
    }

    fn release(&self, url: &str) {
        self.releases.lock().unwrap().push(url.to_string());
    }
}
