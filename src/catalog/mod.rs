use std::{
    collections::HashSet,
    sync::Arc,
};

use crate::core::{
    CardKey,
    CategoryDescriptor,
    FlashcardError,
    FlashcardItem,
    Language,
    ALL_CATEGORY_PATH,
};

pub mod cache;
pub mod document;
pub mod loader;
pub mod selection;

pub use cache::{
    CachedCatalog,
    CatalogCache,
    FileCatalogCache,
    MemoryCatalogCache,
};
pub use document::{
    CatalogDocument,
    CategoryRecord,
    ItemRecord,
};
pub use loader::{
    CatalogLoader,
    CatalogSource,
    HttpCatalogSource,
};
pub use selection::CategorySelection;

/// In-memory card catalog. Replaced wholesale on reload, never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Arc<FlashcardItem>>,
    categories: Vec<CategoryDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self { items: Vec::new(), categories: vec![CategoryDescriptor::all()] }
    }
}

impl Catalog {
    pub fn parse(json: &str) -> Result<Self, FlashcardError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Flattens the document in category order. Any invalid record rejects the whole document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, FlashcardError> {
        let mut categories = vec![CategoryDescriptor::all()];
        let mut items = Vec::new();
        let mut seen_paths = HashSet::new();

        for category in document.categories {
            if category.path.trim().is_empty() {
                return Err(FlashcardError::InvalidCatalog("category with empty path".into()));
            }
            if category.path == ALL_CATEGORY_PATH {
                return Err(FlashcardError::InvalidCatalog(format!(
                    "category path '{}' is reserved",
                    ALL_CATEGORY_PATH
                )));
            }
            if !seen_paths.insert(category.path.clone()) {
                return Err(FlashcardError::InvalidCatalog(format!(
                    "duplicate category path '{}'",
                    category.path
                )));
            }

            for (slot, record) in category.items.into_iter().enumerate() {
                let id = CardKey { category: category.path.clone(), slot };

                if record.kor_word.trim().is_empty() || record.eng_word.trim().is_empty() {
                    return Err(FlashcardError::InvalidCatalog(format!(
                        "card {id} has an empty word"
                    )));
                }
                if record.image.trim().is_empty() {
                    return Err(FlashcardError::InvalidCatalog(format!("card {id} has no image")));
                }
                if let Some(embedded) = &record.category {
                    if embedded.path != category.path {
                        log::debug!(
                            "[Catalog] Card {} claims category '{}', using '{}'",
                            id,
                            embedded.path,
                            category.path
                        );
                    }
                }

                items.push(Arc::new(FlashcardItem {
                    id,
                    kor_word: record.kor_word,
                    eng_word: record.eng_word,
                    image_url: record.image,
                    category: category.path.clone(),
                    order: record.order,
                    catalog_index: items.len(),
                }));
            }

            categories.push(CategoryDescriptor {
                path: category.path,
                kor_name: category.kor_name,
                eng_name: category.eng_name,
            });
        }

        Ok(Self { items, categories })
    }

    pub fn items(&self) -> &[Arc<FlashcardItem>] {
        &self.items
    }

    /// All descriptors, the reserved "all" entry first.
    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.categories
    }

    pub fn category(&self, path: &str) -> Option<&CategoryDescriptor> {
        self.categories.iter().find(|c| c.path == path)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items matching the selection, in catalog order.
    pub fn filter_by(&self, selection: &CategorySelection) -> Vec<Arc<FlashcardItem>> {
        if selection.is_all() {
            return self.items.clone();
        }

        self.items.iter().filter(|item| selection.contains(&item.category)).cloned().collect()
    }

    pub fn count_in(&self, path: &str) -> usize {
        if path == ALL_CATEGORY_PATH {
            return self.items.len();
        }
        self.items.iter().filter(|item| item.category == path).count()
    }

    pub fn find_by_word(&self, word: &str, language: Language) -> Option<&Arc<FlashcardItem>> {
        let needle = word.trim().to_lowercase();
        self.items.iter().find(|item| item.word(language).to_lowercase() == needle)
    }
}
