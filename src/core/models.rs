use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Path of the synthesized category that matches every card.
pub const ALL_CATEGORY_PATH: &str = "통합";
pub const ALL_CATEGORY_KOR_NAME: &str = "통합";
pub const ALL_CATEGORY_ENG_NAME: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Kor,
    Eng,
}

impl Language {
    /// Prefix a voice locale must start with to be used for this language.
    pub fn locale_prefix(&self) -> &'static str {
        match self {
            Language::Kor => "ko",
            Language::Eng => "en",
        }
    }

    pub fn bcp47(&self) -> &'static str {
        match self {
            Language::Kor => "ko-KR",
            Language::Eng => "en-US",
        }
    }
}

/// Stable identity of a card: its category plus its slot in that category's source listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    pub category: String,
    pub slot: usize,
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.category, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardItem {
    pub id: CardKey,
    pub kor_word: String,
    pub eng_word: String,
    pub image_url: String,
    pub category: String,       // CategoryDescriptor path
    pub order: Option<i64>,     // Sort hint inside the category
    pub catalog_index: usize,   // Position in the flattened catalog
}

impl FlashcardItem {
    pub fn word(&self, language: Language) -> &str {
        match language {
            Language::Kor => &self.kor_word,
            Language::Eng => &self.eng_word,
        }
    }

    /// Sort key within the item's category: the order hint, else the source slot.
    pub fn order_key(&self) -> i64 {
        self.order.unwrap_or(self.id.slot as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub path: String,
    pub kor_name: String,
    pub eng_name: String,
}

impl CategoryDescriptor {
    pub fn all() -> Self {
        Self {
            path: ALL_CATEGORY_PATH.to_string(),
            kor_name: ALL_CATEGORY_KOR_NAME.to_string(),
            eng_name: ALL_CATEGORY_ENG_NAME.to_string(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.path == ALL_CATEGORY_PATH
    }

    pub fn display_name(&self, language: Language) -> &str {
        match language {
            Language::Kor => &self.kor_name,
            Language::Eng => &self.eng_name,
        }
    }
}
