use serde::{
    Deserialize,
    Serialize,
};

/// Wire shape of `flashcards.json` as produced by the catalog build step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub categories: Vec<CategoryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub path: String,
    pub kor_name: String,
    pub eng_name: String,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub kor_word: String,
    pub eng_word: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategoryRecord>,
}

// Denormalized copy of the enclosing category; the enclosing record wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCategoryRecord {
    pub path: String,
    #[serde(default)]
    pub kor: String,
    #[serde(default)]
    pub eng: String,
}
