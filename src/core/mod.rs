pub mod errors;
pub mod http;
pub mod models;
pub mod tasks;

pub use errors::FlashcardError;
pub use models::{
    CardKey,
    CategoryDescriptor,
    FlashcardItem,
    Language,
    ALL_CATEGORY_PATH,
};
