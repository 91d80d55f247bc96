//! Card sequencing and presentation engine for a picture-word flashcard app.
//!
//! A UI shell owns a [`Session`], calls [`Session::update`] once per frame and renders
//! [`Session::current_view`]. Speech and image loading are supplied by the platform through
//! [`SpeechEngine`] and [`ImageLoader`].

pub mod catalog;
pub mod config;
pub mod core;
pub mod persistence;
pub mod playback;
pub mod prefetch;
pub mod quiz;
pub mod session;
pub mod speech;

#[cfg(test)]
mod testing;

pub use catalog::{
    Catalog,
    CatalogLoader,
    CategorySelection,
};
pub use config::{
    EngineConfig,
    PlaybackConfig,
    Settings,
};
pub use crate::core::{
    tasks::TaskManager,
    CardKey,
    CategoryDescriptor,
    FlashcardError,
    FlashcardItem,
    Language,
};
pub use prefetch::{
    EvictionPolicy,
    ImageLoader,
};
pub use quiz::AnswerFeedback;
pub use session::{
    CardView,
    Key,
    Navigation,
    Services,
    Session,
    SessionEvent,
    ViewState,
};
pub use speech::{
    SpeechEngine,
    SpeechError,
    Utterance,
    Voice,
};
