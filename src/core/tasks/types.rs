pub use super::handle::{
    CancellableTask,
    TaskHandle,
};
use crate::{
    catalog::Catalog,
    core::FlashcardError,
    speech::SpeechOutcome,
};

pub type CatalogLoadResult = Result<Catalog, FlashcardError>;

#[derive(Debug)]
pub enum TaskResult {
    CatalogLoaded(CatalogLoadResult),

    AutoplayTick { generation: u64 },

    SpeechSettled { generation: u64 },
    SpeechFinished { generation: u64, outcome: SpeechOutcome },

    ImageLoaded { url: String, result: Result<(), FlashcardError> },

    QuizFeedbackElapsed { generation: u64 },
}
