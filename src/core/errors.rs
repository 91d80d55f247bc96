use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(Box<reqwest::Error>),

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("FlashcardError: {0}")]
    Custom(String),
}

impl FlashcardError {
    /// The catalog could not be fetched at all.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, FlashcardError::Network(_) | FlashcardError::HttpStatus { .. })
    }

    /// The catalog was fetched (or read from cache) but is not usable.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, FlashcardError::Json(_) | FlashcardError::InvalidCatalog(_))
    }
}

impl From<std::io::Error> for FlashcardError {
    fn from(error: std::io::Error) -> Self {
        FlashcardError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for FlashcardError {
    fn from(error: reqwest::Error) -> Self {
        FlashcardError::Network(Box::new(error))
    }
}
