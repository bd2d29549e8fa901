//! Error types for claim categorization

use thiserror::Error;

use crate::service::llm::TextGenerationError;

/// Why a single categorization attempt failed
///
/// Both kinds are retried by the same loop; neither escapes the categorizer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CategorizationError {
    #[error("Text generation request failed: {0}")]
    Transport(#[from] TextGenerationError),

    #[error("Model output is not valid JSON: {source}")]
    MalformedExtraction {
        source: serde_json::Error,
        raw: String,
    },
}

impl CategorizationError {
    /// Raw text to keep for diagnosis, if any was received
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            CategorizationError::Transport(e) => e.body(),
            CategorizationError::MalformedExtraction { raw, .. } => Some(raw),
        }
    }
}
