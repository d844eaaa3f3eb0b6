//! Error types for fetching a question batch.

use thiserror::Error;

/// Why the question bank could not hand out a batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question bank answered with response code {0}")]
    ResponseCode(u8),
    #[error("question bank returned no questions")]
    Empty,
    #[error("malformed question: {0}")]
    Malformed(String),
}

/// The only failure a quiz session can run into.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    SourceUnavailable(#[from] SourceError),
}
