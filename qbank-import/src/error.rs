//! Error types for qbank-import
//!
//! Batch-fatal errors abort the run before any record is processed.
//! Record-level errors are caught by the batch importer and folded into
//! that record's [`ImportResult`](crate::models::ImportResult).

use crate::models::UnmappedRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Import result type
pub type Result<T> = std::result::Result<T, ImportError>;

/// Importer error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source or category file could not be read or parsed (batch-fatal)
    #[error("Failed to load {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    /// Source file contains no question records (batch-fatal)
    #[error("No questions found in {}", .0.display())]
    EmptySource(PathBuf),

    /// Some records have no mappable category (batch-fatal)
    #[error("{} of {total} questions have no mappable category", .unmapped.len())]
    PrecheckFailed {
        unmapped: Vec<UnmappedRecord>,
        total: usize,
    },

    /// Live import requested without a persistence backend
    #[error("Live import requires a database URL (--database-url, QBANK_DATABASE_URL or database_url in config)")]
    MissingCredentials,

    /// Category has no matching subtopic in the taxonomy
    #[error("No matching subtopic found for category: {0}")]
    CategoryNotFound(String),

    /// Exam info in the title disagrees with the question body
    #[error("Exam info validation failed: {}", .0.join(", "))]
    ExamInfoMismatch(Vec<String>),

    /// Record or transformed question failed a structural check
    #[error("Invalid question: {}", .0.join("; "))]
    InvalidQuestion(Vec<String>),

    /// Question store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImportError {
    /// Messages to record on a failed [`ImportResult`](crate::models::ImportResult)
    ///
    /// Validation-style variants expand to one message per problem.
    pub fn into_messages(self) -> Vec<String> {
        match self {
            ImportError::ExamInfoMismatch(errors) => errors,
            ImportError::InvalidQuestion(errors) => errors,
            other => vec![other.to_string()],
        }
    }
}
