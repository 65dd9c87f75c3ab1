//! Question bank persistence
//!
//! The importer only talks to persistence through [`QuestionStore`], so
//! dry runs and tests need no live backend.

pub mod questions;

use async_trait::async_trait;
use qbank_common::question::{CanonicalQuestion, QuestionRecord};
use qbank_common::Result;

pub use questions::SqliteQuestionStore;

/// Persistence collaborator used by live imports
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn get_question(&self, id: &str) -> Result<Option<CanonicalQuestion>>;

    /// Insert or replace a question
    async fn save_question(&self, record: &QuestionRecord) -> Result<()>;

    /// Highest stored sequence number for the subject/domain plus one (1 when empty)
    async fn next_sequence_number(&self, subject_id: &str, domain_id: &str) -> Result<u64>;
}

/// Connect to the question bank and prepare its schema
pub async fn open_store(database_url: &str) -> Result<SqliteQuestionStore> {
    let pool = qbank_common::db::init_database(database_url).await?;
    Ok(SqliteQuestionStore::new(pool))
}
