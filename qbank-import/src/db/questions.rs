//! SQLite question store

use async_trait::async_trait;
use qbank_common::question::{CanonicalQuestion, QuestionRecord};
use qbank_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

use super::QuestionStore;
use crate::services::question_id;

/// Questions are stored as JSON documents keyed by canonical id
#[derive(Clone)]
pub struct SqliteQuestionStore {
    pool: SqlitePool,
}

impl SqliteQuestionStore {
    /// `pool` must already have the questions table (see `qbank_common::db`)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl QuestionStore for SqliteQuestionStore {
    async fn get_question(&self, id: &str) -> Result<Option<CanonicalQuestion>> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM questions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        data.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    async fn save_question(&self, record: &QuestionRecord) -> Result<()> {
        let question = &record.question;
        let data = serde_json::to_string(question)?;
        let import_info = serde_json::to_string(&record.import_info)?;

        sqlx::query(
            r#"
            INSERT INTO questions (id, subject_id, domain_id, data, validation_status, import_info, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                subject_id = excluded.subject_id,
                domain_id = excluded.domain_id,
                data = excluded.data,
                validation_status = excluded.validation_status,
                import_info = excluded.import_info,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&question.id)
        .bind(&question.metadata.subject_id)
        .bind(&question.metadata.domain_id)
        .bind(data)
        .bind(record.validation_status.as_str())
        .bind(import_info)
        .execute(&self.pool)
        .await?;

        debug!("Saved question {}", question.id);
        Ok(())
    }

    async fn next_sequence_number(&self, subject_id: &str, domain_id: &str) -> Result<u64> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM questions WHERE subject_id = ? AND domain_id = ?",
        )
        .bind(subject_id)
        .bind(domain_id)
        .fetch_all(&self.pool)
        .await?;

        let highest = ids
            .iter()
            .filter_map(|id| question_id::sequence_number(id))
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }
}
