//! Database initialization
//!
//! Opens the question bank database and creates the `questions` table on
//! first use. Safe to call on every start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

/// Open a connection pool for `database_url` and ensure the schema exists
///
/// Imports write strictly sequentially, so a single connection is enough.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_questions_table(&pool).await?;

    info!("Question bank database ready");
    Ok(pool)
}

/// Create the questions table
///
/// `data` and `import_info` hold JSON documents; `subject_id`/`domain_id`
/// are denormalized for sequence lookups.
pub async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            subject_id TEXT NOT NULL,
            domain_id TEXT NOT NULL,
            data TEXT NOT NULL,
            publication_status TEXT NOT NULL DEFAULT 'draft',
            validation_status TEXT NOT NULL DEFAULT 'valid',
            import_info TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_questions_subject_domain ON questions(subject_id, domain_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
