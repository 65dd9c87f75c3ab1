//! Quiz-plugin JSON export reader
//!
//! The export nests questions two levels deep:
//! `{ "question": { "<quiz id>": { "<question id>": { "_id": ..., ... } } } }`.
//! Quizzes and questions are flattened into one list in document order.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::models::SourceRecord;

/// Parsed export plus a fingerprint of the file it came from
#[derive(Debug, Clone)]
pub struct SourceExport {
    pub records: Vec<SourceRecord>,
    /// SHA-256 of the raw file, hex
    pub sha256: String,
}

/// Read and flatten an export file
///
/// Fails on unreadable or malformed files and on exports with no questions.
pub async fn load_source_export(path: &Path) -> Result<SourceExport> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ImportError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let content = String::from_utf8(bytes).map_err(|e| ImportError::Load {
        path: path.to_path_buf(),
        message: format!("not valid UTF-8: {}", e),
    })?;

    let records = parse_source_export(&content).map_err(|message| ImportError::Load {
        path: path.to_path_buf(),
        message,
    })?;

    if records.is_empty() {
        return Err(ImportError::EmptySource(path.to_path_buf()));
    }

    info!("Loaded {} questions from {}", records.len(), path.display());
    Ok(SourceExport { records, sha256 })
}

/// Flatten export JSON into records
///
/// A question whose `_id` is missing takes its numeric dictionary key.
pub fn parse_source_export(json: &str) -> std::result::Result<Vec<SourceRecord>, String> {
    let document: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let Some(quizzes) = document.get("question") else {
        warn!("Export has no \"question\" section");
        return Ok(Vec::new());
    };
    let quizzes = quizzes
        .as_object()
        .ok_or_else(|| "\"question\" must be an object keyed by quiz".to_string())?;

    let mut records = Vec::new();
    for (quiz_key, quiz) in quizzes {
        let Some(questions) = quiz.as_object() else {
            warn!("Skipping quiz {}: not an object", quiz_key);
            continue;
        };
        debug!("Quiz {}: {} questions", quiz_key, questions.len());

        for (question_key, data) in questions {
            let mut data = data.clone();
            let Some(fields) = data.as_object_mut() else {
                warn!("Skipping question {}/{}: not an object", quiz_key, question_key);
                continue;
            };
            if fields.get("_id").map_or(true, Value::is_null) {
                if let Ok(id) = question_key.parse::<u64>() {
                    fields.insert("_id".to_string(), Value::from(id));
                }
            }

            let record: SourceRecord = serde_json::from_value(data)
                .map_err(|e| format!("question {}/{}: {}", quiz_key, question_key, e))?;
            records.push(record);
        }
    }

    Ok(records)
}
