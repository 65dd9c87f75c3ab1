//! SQLite question store tests
//!
//! Use an in-memory database; the pool holds a single connection so the
//! schema and rows survive between calls.

mod helpers;

use helpers::{mc_record, transformer, two_column_layout, write_inputs};
use qbank_common::question::{ImportInfo, QuestionRecord, ValidationStatus};
use qbank_import::db::{self, QuestionStore};
use qbank_import::services::{BatchImporter, ImportRequest};
use qbank_import::ImportError;
use std::sync::Arc;

fn record_for(id: u64, category: &str) -> QuestionRecord {
    let question = transformer()
        .transform(&mc_record(id, category, 1))
        .unwrap();
    QuestionRecord {
        question,
        validation_status: ValidationStatus::Valid,
        import_info: ImportInfo {
            system: "wordpress".to_string(),
            original_id: id.to_string(),
            original_title: format!("שאלה {}", id),
            original_category: category.to_string(),
            run_id: "test-run".to_string(),
            imported_by: "qbank-import".to_string(),
            transformations: vec!["category-mapping".to_string()],
            imported_at: "2024-01-01T00:00:00+00:00".to_string(),
        },
    }
}

#[tokio::test]
async fn test_save_and_get_roundtrip() {
    let store = db::open_store("sqlite::memory:").await.unwrap();
    let record = record_for(12, "תכניות בטיחות");

    assert!(store.get_question("CIV-SAF-000012").await.unwrap().is_none());
    store.save_question(&record).await.unwrap();

    let loaded = store.get_question("CIV-SAF-000012").await.unwrap();
    assert_eq!(loaded, Some(record.question));
}

#[tokio::test]
async fn test_save_replaces_existing_row() {
    let store = db::open_store("sqlite::memory:").await.unwrap();
    let mut record = record_for(3, "תכניות בטיחות");
    store.save_question(&record).await.unwrap();

    record.question.content.text = "נוסח מעודכן".to_string();
    store.save_question(&record).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);

    let loaded = store.get_question("CIV-SAF-000003").await.unwrap().unwrap();
    assert_eq!(loaded.content.text, "נוסח מעודכן");

    let info: String = sqlx::query_scalar("SELECT import_info FROM questions WHERE id = ?")
        .bind("CIV-SAF-000003")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let info: ImportInfo = serde_json::from_str(&info).unwrap();
    assert_eq!(info.run_id, "test-run");
}

#[tokio::test]
async fn test_next_sequence_number() {
    let store = db::open_store("sqlite::memory:").await.unwrap();
    assert_eq!(
        store
            .next_sequence_number("civil_engineering", "construction_safety")
            .await
            .unwrap(),
        1
    );

    store.save_question(&record_for(7, "תכניות בטיחות")).await.unwrap();
    store.save_question(&record_for(41, "תכניות בטיחות")).await.unwrap();

    assert_eq!(
        store
            .next_sequence_number("civil_engineering", "construction_safety")
            .await
            .unwrap(),
        42
    );
    assert_eq!(
        store
            .next_sequence_number("civil_engineering", "other_domain")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_live_batch_into_sqlite() {
    let store = Arc::new(db::open_store("sqlite::memory:").await.unwrap());
    let importer = BatchImporter::live(transformer(), store.clone());

    let records = vec![
        mc_record(1, "תכניות בטיחות", 0),
        mc_record(2, "גגות שבירים תלולים", 3),
    ];
    let batch = importer.process(&records).await;
    assert_eq!(batch.stats.successful, 2);

    let roof = store.get_question("CIV-SAF-000002").await.unwrap().unwrap();
    assert_eq!(roof.metadata.subtopic_id, "fragile_roofs");
    assert_eq!(roof.answer.final_answer.unwrap().value, 4);
}

#[tokio::test]
async fn test_validation_status_is_stored() {
    let store = db::open_store("sqlite::memory:").await.unwrap();
    let mut record = record_for(8, "תכניות בטיחות");
    record.validation_status = ValidationStatus::Warning;
    store.save_question(&record).await.unwrap();

    let status: String =
        sqlx::query_scalar("SELECT validation_status FROM questions WHERE id = ?")
            .bind("CIV-SAF-000008")
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(status, "warning");

    record.validation_status = ValidationStatus::Valid;
    store.save_question(&record).await.unwrap();
    let status: String =
        sqlx::query_scalar("SELECT validation_status FROM questions WHERE id = ?")
            .bind("CIV-SAF-000008")
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(status, "valid");
}

fn bank_url(dir: &std::path::Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("bank.db").display())
}

#[tokio::test]
async fn test_rejected_batch_never_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        mc_record(1, "תכניות בטיחות", 0),
        mc_record(2, "קטגוריה שלא קיימת", 0),
    ];
    let (source_path, categories_path) = write_inputs(dir.path(), &records);
    let request = ImportRequest {
        source_path,
        categories_path,
        spreadsheet: two_column_layout(),
    };

    let result = BatchImporter::live_at(transformer(), bank_url(dir.path()))
        .run(&request)
        .await;

    assert!(matches!(result, Err(ImportError::PrecheckFailed { .. })));
    assert!(!dir.path().join("bank.db").exists());
}

#[tokio::test]
async fn test_live_run_connects_after_precheck() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        mc_record(1, "תכניות בטיחות", 0),
        mc_record(2, "הקמת מבני מתכת", 1),
    ];
    let (source_path, categories_path) = write_inputs(dir.path(), &records);
    let request = ImportRequest {
        source_path,
        categories_path,
        spreadsheet: two_column_layout(),
    };

    let importer = BatchImporter::live_at(transformer(), bank_url(dir.path()));
    let outcome = importer.run(&request).await.unwrap();
    assert_eq!(outcome.report.stats.successful, 2);
    drop(importer);

    assert!(dir.path().join("bank.db").exists());
    let store = db::open_store(&bank_url(dir.path())).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
}
