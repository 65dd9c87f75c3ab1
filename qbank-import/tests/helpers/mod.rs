//! Test Helper Utilities
//!
//! Shared fixtures for qbank-import integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use qbank_common::config::{SpreadsheetConfig, SubjectConfig};
use qbank_common::question::{CanonicalQuestion, QuestionRecord};
use qbank_common::taxonomy::StaticTaxonomy;
use qbank_common::{Error, Result};
use qbank_import::db::QuestionStore;
use qbank_import::models::{SourceAnswer, SourceRecord};
use qbank_import::services::question_id;
use qbank_import::services::{AliasTable, CategoryMapper, QuestionTransformer};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const TAXONOMY_JSON: &str = r#"{
    "subjectID": "civil_engineering",
    "domainID": "construction_safety",
    "topics": [
        {
            "id": "safety_management",
            "name": "ניהול בטיחות",
            "subTopics": [
                { "id": "safety_plans", "name": "תכניות בטיחות" },
                { "id": "supervision_service", "name": "שרות פיקוח על העבודה והמוס\"ל" }
            ]
        },
        {
            "id": "work_methods",
            "name": "שיטות עבודה",
            "subTopics": [
                { "id": "work_surfaces", "name": "משטחי עבודה, מדרכות מעבר ופתחים" },
                { "id": "steel_erection", "name": "הקמת מבני מתכת" },
                { "id": "fragile_roofs", "name": "גגות שבירים או תלולים" }
            ]
        },
        {
            "id": "lifting",
            "name": "הרמה",
            "subTopics": [
                { "id": "lifting_machines", "name": "מכונות ואביזרי הרמה" }
            ]
        }
    ]
}"#;

pub fn taxonomy() -> StaticTaxonomy {
    StaticTaxonomy::from_json_str(TAXONOMY_JSON).unwrap()
}

pub fn transformer() -> QuestionTransformer {
    let subject = SubjectConfig::default();
    let mapper = CategoryMapper::new(AliasTable::default(), &taxonomy(), &subject.subject_id);
    QuestionTransformer::new(mapper, subject)
}

/// Well-formed multiple-choice record; `correct` is the 0-based correct option
pub fn mc_record(id: u64, category: &str, correct: usize) -> SourceRecord {
    let answers = ["מנהל העבודה", "הקבלן הראשי", "המפקח", "העובד"]
        .iter()
        .enumerate()
        .map(|(i, text)| SourceAnswer::new(*text, i == correct))
        .collect();

    SourceRecord {
        id,
        title: format!("שאלה {} - קיץ 2022 מועד א", id),
        question: "מי אחראי להכנת תכנית העבודה?".to_string(),
        correct_msg: "לפי תקנות הבטיחות בעבודה".to_string(),
        answer_type: "single".to_string(),
        answers: Some(answers),
        category: Some(category.to_string()),
        ..Default::default()
    }
}

/// In-memory store recording every call
#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<BTreeMap<String, QuestionRecord>>,
    pub save_calls: Mutex<Vec<String>>,
    /// Saves of these ids fail
    pub failing_ids: HashSet<String>,
}

impl RecordingStore {
    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.lock().unwrap().len()
    }

    pub fn saved_ids(&self) -> Vec<String> {
        self.saved.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<QuestionRecord> {
        self.saved.lock().unwrap().get(id).cloned()
    }

    pub fn seed(&self, record: QuestionRecord) {
        self.saved
            .lock()
            .unwrap()
            .insert(record.question.id.clone(), record);
    }
}

#[async_trait]
impl QuestionStore for RecordingStore {
    async fn get_question(&self, id: &str) -> Result<Option<CanonicalQuestion>> {
        Ok(self.get(id).map(|r| r.question))
    }

    async fn save_question(&self, record: &QuestionRecord) -> Result<()> {
        let id = record.question.id.clone();
        self.save_calls.lock().unwrap().push(id.clone());
        if self.failing_ids.contains(&id) {
            return Err(Error::Internal(format!("write rejected for {}", id)));
        }
        self.saved.lock().unwrap().insert(id, record.clone());
        Ok(())
    }

    async fn next_sequence_number(&self, subject_id: &str, domain_id: &str) -> Result<u64> {
        let highest = self
            .saved
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.question.metadata.subject_id == subject_id
                    && r.question.metadata.domain_id == domain_id
            })
            .filter_map(|r| question_id::sequence_number(&r.question.id))
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }
}

/// Quiz-plugin export JSON holding `records` in a single quiz
pub fn export_json(records: &[SourceRecord]) -> String {
    let questions: serde_json::Map<String, serde_json::Value> = records
        .iter()
        .map(|r| (r.id.to_string(), serde_json::to_value(r).unwrap()))
        .collect();
    serde_json::json!({ "question": { "1": questions } }).to_string()
}

/// Layout of the CSVs written by [`write_inputs`]
pub fn two_column_layout() -> SpreadsheetConfig {
    SpreadsheetConfig {
        title_column: 0,
        category_column: 1,
        ..Default::default()
    }
}

/// Write an export and a matching category CSV (title, category) into `dir`
pub fn write_inputs(dir: &Path, records: &[SourceRecord]) -> (PathBuf, PathBuf) {
    let source = dir.join("export.json");
    std::fs::write(&source, export_json(records)).unwrap();

    let categories = dir.join("categories.csv");
    let mut writer = csv::Writer::from_path(&categories).unwrap();
    writer.write_record(["title", "category"]).unwrap();
    for record in records {
        writer
            .write_record([
                record.title.as_str(),
                record.category.as_deref().unwrap_or("no"),
            ])
            .unwrap();
    }
    writer.flush().unwrap();

    (source, categories)
}
