//! Import results, statistics and the run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use super::SourceRecord;
use crate::error::Result;

/// Dry-run validates and transforms only; live also persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    DryRun,
    Live,
}

impl RunMode {
    pub fn from_dry_run_flag(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }

    /// `import-report-dry-run.json` / `import-report-live.json`
    pub fn report_file_name(self) -> String {
        format!("import-report-{}.json", self)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => f.write_str("dry-run"),
            RunMode::Live => f.write_str("live"),
        }
    }
}

/// Outcome of importing a single record
///
/// A successful result always carries `question_id`; a failed one always
/// carries at least one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ImportResult {
    pub fn succeeded(question_id: String, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            question_id: Some(question_id),
            errors: None,
            warnings: (!warnings.is_empty()).then_some(warnings),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        let errors = if errors.is_empty() {
            vec!["Unknown error".to_string()]
        } else {
            errors
        };
        Self {
            success: false,
            question_id: None,
            errors: Some(errors),
            warnings: None,
        }
    }
}

/// Per-record entry in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub source_id: String,
    pub title: String,
    #[serde(flatten)]
    pub result: ImportResult,
}

/// Record the precheck could not map to a taxonomy subtopic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedRecord {
    pub source_id: String,
    pub title: String,
    /// `None` when the record had no category at all
    pub category: Option<String>,
}

impl fmt::Display for UnmappedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(
                f,
                "{} \"{}\": unknown category \"{}\"",
                self.source_id, self.title, category
            ),
            None => write!(f, "{} \"{}\": no category", self.source_id, self.title),
        }
    }
}

/// Batch counters
///
/// `total` counts processed records. `no_solution` and `with_html` are
/// diagnostic and count every processed record regardless of outcome;
/// `by_category` counts successes only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub no_solution: usize,
    pub with_html: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl ImportStats {
    pub fn record(&mut self, record: &SourceRecord, result: &ImportResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
            let category = record.category_label().unwrap_or("").to_string();
            *self.by_category.entry(category).or_insert(0) += 1;
        } else {
            self.failed += 1;
        }
        if !record.has_solution() {
            self.no_solution += 1;
        }
        if record.has_markup() {
            self.with_html += 1;
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} processed, {} imported, {} failed ({} without solution, {} with HTML)",
            self.total, self.successful, self.failed, self.no_solution, self.with_html
        )
    }
}

/// JSON report written next to the source file at the end of every run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub timestamp: DateTime<Utc>,
    pub mode: RunMode,
    pub run_id: String,
    pub source_file: PathBuf,
    pub category_file: PathBuf,
    /// SHA-256 of the source export, hex
    pub source_sha256: String,
    pub stats: ImportStats,
    pub results: Vec<RecordOutcome>,
}

impl ImportReport {
    /// Where the report for `source_file` goes in this mode
    pub fn path_for(source_file: &Path, mode: RunMode) -> PathBuf {
        let dir = source_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        dir.join(mode.report_file_name())
    }

    /// Write the report (pretty JSON) next to the source file
    pub async fn write(&self) -> Result<PathBuf> {
        let path = Self::path_for(&self.source_file, self.mode);
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json).await?;
        info!("Report written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceAnswer;

    #[test]
    fn test_report_file_names() {
        assert_eq!(RunMode::DryRun.report_file_name(), "import-report-dry-run.json");
        assert_eq!(RunMode::Live.report_file_name(), "import-report-live.json");
        assert_eq!(
            ImportReport::path_for(Path::new("/data/export.json"), RunMode::Live),
            PathBuf::from("/data/import-report-live.json")
        );
        assert_eq!(
            ImportReport::path_for(Path::new("export.json"), RunMode::DryRun),
            PathBuf::from("./import-report-dry-run.json")
        );
    }

    #[test]
    fn test_result_shapes() {
        let ok = ImportResult::succeeded("CIV-SAF-000001".to_string(), vec![]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "success": true, "questionId": "CIV-SAF-000001" })
        );

        let failed = ImportResult::failed(vec![]);
        assert!(!failed.success);
        assert_eq!(failed.errors.unwrap().len(), 1);
    }

    #[test]
    fn test_stats_counting() {
        let mut stats = ImportStats::default();
        let plain = SourceRecord {
            id: 1,
            correct_msg: "הסבר".to_string(),
            category: Some("חפירות".to_string()),
            answers: Some(vec![SourceAnswer::new("a", true)]),
            ..Default::default()
        };
        let html = SourceRecord {
            id: 2,
            question: "<p>x</p>".to_string(),
            category: Some("חפירות".to_string()),
            ..Default::default()
        };

        stats.record(&plain, &ImportResult::succeeded("CIV-SAF-000001".to_string(), vec![]));
        stats.record(&html, &ImportResult::failed(vec!["bad".to_string()]));

        assert_eq!(stats.total, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.no_solution, 1);
        assert_eq!(stats.with_html, 1);
        assert_eq!(stats.by_category.get("חפירות"), Some(&1));
    }

    #[test]
    fn test_unmapped_display() {
        let unmapped = UnmappedRecord {
            source_id: "12".to_string(),
            title: "שאלה 1".to_string(),
            category: None,
        };
        assert_eq!(unmapped.to_string(), "12 \"שאלה 1\": no category");
    }
}
