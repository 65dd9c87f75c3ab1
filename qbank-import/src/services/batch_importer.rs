//! Batch import orchestrator
//!
//! A run moves through four phases:
//!
//! ```text
//! LOADING → PRECHECK → PROCESSING → REPORTING
//! ```
//!
//! LOADING and PRECHECK failures are batch-fatal: the run stops before any
//! record reaches the store. A store given by URL is only opened once the
//! precheck has passed, so a rejected batch never creates a database. During PROCESSING every failure is caught and
//! recorded against its record; the batch always runs to completion.
//!
//! Records are processed strictly one at a time. Store calls are awaited
//! before the next record starts, which also keeps sequence-number
//! allocation ordered.

use chrono::Utc;
use qbank_common::config::{IdStrategy, SpreadsheetConfig, SubjectConfig};
use qbank_common::question::{ImportInfo, QuestionRecord, ValidationStatus};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::question_checker::QuestionChecker;
use super::question_id;
use super::question_transformer::{steps, QuestionTransformer};
use super::record_validator::RecordValidator;
use crate::db::{self, QuestionStore};
use crate::error::{ImportError, Result};
use crate::loaders;
use crate::models::{
    ImportReport, ImportResult, ImportStats, RecordOutcome, RunMode, SourceRecord,
    UnmappedRecord,
};

pub const DRY_RUN_WARNING: &str = "Dry run mode - validation successful";
const SOURCE_SYSTEM: &str = "wordpress";
const IMPORTER_NAME: &str = "qbank-import";

/// Run phase, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Loading,
    Precheck,
    Processing,
    Reporting,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPhase::Loading => f.write_str("LOADING"),
            BatchPhase::Precheck => f.write_str("PRECHECK"),
            BatchPhase::Processing => f.write_str("PROCESSING"),
            BatchPhase::Reporting => f.write_str("REPORTING"),
        }
    }
}

/// Input files for one run
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub source_path: PathBuf,
    pub categories_path: PathBuf,
    pub spreadsheet: SpreadsheetConfig,
}

/// Completed run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: ImportReport,
    pub report_path: PathBuf,
}

/// Records processed plus the per-record results
#[derive(Debug, Clone, Default)]
pub struct ProcessedBatch {
    pub stats: ImportStats,
    pub results: Vec<RecordOutcome>,
}

pub struct BatchImporter {
    mode: RunMode,
    transformer: QuestionTransformer,
    validator: RecordValidator,
    checker: QuestionChecker,
    store: OnceCell<Arc<dyn QuestionStore>>,
    database_url: Option<String>,
    id_strategy: IdStrategy,
    limit: Option<usize>,
    run_id: Uuid,
}

impl BatchImporter {
    /// Validate and transform only; nothing is persisted
    pub fn dry_run(transformer: QuestionTransformer) -> Self {
        Self::build(RunMode::DryRun, transformer, OnceCell::new(), None)
    }

    pub fn live(transformer: QuestionTransformer, store: Arc<dyn QuestionStore>) -> Self {
        Self::build(RunMode::Live, transformer, OnceCell::new_with(Some(store)), None)
    }

    /// Live import into the SQLite question bank at `database_url`
    ///
    /// The connection is made on first use, after the precheck.
    pub fn live_at(transformer: QuestionTransformer, database_url: impl Into<String>) -> Self {
        Self::build(
            RunMode::Live,
            transformer,
            OnceCell::new(),
            Some(database_url.into()),
        )
    }

    fn build(
        mode: RunMode,
        transformer: QuestionTransformer,
        store: OnceCell<Arc<dyn QuestionStore>>,
        database_url: Option<String>,
    ) -> Self {
        let validator = RecordValidator::new(transformer.subject(), mode);
        let checker = QuestionChecker::new(transformer.subject());
        Self {
            mode,
            transformer,
            validator,
            checker,
            store,
            database_url,
            id_strategy: IdStrategy::Source,
            limit: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self.validator = self.validator.with_id_strategy(id_strategy);
        self
    }

    /// Process at most `limit` records (after the precheck, which sees all)
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn subject(&self) -> &SubjectConfig {
        self.transformer.subject()
    }

    /// Live store, connecting on first call; `None` in dry runs
    async fn store(&self) -> Result<Option<&Arc<dyn QuestionStore>>> {
        if self.mode != RunMode::Live {
            return Ok(None);
        }
        let Some(url) = self.database_url.as_deref() else {
            return Ok(self.store.get());
        };

        let store = self
            .store
            .get_or_try_init(|| async {
                let store = db::open_store(url).await.map_err(persistence)?;
                info!("✓ Connected to question bank");
                Ok::<Arc<dyn QuestionStore>, ImportError>(Arc::new(store))
            })
            .await?;
        Ok(Some(store))
    }

    /// Full run over the request's files, ending with the report on disk
    pub async fn run(&self, request: &ImportRequest) -> Result<BatchOutcome> {
        info!(
            "[{}] Run {} ({}): {} + {}",
            BatchPhase::Loading,
            self.run_id,
            self.mode,
            request.source_path.display(),
            request.categories_path.display()
        );
        let export = loaders::load_source_export(&request.source_path).await?;
        let sheet = loaders::load_category_sheet(&request.categories_path, &request.spreadsheet)?;
        let mut records = export.records;
        loaders::assign_categories(&mut records, &sheet);

        info!("[{}] Checking {} categories", BatchPhase::Precheck, records.len());
        self.precheck(&records)?;
        self.store().await?;

        let selected = match self.limit {
            Some(limit) if limit < records.len() => {
                info!("Limiting run to {} of {} records", limit, records.len());
                &records[..limit]
            }
            _ => &records[..],
        };

        info!("[{}] {} records", BatchPhase::Processing, selected.len());
        let processed = self.process(selected).await;

        info!("[{}] {}", BatchPhase::Reporting, processed.stats.display_string());
        let report = ImportReport {
            timestamp: Utc::now(),
            mode: self.mode,
            run_id: self.run_id.to_string(),
            source_file: request.source_path.clone(),
            category_file: request.categories_path.clone(),
            source_sha256: export.sha256,
            stats: processed.stats,
            results: processed.results,
        };
        let report_path = report.write().await?;

        Ok(BatchOutcome {
            report,
            report_path,
        })
    }

    /// All-or-nothing category gate
    ///
    /// Fails with every unmappable record listed. An empty batch fails too.
    pub fn precheck(&self, records: &[SourceRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(ImportError::EmptySource(PathBuf::new()));
        }

        let mapper = self.transformer.mapper();
        let unmapped: Vec<UnmappedRecord> = records
            .iter()
            .filter(|r| match r.category_label() {
                Some(category) => mapper.map_category(category).is_err(),
                None => true,
            })
            .map(|r| UnmappedRecord {
                source_id: r.id.to_string(),
                title: r.title.clone(),
                category: r.category_label().map(str::to_string),
            })
            .collect();

        if unmapped.is_empty() {
            info!("All {} records have a mappable category", records.len());
            return Ok(());
        }

        warn!(
            "{} of {} records have no mappable category",
            unmapped.len(),
            records.len()
        );
        Err(ImportError::PrecheckFailed {
            unmapped,
            total: records.len(),
        })
    }

    /// Import each record in order, never aborting
    pub async fn process(&self, records: &[SourceRecord]) -> ProcessedBatch {
        let mut batch = ProcessedBatch::default();
        let total = records.len();

        for (index, record) in records.iter().enumerate() {
            let result = self.import_record(record).await;

            if result.success {
                debug!(
                    "[{}/{}] {} → {}",
                    index + 1,
                    total,
                    record.id,
                    result.question_id.as_deref().unwrap_or_default()
                );
            } else {
                warn!(
                    "[{}/{}] {} failed: {}",
                    index + 1,
                    total,
                    record.id,
                    result.errors.as_deref().unwrap_or_default().join("; ")
                );
            }

            batch.stats.record(record, &result);
            info!(
                "Processed {}/{} ({} ok, {} failed)",
                index + 1,
                total,
                batch.stats.successful,
                batch.stats.failed
            );
            batch.results.push(RecordOutcome {
                source_id: record.id.to_string(),
                title: record.title.clone(),
                result,
            });
        }

        batch
    }

    /// One record through validate → transform → check → persist
    pub async fn import_record(&self, record: &SourceRecord) -> ImportResult {
        let errors = self.validator.validate(record);
        if !errors.is_empty() {
            return ImportResult::failed(errors);
        }

        match self.try_import(record).await {
            Ok(result) => result,
            Err(e) => ImportResult::failed(e.into_messages()),
        }
    }

    async fn try_import(&self, record: &SourceRecord) -> Result<ImportResult> {
        let transformed = self.transformer.transform_detailed(record)?;
        let mut question = transformed.question;

        let problems = self.checker.check(&question, self.transformer.mapper());
        if !problems.is_empty() {
            return Err(ImportError::InvalidQuestion(problems));
        }

        let Some(store) = self.store().await? else {
            return Ok(ImportResult::succeeded(
                question.id,
                vec![DRY_RUN_WARNING.to_string()],
            ));
        };

        let subject = self.subject();
        if self.id_strategy == IdStrategy::Sequence {
            let next = store
                .next_sequence_number(&subject.subject_id, &subject.domain_id)
                .await
                .map_err(persistence)?;
            question.id = question_id::generate(&subject.subject_code, &subject.domain_code, next);
            question_id::check_format(&question.id, &subject.subject_code, &subject.domain_code)
                .map_err(|e| ImportError::InvalidQuestion(vec![e.to_string()]))?;
        }

        let mut warnings = Vec::new();
        if store
            .get_question(&question.id)
            .await
            .map_err(persistence)?
            .is_some()
        {
            warn!("Question {} already exists, replacing", question.id);
            warnings.push(format!("Replaced existing question {}", question.id));
        }

        let id = question.id.clone();
        let validation_status = if transformed
            .transformations
            .iter()
            .any(|step| step == steps::HTML_CLEANUP_ONLY)
        {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Valid
        };
        let import_info = ImportInfo {
            system: SOURCE_SYSTEM.to_string(),
            original_id: record.id.to_string(),
            original_title: record.title.clone(),
            original_category: record.category_label().unwrap_or_default().to_string(),
            run_id: self.run_id.to_string(),
            imported_by: IMPORTER_NAME.to_string(),
            transformations: transformed.transformations,
            imported_at: Utc::now().to_rfc3339(),
        };
        store
            .save_question(&QuestionRecord {
                question,
                validation_status,
                import_info,
            })
            .await
            .map_err(persistence)?;

        Ok(ImportResult::succeeded(id, warnings))
    }
}

fn persistence(e: qbank_common::Error) -> ImportError {
    ImportError::Persistence(e.to_string())
}
