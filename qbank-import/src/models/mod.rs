//! Data models for qbank-import

pub mod import_result;
pub mod source_record;

pub use import_result::{
    ImportReport, ImportResult, ImportStats, RecordOutcome, RunMode, UnmappedRecord,
};
pub use source_record::{SourceAnswer, SourceRecord};
