//! Import pipeline components
//!
//! Pure stages (normalizer, exam info, mapper, id, validator, transformer,
//! checker) have no I/O; only the batch importer touches files and the store.

pub mod batch_importer;
pub mod category_mapper;
pub mod exam_info;
pub mod question_checker;
pub mod question_id;
pub mod question_transformer;
pub mod record_validator;
pub mod text_normalizer;

pub use batch_importer::{BatchImporter, BatchOutcome, ImportRequest, DRY_RUN_WARNING};
pub use category_mapper::{AliasTable, CategoryMapper, TopicMapping};
pub use exam_info::ExamInfo;
pub use question_checker::QuestionChecker;
pub use question_transformer::QuestionTransformer;
pub use record_validator::RecordValidator;
