//! Bootstrap configuration for the question bank tooling
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! A missing TOML file is not an error: the importer logs a warning and
//! continues with built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the persistence backend URL
pub const DATABASE_URL_ENV: &str = "QBANK_DATABASE_URL";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "QBANK_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Persistence backend URL (e.g. `sqlite://questions.db?mode=rwc`)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Taxonomy document (JSON) used for category lookups
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,

    /// How canonical question ids are numbered
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Subject/domain the imported questions belong to
    #[serde(default)]
    pub subject: SubjectConfig,

    /// Category spreadsheet layout
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,

    /// Extra category aliases, merged over the built-in table
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            taxonomy_path: None,
            id_strategy: IdStrategy::default(),
            logging: LoggingConfig::default(),
            subject: SubjectConfig::default(),
            spreadsheet: SpreadsheetConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Subject and domain the importer writes into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfig {
    #[serde(default = "default_subject_id")]
    pub subject_id: String,
    #[serde(default = "default_domain_id")]
    pub domain_id: String,
    /// Three uppercase letters, first id segment
    #[serde(default = "default_subject_code")]
    pub subject_code: String,
    /// Three uppercase letters, second id segment
    #[serde(default = "default_domain_code")]
    pub domain_code: String,
    /// Exam template referenced by exam-attributed questions
    #[serde(default = "default_exam_template_id")]
    pub exam_template_id: String,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            subject_id: default_subject_id(),
            domain_id: default_domain_id(),
            subject_code: default_subject_code(),
            domain_code: default_domain_code(),
            exam_template_id: default_exam_template_id(),
        }
    }
}

/// Column layout of the category spreadsheet (0-based indices)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    #[serde(default = "default_title_column")]
    pub title_column: usize,
    #[serde(default = "default_category_column")]
    pub category_column: usize,
    /// Category values that mark a row as "not a category"
    #[serde(default = "default_excluded_categories")]
    pub excluded_categories: Vec<String>,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            title_column: default_title_column(),
            category_column: default_category_column(),
            excluded_categories: default_excluded_categories(),
        }
    }
}

/// Canonical id numbering strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Derive the number from the source record id
    #[default]
    Source,
    /// Allocate the next number from the persistence sequence (live runs only)
    Sequence,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_subject_id() -> String {
    "civil_engineering".to_string()
}

fn default_domain_id() -> String {
    "construction_safety".to_string()
}

fn default_subject_code() -> String {
    "CIV".to_string()
}

fn default_domain_code() -> String {
    "SAF".to_string()
}

fn default_exam_template_id() -> String {
    "civil_safety".to_string()
}

fn default_title_column() -> usize {
    7
}

fn default_category_column() -> usize {
    5
}

fn default_excluded_categories() -> Vec<String> {
    vec!["no".to_string(), "single".to_string()]
}

impl TomlConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, degrading to built-in defaults when no file exists
    ///
    /// An explicitly requested file must exist. Otherwise `QBANK_CONFIG` and
    /// then the platform config directory are tried.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            info!("Loading config from {} ({})", path.display(), CONFIG_PATH_ENV);
            return Self::load(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        for (field, code) in [
            ("subject.subject_code", &self.subject.subject_code),
            ("subject.domain_code", &self.subject.domain_code),
        ] {
            if !is_three_letter_code(code) {
                return Err(Error::Config(format!(
                    "{} must be exactly 3 uppercase ASCII letters, got {:?}",
                    field, code
                )));
            }
        }

        if self.spreadsheet.title_column == self.spreadsheet.category_column {
            return Err(Error::Config(
                "spreadsheet.title_column and spreadsheet.category_column must differ".to_string(),
            ));
        }

        Ok(())
    }
}

/// Platform config file location: `<config dir>/qbank/importer.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("qbank").join("importer.toml"))
}

/// Resolve the persistence backend URL from CLI → ENV → TOML
///
/// Returns `None` when no source carries a usable value; callers decide
/// whether that is fatal (it is for live imports).
pub fn resolve_database_url(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let env_value = std::env::var(DATABASE_URL_ENV).ok();
    let candidates = [
        ("command line", cli_arg.map(str::to_string)),
        ("environment", env_value),
        ("TOML", toml_config.database_url.clone()),
    ];

    let found: Vec<&str> = candidates
        .iter()
        .filter(|(_, v)| v.as_deref().is_some_and(is_valid_value))
        .map(|(source, _)| *source)
        .collect();

    if found.len() > 1 {
        warn!(
            "Database URL found in multiple sources: {}. Using {} (highest priority).",
            found.join(", "),
            found[0]
        );
    }

    candidates.into_iter().find_map(|(source, value)| {
        value.filter(|v| is_valid_value(v)).map(|v| {
            info!("Database URL loaded from {}", source);
            v
        })
    })
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_three_letter_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}
