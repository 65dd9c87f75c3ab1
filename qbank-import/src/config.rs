//! Run settings resolution for qbank-import
//!
//! Combines command-line arguments with the TOML config. Database URL
//! priority is CLI → ENV → TOML (see `qbank_common::config`); the taxonomy
//! path is CLI → TOML.

use qbank_common::config::{resolve_database_url, TomlConfig};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ImportError, Result};
use crate::models::RunMode;
use crate::services::AliasTable;

/// Everything a run needs beyond the two input files
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub mode: RunMode,
    /// Always `Some` for live runs
    pub database_url: Option<String>,
    pub taxonomy_path: PathBuf,
    pub config: TomlConfig,
}

impl ImportSettings {
    /// Resolve settings; fails before any work when a live run has no backend
    pub fn resolve(
        config: TomlConfig,
        mode: RunMode,
        cli_database_url: Option<&str>,
        cli_taxonomy: Option<&Path>,
    ) -> Result<Self> {
        let database_url = match mode {
            RunMode::Live => Some(
                resolve_database_url(cli_database_url, &config)
                    .ok_or(ImportError::MissingCredentials)?,
            ),
            RunMode::DryRun => None,
        };

        let taxonomy_path = cli_taxonomy
            .map(Path::to_path_buf)
            .or_else(|| config.taxonomy_path.clone())
            .ok_or_else(|| {
                ImportError::Config(
                    "Taxonomy not configured. Please configure using one of:\n\
                     1. Command line: --taxonomy <FILE>\n\
                     2. TOML config: taxonomy_path = \"/path/to/taxonomy.json\""
                        .to_string(),
                )
            })?;
        info!("Taxonomy: {}", taxonomy_path.display());

        Ok(Self {
            mode,
            database_url,
            taxonomy_path,
            config,
        })
    }

    /// Built-in aliases with the config's `[aliases]` layered on top
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::default().with_overrides(&self.config.aliases)
    }
}
