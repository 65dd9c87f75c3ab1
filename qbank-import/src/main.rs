//! qbank-import - Legacy question import tool
//!
//! **Usage:**
//! ```bash
//! qbank-import <SOURCE_JSON> <CATEGORY_SHEET> [--dry-run] [--config <FILE>]
//!     [--database-url <URL>] [--taxonomy <FILE>] [--limit <N>]
//! ```
//!
//! Exit status is non-zero for batch-fatal errors (unreadable inputs,
//! missing credentials in live mode, unmapped categories). Per-record
//! failures are itemized in the JSON report, not in the exit status.

use anyhow::{Context, Result};
use clap::Parser;
use qbank_common::config::TomlConfig;
use qbank_common::taxonomy::StaticTaxonomy;
use qbank_import::config::ImportSettings;
use qbank_import::models::{ImportReport, RunMode};
use qbank_import::services::{BatchImporter, CategoryMapper, ImportRequest, QuestionTransformer};
use qbank_import::ImportError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for qbank-import
#[derive(Parser, Debug)]
#[command(name = "qbank-import")]
#[command(about = "Import legacy quiz-plugin questions into the question bank")]
#[command(version)]
struct Args {
    /// Quiz-plugin JSON export
    source: PathBuf,

    /// Spreadsheet mapping question titles to categories (xlsx, xls, ods or csv)
    categories: PathBuf,

    /// Validate and transform only; nothing is written to the question bank
    #[arg(long)]
    dry_run: bool,

    /// TOML config file (default: <config dir>/qbank/importer.toml)
    #[arg(short, long, env = "QBANK_CONFIG")]
    config: Option<PathBuf>,

    /// Question bank database URL (live mode)
    #[arg(long)]
    database_url: Option<String>,

    /// Taxonomy JSON document
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Process at most N records (category check still covers all)
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config)?;

    info!(
        "Starting qbank-import v{} ({})",
        env!("CARGO_PKG_VERSION"),
        if args.dry_run { "dry run" } else { "live" }
    );

    for (label, path) in [("Source", &args.source), ("Category sheet", &args.categories)] {
        if !path.is_file() {
            error!("{} file not found: {}", label, path.display());
            eprintln!("Error: {} file not found: {}", label, path.display());
            std::process::exit(1);
        }
    }

    let mode = RunMode::from_dry_run_flag(args.dry_run);
    let settings = match ImportSettings::resolve(
        config,
        mode,
        args.database_url.as_deref(),
        args.taxonomy.as_deref(),
    ) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let taxonomy = StaticTaxonomy::from_json_file(&settings.taxonomy_path)
        .with_context(|| format!("Failed to load taxonomy {}", settings.taxonomy_path.display()))?;
    let subject = settings.config.subject.clone();
    let mapper = CategoryMapper::new(settings.alias_table(), &taxonomy, &subject.subject_id);
    let transformer = QuestionTransformer::new(mapper, subject);

    let importer = match settings.database_url.as_deref() {
        Some(url) if mode == RunMode::Live => BatchImporter::live_at(transformer, url),
        _ => BatchImporter::dry_run(transformer),
    }
    .with_id_strategy(settings.config.id_strategy)
    .with_limit(args.limit);

    let request = ImportRequest {
        source_path: args.source.clone(),
        categories_path: args.categories.clone(),
        spreadsheet: settings.config.spreadsheet.clone(),
    };

    match importer.run(&request).await {
        Ok(outcome) => {
            print_summary(&outcome.report, &outcome.report_path);
            Ok(())
        }
        Err(ImportError::PrecheckFailed { unmapped, total }) => {
            eprintln!("\n❌ Some questions have no mappable category:");
            for record in &unmapped {
                eprintln!("  • {}", record);
            }
            eprintln!(
                "\nTotal questions without a category: {}/{}",
                unmapped.len(),
                total
            );
            eprintln!("Fix the category sheet or add an alias, then run again. Nothing was imported.");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Import aborted: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Console + optional file logging; `RUST_LOG` overrides the configured level
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("qbank_import={0},qbank_common={0}", config.logging.level).into());

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

fn print_summary(report: &ImportReport, report_path: &Path) {
    let stats = &report.stats;
    println!();
    println!("=== Import Summary ({}) ===", report.mode);
    println!("Run:           {}", report.run_id);
    println!("Total:         {}", stats.total);
    println!("Successful:    {}", stats.successful);
    println!("Failed:        {}", stats.failed);
    println!("No solution:   {}", stats.no_solution);
    println!("With HTML:     {}", stats.with_html);
    if !stats.by_category.is_empty() {
        println!("\nBy category:");
        for (category, count) in &stats.by_category {
            println!("  {:>4}  {}", count, category);
        }
    }
    println!("\nReport: {}", report_path.display());
    if report.mode.is_dry_run() {
        println!("Dry run: nothing was saved. Run without --dry-run to import.");
    }
}
