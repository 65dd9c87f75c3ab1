//! Category spreadsheet reader
//!
//! The first worksheet maps question titles to raw category labels. The
//! first row is a header. Title and category are read from fixed columns
//! ([`SpreadsheetConfig`]); rows whose category is in the exclusion list
//! mark questions that have no category and are skipped. Later rows win
//! when a title repeats.
//!
//! `.csv` files are read with the csv crate; anything else goes through
//! calamine (xlsx, xlsm, xlsb, xls, ods).

use calamine::{open_workbook_auto, Data, Reader};
use qbank_common::config::SpreadsheetConfig;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ImportError, Result};

/// Title → raw category label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySheet {
    by_title: HashMap<String, String>,
}

impl CategorySheet {
    pub fn get(&self, title: &str) -> Option<&str> {
        self.by_title.get(title.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

pub fn load_category_sheet(path: &Path, layout: &SpreadsheetConfig) -> Result<CategorySheet> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let rows = if is_csv {
        read_csv_rows(path)
    } else {
        read_workbook_rows(path)
    }
    .map_err(|message| ImportError::Load {
        path: path.to_path_buf(),
        message,
    })?;

    let sheet = parse_category_rows(rows, layout);
    info!(
        "Loaded {} title/category pairs from {}",
        sheet.len(),
        path.display()
    );
    Ok(sheet)
}

/// Build the title → category map from raw rows (header included)
pub fn parse_category_rows<I>(rows: I, layout: &SpreadsheetConfig) -> CategorySheet
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut by_title = HashMap::new();

    for row in rows.into_iter().skip(1) {
        let cell = |index: usize| row.get(index).map(|c| c.trim()).unwrap_or("");
        let title = cell(layout.title_column);
        let category = cell(layout.category_column);

        if title.is_empty() || category.is_empty() {
            continue;
        }
        if layout.excluded_categories.iter().any(|x| x == category) {
            debug!("Skipping excluded category {:?} for {:?}", category, title);
            continue;
        }
        by_title.insert(title.to_string(), category.to_string());
    }

    CategorySheet { by_title }
}

fn read_csv_rows(path: &Path) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| e.to_string())
        })
        .collect()
}

fn read_workbook_rows(path: &Path) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook has no sheets".to_string())?;
    let range = workbook.worksheet_range(&first).map_err(|e| e.to_string())?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        other => other.to_string(),
    }
}
