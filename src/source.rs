//! Row source: turns a roster file into [`Row`]s.
//!
//! ## Loader Table
//!
//! Loaders are tried in order against the file's base name; the first match
//! wins and a file no loader claims is unrecognized:
//!
//! | Pattern | Loader |
//! |---|---|
//! | `~$*.xlsx` | none (office lock file, yields no rows) |
//! | `*.xlsx` | first worksheet via `calamine` |
//! | `*.csv` | `csv` reader with the configured delimiter and quote |
//!
//! ## Column Mapping
//!
//! Cells map to [`Row`] fields by position:
//!
//! ```text
//! 0 employee_id   1 employee_name  2 nickname   3 approver_name  4 approver_id
//! 5 sector_name   6 sheet_name     7 shift      8 substitutes    9 flags
//! ```
//!
//! Missing trailing cells read as empty. Fully blank rows are dropped, and so
//! are rows without a sheet name since they cannot be grouped.

use crate::config::SourceConfig;
use crate::dataset::Dataset;
use crate::types::{Flags, RawRow, Row};
use calamine::{Data, Reader, Xlsx, open_workbook};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("Workbook has no worksheets: {0}")]
    NoWorksheet(PathBuf),
    #[error("Unrecognized roster file type: {0}")]
    Unrecognized(PathBuf),
}

type LoadFn = fn(&Path, &SourceConfig) -> Result<Vec<RawRow>, SourceError>;

/// One entry of the loader table.
pub struct Loader {
    pub name: &'static str,
    matches: fn(&str) -> bool,
    load: LoadFn,
}

const LOADERS: &[Loader] = &[
    Loader {
        name: "office-lock",
        matches: is_office_lock_file,
        load: load_nothing,
    },
    Loader {
        name: "xlsx",
        matches: is_xlsx,
        load: load_xlsx,
    },
    Loader {
        name: "csv",
        matches: is_csv,
        load: load_csv,
    },
];

fn has_extension(file_name: &str, ext: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn is_office_lock_file(file_name: &str) -> bool {
    file_name.starts_with("~$") && has_extension(file_name, "xlsx")
}

fn is_xlsx(file_name: &str) -> bool {
    has_extension(file_name, "xlsx")
}

fn is_csv(file_name: &str) -> bool {
    has_extension(file_name, "csv")
}

/// Find the loader responsible for `path`, if any.
pub fn classify(path: &Path) -> Option<&'static Loader> {
    let file_name = path.file_name()?.to_string_lossy();
    LOADERS.iter().find(|loader| (loader.matches)(&file_name))
}

fn load_nothing(_path: &Path, _config: &SourceConfig) -> Result<Vec<RawRow>, SourceError> {
    Ok(Vec::new())
}

fn load_xlsx(path: &Path, _config: &SourceConfig) -> Result<Vec<RawRow>, SourceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::NoWorksheet(path.to_path_buf()))??;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

/// Text of one spreadsheet cell. Integral floats lose their `.0` so numeric
/// employee ids come out the way they were typed.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn load_csv(path: &Path, config: &SourceConfig) -> Result<Vec<RawRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .quote(config.quote_byte())
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row: RawRow = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        rows.push(row);
    }
    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(rows)
}

/// Read the raw cell grid of a roster file, minus configured header rows.
pub fn read_raw_rows(path: &Path, config: &SourceConfig) -> Result<Vec<RawRow>, SourceError> {
    let loader = classify(path).ok_or_else(|| SourceError::Unrecognized(path.to_path_buf()))?;
    debug!(path = %path.display(), loader = loader.name, "loading roster");
    let mut rows = (loader.load)(path, config)?;
    let skip = config.header_rows.min(rows.len());
    rows.drain(..skip);
    Ok(rows)
}

fn split_list(cell: &str, separator: char) -> impl Iterator<Item = String> + '_ {
    cell.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

/// Map one raw row onto [`Row`] fields by position.
///
/// Returns `None` for rows that carry no data at all.
pub fn parse_row(raw: &[String], config: &SourceConfig) -> Option<Row> {
    if raw.iter().all(|cell| cell.trim().is_empty()) {
        return None;
    }
    let cell = |idx: usize| raw.get(idx).map(|c| c.trim().to_string()).unwrap_or_default();
    let separator = config.list_char();
    Some(Row {
        employee_id: cell(0),
        employee_name: cell(1),
        employee_nickname: cell(2),
        approver_name: cell(3),
        approver_id: cell(4),
        sector_name: cell(5),
        sheet_name: cell(6),
        shift: cell(7),
        substitutes: split_list(&cell(8), separator).collect(),
        flags: split_list(&cell(9), separator)
            .map(|flag| flag.to_lowercase())
            .collect::<Flags>(),
    })
}

/// Map raw rows to [`Row`]s, dropping blank rows and rows without a sheet name.
pub fn parse_rows(raw_rows: &[RawRow], config: &SourceConfig) -> Vec<Row> {
    let mut rows = Vec::with_capacity(raw_rows.len());
    for (idx, raw) in raw_rows.iter().enumerate() {
        let Some(row) = parse_row(raw, config) else {
            continue;
        };
        if row.sheet_name.is_empty() {
            // 1-based, counted after the dropped header rows
            warn!(
                row = idx + 1 + config.header_rows,
                employee = %row.employee_id,
                "row has no sheet name, skipping"
            );
            continue;
        }
        rows.push(row);
    }
    rows
}

/// Load a roster into a [`Dataset`]. Never fails: unrecognized or unreadable
/// files are logged and yield an empty dataset.
pub fn load_dataset(path: &Path, config: &SourceConfig) -> Dataset {
    match read_raw_rows(path, config) {
        Ok(raw_rows) => Dataset::new(parse_rows(&raw_rows, config)),
        Err(SourceError::Unrecognized(path)) => {
            warn!(path = %path.display(), "unrecognized roster file type, nothing to render");
            Dataset::default()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read roster, nothing to render");
            Dataset::default()
        }
    }
}
