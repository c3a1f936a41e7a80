// File I/O for stocktake runs: registry/on-hand tables in, reports out.

pub mod csv;
pub mod error;
pub mod json;
pub mod scan;
pub mod xlsx;

use std::path::Path;

use stocktake_recon::model::{Table, TableSet};

pub use error::IoError;

/// Tabular file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Excel),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read the registry: a single table (first sheet for workbooks).
pub fn read_registry(path: &Path) -> Result<Table, IoError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => csv::import(path),
        TableFormat::Tsv => csv::import_tsv(path),
        TableFormat::Excel => xlsx::import_first_sheet(path),
    }
}

/// Read the on-hand log: every sheet of a workbook, or one table for CSV.
pub fn read_on_hand(path: &Path) -> Result<TableSet, IoError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => Ok(vec![csv::import(path)?].into()),
        TableFormat::Tsv => Ok(vec![csv::import_tsv(path)?].into()),
        TableFormat::Excel => xlsx::import(path),
    }
}

/// Read raw scanner readings.
pub fn read_scanned(path: &Path) -> Result<Vec<String>, IoError> {
    scan::import(path)
}

/// Write report records as CSV/TSV or xlsx depending on the extension.
pub fn write_records(records: &[Vec<String>], sheet_name: &str, header: bool, path: &Path) -> Result<(), IoError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => csv::export(records, path),
        TableFormat::Tsv => csv::export_tsv(records, path),
        TableFormat::Excel => xlsx::export(records, sheet_name, header, path),
    }?;
    tracing::info!(path = %path.display(), rows = records.len(), "report written");
    Ok(())
}
