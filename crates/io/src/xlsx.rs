// Excel import (xlsx, xls, xlsb, ods) and report export (xlsx)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use stocktake_recon::model::{Cell, Table, TableSet};
use tracing::{debug, warn};

use crate::error::IoError;

/// Maximum number of cells to import (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

/// Maximum dimensions for a sheet
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Import every sheet of a workbook, in workbook order.
pub fn import(path: &Path) -> Result<TableSet, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::parse(path, format!("failed to open Excel file: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::parse(path, "Excel file contains no sheets"));
    }

    let mut tables = TableSet::new();
    let mut total_cells = 0usize;

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::parse(path, format!("failed to read sheet '{sheet_name}': {e}")))?;

        let (height, width) = range.get_size();
        let mut table = Table::new(sheet_name.clone());

        // Skip empty sheets but still create them
        if height == 0 || width == 0 {
            debug!(sheet = %sheet_name, "empty sheet");
            tables.push(table);
            continue;
        }

        if height > MAX_ROWS || width > MAX_COLS {
            return Err(IoError::parse(
                path,
                format!("sheet '{sheet_name}' is {height}x{width}, larger than {MAX_ROWS}x{MAX_COLS}"),
            ));
        }

        total_cells += height * width;
        if total_cells > MAX_CELLS {
            return Err(IoError::parse(
                path,
                format!("workbook exceeds {MAX_CELLS} cells"),
            ));
        }

        // Range start offset (data may not begin at A1). Pad so that row
        // numbers and widths match what a spreadsheet user sees.
        let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));
        let lead_cols = data_start_col as usize;
        let full_width = lead_cols + width;

        for _ in 0..data_start_row {
            table.push_row(vec![None; full_width]);
        }

        for row in range.rows() {
            let mut cells: Vec<Cell> = Vec::with_capacity(full_width);
            cells.resize(lead_cols, None);
            cells.extend(row.iter().map(cell_to_string));
            table.push_row(cells);
        }

        debug!(sheet = %sheet_name, rows = table.len(), cols = full_width, "sheet imported");
        tables.push(table);
    }

    Ok(tables)
}

/// Import only the first sheet of a workbook.
pub fn import_first_sheet(path: &Path) -> Result<Table, IoError> {
    let tables = import(path)?;
    if tables.len() > 1 {
        warn!(path = %path.display(), sheets = tables.len(), "using first sheet only");
    }
    let first = tables.iter().next().cloned();
    first.ok_or_else(|| IoError::parse(path, "Excel file contains no sheets"))
}

fn cell_to_string(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        // Serial number; dates never carry a tag
        Data::DateTime(dt) => Some(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Write report records to a single-sheet xlsx file.
///
/// When `header` is set, the first record is written in bold.
pub fn export(records: &[Vec<String>], sheet_name: &str, header: bool, path: &Path) -> Result<(), IoError> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| IoError::write(path, format!("failed to create sheet '{sheet_name}': {e}")))?;

    for (row_idx, record) in records.iter().enumerate() {
        let row = u32::try_from(row_idx).map_err(|_| IoError::write(path, "too many rows"))?;
        for (col_idx, value) in record.iter().enumerate() {
            let col = u16::try_from(col_idx).map_err(|_| IoError::write(path, "too many columns"))?;
            let written = if header && row_idx == 0 {
                worksheet.write_string_with_format(row, col, value, &bold)
            } else {
                worksheet.write_string(row, col, value)
            };
            written.map_err(|e| IoError::write(path, format!("failed to write cell: {e}")))?;
        }
    }

    // Save to file
    xlsx_workbook
        .save(path)
        .map_err(|e| IoError::write(path, format!("failed to save XLSX file: {e}")))?;

    Ok(())
}
