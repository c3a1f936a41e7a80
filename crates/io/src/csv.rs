// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use stocktake_recon::model::{Cell, Table};
use tracing::debug;

use crate::error::IoError;

/// Read a CSV file (no header row) into a table named after the file stem.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "importing csv");
    import_from_string(&table_name(path), &content, delimiter).map_err(|e| IoError::parse(path, e))
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&table_name(path), &content, b'\t').map_err(|e| IoError::parse(path, e))
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// Pick the delimiter that splits the first lines most consistently.
///
/// A candidate scores `field count of line 1 * lines agreeing with it`, and
/// must split line 1 into at least two fields. Files that split on nothing
/// (a one-column registry) fall back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();
            let first = *widths.first()?;
            if first < 2 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == first).count();
            Some((agreeing * first, delim))
        })
        // First candidate wins a tie
        .fold(None, |best: Option<(usize, u8)>, (score, delim)| match best {
            Some((top, _)) if top >= score => best,
            _ => Some((score, delim)),
        })
        .map_or(b',', |(_, delim)| delim)
}

/// Fields on one line, honouring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table = Table::new(name);
    let mut width = 0usize;
    let mut next_line = 1u64;

    for result in reader.records() {
        let record = result?;

        // The reader skips empty lines; keep them as blank rows so row numbers match the file
        let line = record.position().map_or(next_line, |pos| pos.line());
        while next_line < line {
            table.push_row(Vec::new());
            next_line += 1;
        }
        let embedded_newlines: u64 = record.iter().map(|field| field.matches('\n').count() as u64).sum();
        next_line = line + 1 + embedded_newlines;

        let row: Vec<Cell> = record
            .iter()
            .map(|field| if field.is_empty() { None } else { Some(field.to_string()) })
            .collect();
        width = width.max(row.len());
        table.push_row(row);
    }

    // Ragged rows are padded so every row reports the table's full width
    for row in &mut table.rows {
        row.resize(width, None);
    }

    Ok(table)
}

pub fn export(records: &[Vec<String>], path: &Path) -> Result<(), IoError> {
    export_with_delimiter(records, path, b',')
}

pub fn export_tsv(records: &[Vec<String>], path: &Path) -> Result<(), IoError> {
    export_with_delimiter(records, path, b'\t')
}

fn export_with_delimiter(records: &[Vec<String>], path: &Path, delimiter: u8) -> Result<(), IoError> {
    // Report rows differ in width (exception rows keep every source cell)
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;

    for record in records {
        writer.write_record(record).map_err(|e| IoError::write(path, e))?;
    }

    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
