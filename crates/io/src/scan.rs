// Scanner output: one reading per line

use std::path::Path;

use tracing::debug;

use crate::csv::read_file_as_utf8;
use crate::error::IoError;

/// Read raw scanner readings. Lines are returned untrimmed and unfiltered;
/// the engine decides which ones are tags.
pub fn import(path: &Path) -> Result<Vec<String>, IoError> {
    let content = read_file_as_utf8(path)?;
    let readings: Vec<String> = content.lines().map(str::to_string).collect();
    debug!(path = %path.display(), lines = readings.len(), "scanner list read");
    Ok(readings)
}
