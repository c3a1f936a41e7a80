// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::IoError;

/// Write any serializable report as pretty-printed JSON.
pub fn export<T: Serialize>(value: &T, path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| IoError::write(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_pretty_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");
        export(&serde_json::json!({"summary": {"missing": 2}}), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["summary"]["missing"], 2);
    }

    #[test]
    fn unwritable_path_is_write_error() {
        let err = export(&1, Path::new("/nonexistent/dir/result.json")).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }
}
