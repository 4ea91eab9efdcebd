//! File loading and writing.

use claimcheck_core::{AuditError, AuditResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read and parse a JSON file; any failure is malformed input
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> AuditResult<T> {
    let context = || format!("{} {}", what, path.display());
    let text = fs::read_to_string(path).map_err(|e| AuditError::malformed(context(), e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| AuditError::malformed(context(), e.to_string()))
}

/// `*.json` files directly inside `dir`, sorted by path
pub fn json_files(dir: &Path) -> AuditResult<Vec<PathBuf>> {
    let context = || format!("directory {}", dir.display());
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AuditError::malformed(context(), e.to_string()))? {
        let path = entry
            .map_err(|e| AuditError::malformed(context(), e.to_string()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Write pretty JSON followed by a newline
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)
}
