//! Targets file parsing for batch mode.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("error reading targets file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extract targets from newline-delimited text.
///
/// Blank lines and lines starting with `#` are skipped; everything else is
/// trimmed and kept in file order.
pub fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_targets_file(path: &Path) -> Result<Vec<String>, TargetsError> {
    let content = fs::read_to_string(path).map_err(|source| TargetsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_targets(&content))
}
