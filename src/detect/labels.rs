//! Class labels file reading.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read class names from a labels file.
///
/// # File Format
/// - One class per line, in model output order
/// - Lines may carry an `index: ` prefix (as printed by Ultralytics), which is stripped
/// - Blank lines and lines starting with `#` are ignored
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::LabelsRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut labels = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Some(label) = parse_label_line(&line) {
            labels.push(label.to_string());
        }
    }

    Ok(labels)
}

fn parse_label_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let name = match trimmed.split_once(':') {
        Some((index, rest)) if index.trim().chars().all(|c| c.is_ascii_digit()) => rest.trim(),
        _ => trimmed,
    };
    let name = name.trim_matches(|c| c == '\'' || c == '"');

    (!name.is_empty()).then_some(name)
}
