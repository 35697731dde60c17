//! Product category lists.

use std::path::Path;

use crate::error::{DatasetError, DatasetResult};

/// Read a category list: one product per line, `#` headers and blank lines
/// ignored, names lower-cased.
///
/// Returns `(position, product)` pairs for the `count` products starting at
/// position `start` (all remaining products when `count` is `None`).
pub fn read_categories(
    path: &Path,
    start: usize,
    count: Option<usize>,
) -> DatasetResult<Vec<(usize, String)>> {
    let text = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    Ok(parse_categories(&text, start, count))
}

fn parse_categories(text: &str, start: usize, count: Option<usize>) -> Vec<(usize, String)> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .skip(start)
        .take(count.unwrap_or(usize::MAX))
        .collect()
}
