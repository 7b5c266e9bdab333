use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Read a contact list export into positional rows. Quoted fields may hold
/// commas, doubled quotes and line breaks. Rows may have any number of
/// fields; blank lines are skipped. The first row is returned like any other.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    parse_rows(&content)
}

pub fn parse_rows(content: &str) -> Result<Vec<Vec<String>>> {
    // Strip BOM if present (spreadsheet exports often carry one)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed import row {}", i + 1))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
