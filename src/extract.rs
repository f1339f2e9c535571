use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::error::{EtlError, EtlResult};

/// Where the source snapshot lives. `staged` is read only when `primary` is
/// missing, and is then copied to `primary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub primary: PathBuf,
    pub staged: PathBuf,
}

/// Header plus rows exactly as read, every row the header's width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn extract(source: &SourcePaths) -> EtlResult<RawTable> {
    info!("Extracting data from CSV file: {}", source.primary.display());
    let table = read_source(source).map_err(EtlError::extraction)?;
    info!("Successfully extracted {} player records", table.len());
    Ok(table)
}

fn read_source(source: &SourcePaths) -> Result<RawTable> {
    let content = if source.primary.exists() {
        fs::read_to_string(&source.primary)
            .with_context(|| format!("read {}", source.primary.display()))?
    } else {
        info!("CSV file not found, loading from staged content");
        load_staged(&source.staged, &source.primary)?
    };
    parse_table(&content)
}

fn load_staged(staged: &Path, primary: &Path) -> Result<String> {
    let content = fs::read_to_string(staged)
        .with_context(|| format!("read staged content {}", staged.display()))?;

    if let Some(parent) = primary.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(primary, &content)
        .with_context(|| format!("persist staged content to {}", primary.display()))?;
    info!("Saved staged content to {}", primary.display());
    Ok(content)
}

/// Strict delimited parse: a row wider or narrower than the header is an error.
pub fn parse_table(content: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("parse header row")?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(anyhow!("source has no header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("parse data row")?;
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::parse_table;

    #[test]
    fn parse_table_keeps_raw_values() {
        let table = parse_table(" Player ,Age\nA. Guard,-\n").unwrap();
        assert_eq!(table.headers, vec![" Player ", "Age"]);
        assert_eq!(table.rows, vec![vec!["A. Guard".to_string(), "-".to_string()]]);
    }

    #[test]
    fn parse_table_rejects_ragged_rows() {
        let err = parse_table("a,b\n1,2\n3\n").unwrap_err();
        assert!(format!("{err:#}").contains("parse data row"));
    }

    #[test]
    fn parse_table_rejects_empty_input() {
        assert!(parse_table("").is_err());
    }
}
