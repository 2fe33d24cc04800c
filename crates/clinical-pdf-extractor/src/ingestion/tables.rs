//! Table extraction from PDF layout text
//!
//! Uses poppler's `pdftotext -layout`, which keeps column alignment, and
//! treats runs of aligned multi-cell lines as tables. This works best for
//! machine-generated PDFs; there is no semantic table understanding.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::types::Table;

const PDFTOTEXT: &str = "pdftotext";

/// Two or more spaces/tabs separate cells in layout text
static CELL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid cell gap pattern"));

/// Anything that can pull tables out of a PDF on disk
pub trait TableExtractor {
    /// Tables in reading order (page by page)
    fn extract_tables(&self, path: &Path) -> Result<Vec<Table>>;
}

/// Table extractor backed by `pdftotext -layout`
#[derive(Debug, Clone)]
pub struct LayoutTableExtractor {
    program: PathBuf,
}

impl Default for LayoutTableExtractor {
    fn default() -> Self {
        Self {
            program: PathBuf::from(PDFTOTEXT),
        }
    }
}

impl LayoutTableExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `pdftotext` binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if pdftotext is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-v")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn layout_text(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("-layout")
            .args(["-enc", "UTF-8"])
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| Error::external_tool(PDFTOTEXT, format!("failed to spawn: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::external_tool(PDFTOTEXT, stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TableExtractor for LayoutTableExtractor {
    fn extract_tables(&self, path: &Path) -> Result<Vec<Table>> {
        let text = self.layout_text(path)?;
        let tables = parse_layout_tables(&text);
        tracing::info!("Found {} tables in {}", tables.len(), path.display());
        Ok(tables)
    }
}

/// Split one layout line into cells, or `None` if it is not a table row
fn split_row(line: &str) -> Option<Vec<String>> {
    let cells: Vec<String> = CELL_GAP
        .split(line.trim())
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();
    (cells.len() >= 2).then_some(cells)
}

/// Find tables in `pdftotext -layout` output.
///
/// Pages are separated by form feeds. A table is a run of consecutive lines
/// that each split into the same number (two or more) of cells; the first
/// line is the header. Runs without a data row are dropped.
pub fn parse_layout_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();

    for (page_idx, page) in text.split('\u{000C}').enumerate() {
        let page_number = page_idx as u32 + 1;
        let mut current: Vec<Vec<String>> = Vec::new();

        for line in page.lines() {
            match split_row(line) {
                Some(cells) if current.first().map_or(true, |h| h.len() == cells.len()) => {
                    current.push(cells);
                }
                Some(cells) => {
                    tables.extend(Table::from_rows(page_number, std::mem::take(&mut current)));
                    current.push(cells);
                }
                None => {
                    tables.extend(Table::from_rows(page_number, std::mem::take(&mut current)));
                }
            }
        }
        tables.extend(Table::from_rows(page_number, current));
    }

    tables
}

/// Write one table as CSV (header row first)
pub fn write_table_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write tables as `{prefix}_{n:03}.csv` in `dir`, numbered from 1
pub fn write_tables_csv(dir: &Path, prefix: &str, tables: &[Table]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        let path = dir.join(format!("{}_{:03}.csv", prefix, i + 1));
        write_table_csv(&path, table)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LAYOUT: &str = "\
Discharge Summary

Medication        Dose      Frequency
Metformin         500 mg    twice daily
Lisinopril        10 mg     once daily

Notes follow here as prose.
Single  Pair
\u{000C}Page two heading
Lab       Value
HbA1c     7.2 %
";

    #[test]
    fn test_parse_layout_tables() {
        let tables = parse_layout_tables(LAYOUT);
        assert_eq!(tables.len(), 2);

        assert_eq!(tables[0].page_number, 1);
        assert_eq!(tables[0].header, vec!["Medication", "Dose", "Frequency"]);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["Lisinopril", "10 mg", "once daily"]);

        assert_eq!(tables[1].page_number, 2);
        assert_eq!(tables[1].header, vec!["Lab", "Value"]);
        assert_eq!(tables[1].rows, vec![vec!["HbA1c".to_string(), "7.2 %".to_string()]]);
    }

    #[test]
    fn test_header_only_runs_are_dropped() {
        assert!(parse_layout_tables("Name    Value\n\nplain text\n").is_empty());
        assert!(parse_layout_tables("").is_empty());
    }

    #[test]
    fn test_width_change_starts_new_table() {
        let text = "a  b\nc  d\ne  f  g\nh  i  j\n";
        let tables = parse_layout_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].width(), 2);
        assert_eq!(tables[1].width(), 3);
    }

    #[test]
    fn test_write_tables_csv() {
        let dir = TempDir::new().unwrap();
        let tables = parse_layout_tables(LAYOUT);
        let written = write_tables_csv(dir.path(), "table", &tables).unwrap();

        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("table_001.csv"));
        assert!(written[1].ends_with("table_002.csv"));

        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(
            csv,
            "Medication,Dose,Frequency\nMetformin,500 mg,twice daily\nLisinopril,10 mg,once daily\n"
        );
    }

    #[test]
    fn test_missing_program_is_external_tool_error() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let extractor = LayoutTableExtractor::with_program("definitely-not-a-real-pdftotext");
        assert!(!extractor.is_available());
        let err = extractor.extract_tables(&pdf).unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
    }
}
