// Raw tables loaded from delimited files.
//
// A Table is the unresolved view of one upload: normalized headers plus
// string cells. Schema resolution decides later which columns matter.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::MetricsError;

/// One uploaded file, headers normalized, every row padded to header width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Where the table came from (file path or a caller-chosen label)
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Trim and lowercase a column header so `" Caption "` matches `caption`.
pub fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Cell `idx` of a row, or `""` when the row is shorter than that.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", String::as_str)
}

impl Table {
    /// Build a table from in-memory headers and rows.
    pub fn new(source: impl Into<String>, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut table = Self {
            source: source.into(),
            headers,
            rows,
        };
        table.align_rows();
        table
    }

    /// Read a comma-delimited table with a header row from any reader.
    pub fn from_reader<R: Read>(source: &str, reader: R) -> Result<Self, MetricsError> {
        let csv_err = |error: csv::Error| MetricsError::Csv {
            source_name: source.to_string(),
            error,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let values: Vec<String> = record.iter().map(str::to_string).collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            rows.push(values);
        }

        let mut table = Self {
            source: source.to_string(),
            headers,
            rows,
        };
        table.align_rows();

        debug!(
            source = %table.source,
            columns = table.headers.len(),
            rows = table.rows.len(),
            "Loaded table"
        );

        Ok(table)
    }

    /// Open and read a CSV file from disk.
    pub fn from_path(path: &Path) -> Result<Self, MetricsError> {
        let source = path.display().to_string();
        let file = File::open(path).map_err(|error| MetricsError::Io {
            source_name: source.clone(),
            error,
        })?;
        Self::from_reader(&source, file)
    }

    /// Position of a (normalized) header, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = normalize_header(name);
        self.headers.iter().position(|h| *h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pad short rows with empty cells so every index below the header
    /// width is valid. Extra trailing cells are kept but never addressed.
    fn align_rows(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_normalized() {
        let data = "\u{feff} Shortcode ,CAPTION\nP1,hello\n";
        let table = Table::from_reader("mem", data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["shortcode", "caption"]);
        assert_eq!(table.rows, vec![vec!["P1".to_string(), "hello".to_string()]]);
    }

    #[test]
    fn test_short_rows_are_padded_and_blank_rows_skipped() {
        let data = "shortcode,caption,likes\nP1,hi\n,,\nP2,yo,3\n";
        let table = Table::from_reader("mem", data.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["P1", "hi", ""]);
        assert_eq!(table.rows[1], vec!["P2", "yo", "3"]);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let data = "shortcode,caption\nP1,\"red, white and blue\"\n";
        let table = Table::from_reader("mem", data.as_bytes()).unwrap();
        assert_eq!(table.rows[0][1], "red, white and blue");
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let table = Table::new("mem", &["Post_ID", "Text"], vec![]);
        assert_eq!(table.column_index("post_id"), Some(0));
        assert_eq!(table.column_index(" TEXT "), Some(1));
        assert!(!table.has_column("caption"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_cell_past_row_end_is_empty() {
        let row = vec!["P1".to_string()];
        assert_eq!(cell(&row, 0), "P1");
        assert_eq!(cell(&row, 3), "");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Table::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, MetricsError::Io { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}
