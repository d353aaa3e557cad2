// Output: terminal preview and file export.

pub mod terminal;

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::MetricsError;
use crate::metrics::MetricsTable;

/// Default export file name.
pub const DEFAULT_OUTPUT: &str = "classifier_metrics.csv";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// Shortest representation that round-trips, always with a decimal point
/// (`40.0`, `33.333333333333336`).
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Write the table as CSV: header row, no index column, UTF-8.
pub fn write_csv<W: Write>(table: &MetricsTable, writer: W) -> Result<(), MetricsError> {
    let csv_err = |error: csv::Error| MetricsError::Csv {
        source_name: "export".to_string(),
        error,
    };

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.headers()).map_err(csv_err)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(2 + row.counts.len() * 2);
        record.push(row.identifier.clone());
        record.push(row.total_words.to_string());
        record.extend(row.counts.iter().map(|c| c.to_string()));
        record.extend(row.percentages.iter().map(|p| format_float(*p)));
        out.write_record(&record).map_err(csv_err)?;
    }

    out.flush().map_err(|error| MetricsError::Io {
        source_name: "export".to_string(),
        error,
    })
}

/// Write the table as a JSON array of row objects.
pub fn write_json<W: Write>(table: &MetricsTable, writer: W) -> Result<(), MetricsError> {
    serde_json::to_writer_pretty(writer, &table.json_rows())?;
    Ok(())
}

/// Render the CSV export into memory (what a download button would serve).
pub fn to_csv_bytes(table: &MetricsTable) -> Result<Vec<u8>, MetricsError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Write the table to `path` in the given format.
pub fn export(table: &MetricsTable, path: &Path, format: ExportFormat) -> Result<(), MetricsError> {
    let io_err = |error: std::io::Error| MetricsError::Io {
        source_name: path.display().to_string(),
        error,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;

    match format {
        ExportFormat::Csv => write_csv(table, file)?,
        ExportFormat::Json => write_json(table, file)?,
    }

    info!(path = %path.display(), rows = table.len(), format = ?format, "Exported metrics");
    Ok(())
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so captions full of emoji are safe.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_keeps_decimal_point() {
        assert_eq!(format_float(40.0), "40.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(100.0 / 3.0), "33.333333333333336");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("ééé", 2), "éé...");
        assert_eq!(truncate_chars("hi", 5), "hi");
    }
}
