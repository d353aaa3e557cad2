// Result types for classifier word metrics.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dictionary::PERCENT_PREFIX;
use crate::ingest::schema::ID_COLUMN;

/// Column holding the summed token count.
pub const TOTAL_WORDS_COLUMN: &str = "total_words";

/// Header used for a classifier's percentage column.
pub fn percent_column(classifier: &str) -> String {
    format!("{PERCENT_PREFIX}{classifier}")
}

/// `100 × matches / total`, or 0 when there are no words at all.
/// Not rounded.
pub fn percentage(matches: u64, total_words: u64) -> f64 {
    if total_words == 0 {
        0.0
    } else {
        matches as f64 * 100.0 / total_words as f64
    }
}

/// Metrics for one identifier, summed over all of its records.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub identifier: String,
    pub total_words: u64,
    /// Match counts, in dictionary order
    pub counts: Vec<u64>,
    /// Percentages, in dictionary order
    pub percentages: Vec<f64>,
}

impl MetricsRow {
    /// Build a row from summed counts, deriving the percentages.
    pub fn from_counts(identifier: String, total_words: u64, counts: Vec<u64>) -> Self {
        let percentages = counts
            .iter()
            .map(|&c| percentage(c, total_words))
            .collect();
        Self {
            identifier,
            total_words,
            counts,
            percentages,
        }
    }
}

/// One row per identifier plus the classifier names that label the columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    pub classifiers: Vec<String>,
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Export header: identifier, total_words, each classifier count, then
    /// each classifier percentage.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(2 + self.classifiers.len() * 2);
        headers.push(ID_COLUMN.to_string());
        headers.push(TOTAL_WORDS_COLUMN.to_string());
        headers.extend(self.classifiers.iter().cloned());
        headers.extend(self.classifiers.iter().map(|c| percent_column(c)));
        headers
    }

    pub fn row(&self, identifier: &str) -> Option<&MetricsRow> {
        self.rows.iter().find(|r| r.identifier == identifier)
    }

    fn classifier_index(&self, classifier: &str) -> Option<usize> {
        self.classifiers.iter().position(|c| c == classifier)
    }

    /// Match count for one identifier and classifier.
    pub fn count(&self, identifier: &str, classifier: &str) -> Option<u64> {
        let idx = self.classifier_index(classifier)?;
        self.row(identifier).map(|r| r.counts[idx])
    }

    /// Percentage for one identifier and classifier.
    pub fn percent(&self, identifier: &str, classifier: &str) -> Option<f64> {
        let idx = self.classifier_index(classifier)?;
        self.row(identifier).map(|r| r.percentages[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as keyed objects for JSON export, columns in header order.
    pub fn json_rows(&self) -> Vec<JsonRow<'_>> {
        self.rows
            .iter()
            .map(|row| JsonRow { table: self, row })
            .collect()
    }
}

/// Serializes one metrics row as `{identifier, total_words, <c>, %_<c>}`.
pub struct JsonRow<'a> {
    table: &'a MetricsTable,
    row: &'a MetricsRow,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.table.classifiers.len();
        let mut map = serializer.serialize_map(Some(2 + n * 2))?;
        map.serialize_entry(ID_COLUMN, &self.row.identifier)?;
        map.serialize_entry(TOTAL_WORDS_COLUMN, &self.row.total_words)?;
        for (name, count) in self.table.classifiers.iter().zip(&self.row.counts) {
            map.serialize_entry(name, count)?;
        }
        for (name, pct) in self.table.classifiers.iter().zip(&self.row.percentages) {
            map.serialize_entry(&percent_column(name), pct)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_percentage_is_unrounded() {
        let p = percentage(1, 3);
        assert!((p - 100.0 / 3.0).abs() < 1e-12);
        assert_eq!(percentage(2, 5), 40.0);
    }

    #[test]
    fn test_headers_counts_then_percentages() {
        let table = MetricsTable {
            classifiers: vec!["luxury".to_string(), "casual".to_string()],
            rows: vec![],
        };
        assert_eq!(
            table.headers(),
            vec![
                "identifier",
                "total_words",
                "luxury",
                "casual",
                "%_luxury",
                "%_casual"
            ]
        );
    }

    #[test]
    fn test_json_row_shape() {
        let table = MetricsTable {
            classifiers: vec!["luxury".to_string()],
            rows: vec![MetricsRow::from_counts("P1".to_string(), 5, vec![2])],
        };
        let json = serde_json::to_value(table.json_rows()).unwrap();
        assert_eq!(json[0]["identifier"], "P1");
        assert_eq!(json[0]["total_words"], 5);
        assert_eq!(json[0]["luxury"], 2);
        assert_eq!(json[0]["%_luxury"], 40.0);
    }
}
