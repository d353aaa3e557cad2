// Error taxonomy for the metrics pipeline.
//
// Every failure is recoverable: the caller shows the message and lets the
// user retry with a different upload or dictionary. Nothing here panics.

use thiserror::Error;

use crate::ingest::schema::{ID_COLUMN, ID_ALIASES, TEXT_ALIASES, TEXT_COLUMN};

/// Errors returned by the library. The binary wraps these in `anyhow`.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// No input table supplies both an identifier and a text column.
    #[error(
        "no uploaded table supplies the required columns (missing: {}){}",
        .missing.join(", "),
        accepted_aliases(.missing)
    )]
    SchemaNotFound { missing: Vec<String> },

    /// The dictionary text produced zero usable classifiers.
    #[error("no valid classifiers detected; use one line per classifier, `name: word1, word2`")]
    EmptyDictionary,

    /// No files, or no rows in the selected table.
    #[error("no input rows supplied; upload at least one CSV with data rows")]
    EmptyInput,

    #[error("failed to read {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to parse CSV from {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("failed to serialize metrics as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetricsError {
    /// True for errors caused by user input rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. } | Self::EmptyDictionary | Self::EmptyInput
        )
    }
}

/// Hint listing the accepted headers for each missing canonical column.
fn accepted_aliases(missing: &[String]) -> String {
    let mut hints = Vec::new();
    for column in missing {
        let aliases = match column.as_str() {
            ID_COLUMN => ID_ALIASES,
            TEXT_COLUMN => TEXT_ALIASES,
            _ => continue,
        };
        hints.push(format!("{column} accepts: {}", aliases.join(", ")));
    }
    if hints.is_empty() {
        String::new()
    } else {
        format!("; {}", hints.join("; "))
    }
}
