// The metrics pipeline as one function of its inputs.
//
// Uploaded tables and dictionary text are passed in explicitly; nothing is
// read from ambient state. A run either returns a complete table or one of
// the MetricsError input errors, never a partial result.

use serde::Serialize;
use tracing::info;

use crate::dictionary::suggest::{self, LabelledText, SuggestOptions, Suggestion};
use crate::dictionary::Dictionary;
use crate::error::MetricsError;
use crate::ingest::schema::{
    ColumnOverrides, MatchKind, ResolutionPolicy, ResolvedTable, SchemaResolver,
};
use crate::ingest::table::{cell, Table};
use crate::metrics::{aggregate, MetricsTable};
use crate::tokenize::TokenizerKind;

/// Everything a run can be configured with besides its data.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub tokenizer: TokenizerKind,
    pub policy: ResolutionPolicy,
    pub overrides: ColumnOverrides,
}

/// The metrics plus where they came from.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Source of the table that was used
    pub source: String,
    pub kind: MatchKind,
    pub id_column: String,
    pub text_column: String,
    pub records: usize,
    /// Rows skipped because their identifier was blank
    pub dropped_rows: usize,
    pub table: MetricsTable,
}

/// Summary that is safe to print or log alongside an export.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub source: &'a str,
    pub kind: MatchKind,
    pub id_column: &'a str,
    pub text_column: &'a str,
    pub records: usize,
    pub identifiers: usize,
    pub dropped_rows: usize,
}

impl PipelineReport {
    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            source: &self.source,
            kind: self.kind,
            id_column: &self.id_column,
            text_column: &self.text_column,
            records: self.records,
            identifiers: self.table.len(),
            dropped_rows: self.dropped_rows,
        }
    }
}

/// Run the full pipeline.
///
/// Check order: no tables (`EmptyInput`), dictionary (`EmptyDictionary`),
/// schema (`SchemaNotFound`), no usable rows (`EmptyInput`).
pub fn run(
    tables: &[Table],
    dictionary_text: &str,
    options: &PipelineOptions,
) -> Result<PipelineReport, MetricsError> {
    if tables.is_empty() {
        return Err(MetricsError::EmptyInput);
    }

    let dictionary = Dictionary::parse(dictionary_text)?;
    run_with_dictionary(tables, &dictionary, options)
}

/// Run the pipeline with an already-built dictionary (e.g. a suggested one).
pub fn run_with_dictionary(
    tables: &[Table],
    dictionary: &Dictionary,
    options: &PipelineOptions,
) -> Result<PipelineReport, MetricsError> {
    if tables.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    if dictionary.is_empty() {
        return Err(MetricsError::EmptyDictionary);
    }

    let resolved = resolve(tables, options)?;
    Ok(compute(resolved, dictionary, options))
}

/// Run the pipeline with a dictionary generated from the chosen table.
///
/// The top `suggest_options.top_n` words of the text column become a single
/// `auto_top_words` classifier. With a `label_column`, only rows labelled
/// positive contribute words; every row is still measured.
///
/// Check order: no tables, schema, no usable rows, label column, then an
/// empty suggestion (`EmptyDictionary`).
pub fn run_auto(
    tables: &[Table],
    label_column: Option<&str>,
    suggest_options: &SuggestOptions,
    options: &PipelineOptions,
) -> Result<(Suggestion, PipelineReport), MetricsError> {
    if tables.is_empty() {
        return Err(MetricsError::EmptyInput);
    }

    let resolved = resolve(tables, options)?;
    let table = &tables[resolved.table_index];
    let text_idx = table
        .column_index(&resolved.text_column)
        .ok_or_else(|| MetricsError::SchemaNotFound {
            missing: vec![resolved.text_column.clone()],
        })?;
    let label_idx = match label_column {
        Some(col) => Some(table.column_index(col).ok_or_else(|| {
            MetricsError::SchemaNotFound {
                missing: vec![col.to_string()],
            }
        })?),
        None => None,
    };

    let rows = table.rows.iter().map(|row| LabelledText {
        text: Some(cell(row, text_idx)).filter(|t| !t.trim().is_empty()),
        label: label_idx.map(|i| cell(row, i)),
    });
    let options_for_rows = SuggestOptions {
        top_n: suggest_options.top_n,
        filter_stop_words: suggest_options.filter_stop_words,
        positives_only: label_idx.is_some(),
    };
    let tokenizer = options.tokenizer.build();
    let suggestion = suggest::suggest(rows, tokenizer.as_ref(), &options_for_rows)?;

    let report = compute(resolved, &suggestion.dictionary, options);
    Ok((suggestion, report))
}

/// Choose the table and make sure it has at least one usable row.
fn resolve(tables: &[Table], options: &PipelineOptions) -> Result<ResolvedTable, MetricsError> {
    let resolver = SchemaResolver::new(options.policy, &options.overrides);
    let resolved = resolver.resolve(tables)?;
    if resolved.records.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    Ok(resolved)
}

fn compute(
    resolved: ResolvedTable,
    dictionary: &Dictionary,
    options: &PipelineOptions,
) -> PipelineReport {
    let tokenizer = options.tokenizer.build();
    let table = aggregate(&resolved.records, dictionary, tokenizer.as_ref());

    info!(
        source = %resolved.source,
        records = resolved.records.len(),
        identifiers = table.len(),
        classifiers = dictionary.len(),
        "Computed classifier metrics"
    );

    PipelineReport {
        source: resolved.source,
        kind: resolved.kind,
        id_column: resolved.id_column,
        text_column: resolved.text_column,
        records: resolved.records.len(),
        dropped_rows: resolved.dropped_rows,
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tables_is_empty_input() {
        let err = run(&[], "x: a", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, MetricsError::EmptyInput));
    }

    #[test]
    fn test_header_only_table_is_empty_input() {
        let table = Table::new("mem", &["shortcode", "caption"], vec![]);
        let err = run(&[table], "x: a", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, MetricsError::EmptyInput));
    }

    #[test]
    fn test_summary_reflects_resolution() {
        let table = Table::new(
            "posts.csv",
            &["Post_ID", "Text"],
            vec![vec!["P1".to_string(), "hello world".to_string()]],
        );
        let report = run(&[table], "x: hello", &PipelineOptions::default()).unwrap();
        let summary = report.summary();
        assert_eq!(summary.source, "posts.csv");
        assert_eq!(summary.kind, MatchKind::Alias);
        assert_eq!(summary.id_column, "post_id");
        assert_eq!(summary.text_column, "text");
        assert_eq!(summary.identifiers, 1);
    }

    #[test]
    fn test_auto_missing_label_column_is_named() {
        let table = Table::new(
            "posts.csv",
            &["shortcode", "caption"],
            vec![vec!["P1".to_string(), "hello".to_string()]],
        );
        let err = run_auto(
            &[table],
            Some("label"),
            &SuggestOptions::default(),
            &PipelineOptions::default(),
        )
        .unwrap_err();
        match err {
            MetricsError::SchemaNotFound { missing } => assert_eq!(missing, vec!["label"]),
            other => panic!("expected SchemaNotFound, got {other:?}"),
        }
    }
}
