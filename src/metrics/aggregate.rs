// Per-record counting and per-identifier aggregation.
//
// Each record is tokenized once; its token count and per-classifier match
// counts are added into the bucket for its identifier. Sums commute, so the
// result does not depend on record order. Buckets live in a BTreeMap and
// come out sorted by identifier.

use std::collections::BTreeMap;

use tracing::debug;

use super::models::{MetricsRow, MetricsTable};
use crate::dictionary::Dictionary;
use crate::ingest::schema::Record;
use crate::tokenize::Tokenizer;

/// Counts for a single record before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCounts {
    pub total_words: u64,
    /// Match counts, in dictionary order
    pub counts: Vec<u64>,
}

/// Count one record's tokens against every classifier. Tokens may match
/// more than one classifier.
pub fn count_tokens(tokens: &[String], dictionary: &Dictionary) -> RecordCounts {
    RecordCounts {
        total_words: tokens.len() as u64,
        counts: dictionary
            .classifiers()
            .iter()
            .map(|c| c.count_matches(tokens))
            .collect(),
    }
}

/// Tokenize and count a single text value. Missing text counts as zero words.
pub fn count_text(
    text: Option<&str>,
    dictionary: &Dictionary,
    tokenizer: &dyn Tokenizer,
) -> RecordCounts {
    let tokens = tokenizer.tokenize_value(text);
    count_tokens(&tokens, dictionary)
}

/// Running sums for one identifier.
#[derive(Debug, Clone)]
struct Bucket {
    total_words: u64,
    counts: Vec<u64>,
}

impl Bucket {
    fn new(classifiers: usize) -> Self {
        Self {
            total_words: 0,
            counts: vec![0; classifiers],
        }
    }

    fn add(&mut self, counts: &RecordCounts) {
        self.total_words += counts.total_words;
        for (sum, c) in self.counts.iter_mut().zip(&counts.counts) {
            *sum += c;
        }
    }
}

/// Group records by identifier, sum their counts, and derive percentages.
pub fn aggregate<'a, I>(records: I, dictionary: &Dictionary, tokenizer: &dyn Tokenizer) -> MetricsTable
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut record_count = 0usize;

    for record in records {
        let counts = count_text(record.text.as_deref(), dictionary, tokenizer);
        buckets
            .entry(record.identifier.clone())
            .or_insert_with(|| Bucket::new(dictionary.len()))
            .add(&counts);
        record_count += 1;
    }

    let rows: Vec<MetricsRow> = buckets
        .into_iter()
        .map(|(identifier, bucket)| {
            MetricsRow::from_counts(identifier, bucket.total_words, bucket.counts)
        })
        .collect();

    debug!(
        records = record_count,
        identifiers = rows.len(),
        classifiers = dictionary.len(),
        "Aggregated classifier metrics"
    );

    MetricsTable {
        classifiers: dictionary.names(),
        rows,
    }
}
