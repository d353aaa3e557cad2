// Dictionary suggestions from the data itself.
//
// Counts word frequencies across the posts (optionally only those labelled
// positive by a 0/1 ground-truth column) and turns the top N words into a
// single `auto_top_words` classifier. English stop words are skipped by
// default, otherwise "the" and "a" crowd out everything useful.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::{Classifier, Dictionary};
use crate::error::MetricsError;
use crate::tokenize::Tokenizer;

/// Name of the generated classifier.
pub const AUTO_CLASSIFIER: &str = "auto_top_words";

/// One row of input for suggestions: text plus an optional label cell.
#[derive(Debug, Clone, Copy)]
pub struct LabelledText<'a> {
    pub text: Option<&'a str>,
    pub label: Option<&'a str>,
}

/// A word and how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

/// Knobs for `suggest`.
pub struct SuggestOptions {
    /// How many words to keep (the form allowed 5 to 50)
    pub top_n: usize,
    /// Skip English stop words
    pub filter_stop_words: bool,
    /// Only count rows whose label is positive
    pub positives_only: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            top_n: 20,
            filter_stop_words: true,
            positives_only: false,
        }
    }
}

/// Frequencies plus the dictionary built from them.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub frequencies: Vec<WordFrequency>,
    pub dictionary: Dictionary,
    /// Rows that contributed words
    pub rows_used: usize,
}

/// A label cell counts as positive when it reads 1, 1.0 or true.
pub fn is_positive_label(label: &str) -> bool {
    matches!(
        label.trim().to_lowercase().as_str(),
        "1" | "1.0" | "true"
    )
}

/// Count words and keep the `top_n` most frequent. Ties keep the order in
/// which the words were first seen.
pub fn top_words<'a, I>(
    rows: I,
    tokenizer: &dyn Tokenizer,
    options: &SuggestOptions,
) -> (Vec<WordFrequency>, usize)
where
    I: IntoIterator<Item = LabelledText<'a>>,
{
    let stop_words: HashSet<String> = if options.filter_stop_words {
        let words: Vec<String> = get(LANGUAGE::English);
        words.into_iter().collect()
    } else {
        HashSet::new()
    };

    // word -> (count, first seen position)
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut rows_used = 0;

    for row in rows {
        if options.positives_only && !row.label.is_some_and(is_positive_label) {
            continue;
        }
        rows_used += 1;
        for token in tokenizer.tokenize_value(row.text) {
            if stop_words.contains(&token) {
                continue;
            }
            let next = counts.len();
            counts.entry(token).or_insert((0, next)).0 += 1;
        }
    }

    let mut ranked: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(options.top_n);

    let frequencies = ranked
        .into_iter()
        .map(|(word, count, _)| WordFrequency { word, count })
        .collect();

    (frequencies, rows_used)
}

/// Build an `auto_top_words` dictionary from the data.
pub fn suggest<'a, I>(
    rows: I,
    tokenizer: &dyn Tokenizer,
    options: &SuggestOptions,
) -> Result<Suggestion, MetricsError>
where
    I: IntoIterator<Item = LabelledText<'a>>,
{
    let (frequencies, rows_used) = top_words(rows, tokenizer, options);
    if frequencies.is_empty() {
        return Err(MetricsError::EmptyDictionary);
    }

    let mut dictionary = Dictionary::default();
    dictionary.insert(Classifier::new(
        AUTO_CLASSIFIER,
        frequencies.iter().map(|f| f.word.as_str()),
    ));

    info!(
        words = frequencies.len(),
        rows = rows_used,
        top_word = %frequencies[0].word,
        "Suggested dictionary from data"
    );

    Ok(Suggestion {
        frequencies,
        dictionary,
        rows_used,
    })
}
