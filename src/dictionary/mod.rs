// Classifier dictionary: named keyword sets parsed from free text.
//
// Grammar: one classifier per line, `name: word1, word2, ...`. Lines without
// a colon are ignored, as are names that would shadow an export column.
// When a name repeats, the last definition wins but the classifier keeps
// the position of its first appearance.

pub mod suggest;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::MetricsError;
use crate::ingest::schema::ID_COLUMN;
use crate::metrics::TOTAL_WORDS_COLUMN;

/// Prefix of every percentage column in the export.
pub const PERCENT_PREFIX: &str = "%_";

/// True when a classifier with this name would collide with a fixed export
/// column or with another classifier's percentage column.
pub fn is_reserved_name(name: &str) -> bool {
    name == ID_COLUMN || name == TOTAL_WORDS_COLUMN || name.starts_with(PERCENT_PREFIX)
}

/// Dictionary used when the user supplies none.
pub const DEFAULT_DICTIONARY: &str =
    "luxury: diamante, couture, gala\ncasual: jeans, sneakers, chill";

/// A named set of lowercase keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classifier {
    pub name: String,
    /// Keywords in first-seen order, deduplicated
    pub keywords: Vec<String>,
    #[serde(skip)]
    lookup: HashSet<String>,
}

impl Classifier {
    /// Build a classifier, lowercasing and deduplicating keywords.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lookup = HashSet::new();
        let mut ordered = Vec::new();
        for word in keywords {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() && lookup.insert(word.clone()) {
                ordered.push(word);
            }
        }
        Self {
            name: name.into(),
            keywords: ordered,
            lookup,
        }
    }

    /// Membership test for a token from a `Tokenizer`, which is already
    /// lowercase.
    pub fn contains(&self, token: &str) -> bool {
        self.lookup.contains(token)
    }

    /// Case-insensitive membership test for a raw word.
    pub fn matches_word(&self, word: &str) -> bool {
        self.contains(&word.trim().to_lowercase())
    }

    /// Number of tokens that fall in this classifier's keyword set.
    pub fn count_matches(&self, tokens: &[String]) -> u64 {
        tokens.iter().filter(|t| self.contains(t)).count() as u64
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Ordered, name-unique collection of classifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dictionary {
    classifiers: Vec<Classifier>,
}

impl Dictionary {
    /// Parse dictionary text. Fails with `EmptyDictionary` when no line
    /// yields a named classifier with at least one keyword.
    pub fn parse(text: &str) -> Result<Self, MetricsError> {
        let mut dictionary = Self::default();

        for (line_no, line) in text.lines().enumerate() {
            let Some((name, words)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                debug!(line = line_no + 1, "Skipping classifier with empty name");
                continue;
            }

            let classifier = Classifier::new(name, words.split(','));
            if classifier.is_empty() {
                debug!(line = line_no + 1, name, "Skipping classifier with no keywords");
                continue;
            }
            dictionary.insert(classifier);
        }

        if dictionary.is_empty() {
            return Err(MetricsError::EmptyDictionary);
        }
        Ok(dictionary)
    }

    /// Add a classifier. A classifier with the same name is replaced in place.
    /// Names that would clash with export columns are skipped; returns
    /// whether the classifier was stored.
    pub fn insert(&mut self, classifier: Classifier) -> bool {
        if is_reserved_name(&classifier.name) {
            warn!(name = %classifier.name, "Classifier name clashes with an export column, skipping");
            return false;
        }
        match self
            .classifiers
            .iter()
            .position(|c| c.name == classifier.name)
        {
            Some(idx) => {
                warn!(name = %classifier.name, "Duplicate classifier, keeping the last definition");
                self.classifiers[idx] = classifier;
            }
            None => self.classifiers.push(classifier),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&Classifier> {
        self.classifiers.iter().find(|c| c.name == name)
    }

    pub fn classifiers(&self) -> &[Classifier] {
        &self.classifiers
    }

    pub fn names(&self) -> Vec<String> {
        self.classifiers.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Render back into the `name: word1, word2` grammar.
    pub fn to_text(&self) -> String {
        self.classifiers
            .iter()
            .map(|c| format!("{}: {}", c.name, c.keywords.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dictionary_parses() {
        let dict = Dictionary::parse(DEFAULT_DICTIONARY).unwrap();
        assert_eq!(dict.names(), vec!["luxury", "casual"]);
        assert!(dict.get("luxury").unwrap().contains("gala"));
    }

    #[test]
    fn test_split_on_first_colon_only() {
        let dict = Dictionary::parse("time: 10:30, noon").unwrap();
        assert_eq!(dict.get("time").unwrap().keywords, vec!["10:30", "noon"]);
    }

    #[test]
    fn test_keywords_are_deduplicated() {
        let c = Classifier::new("x", ["Jeans", "jeans ", " JEANS"]);
        assert_eq!(c.keywords, vec!["jeans"]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_matches_word_is_case_insensitive() {
        let c = Classifier::new("x", ["couture"]);
        assert!(c.contains("couture"));
        assert!(!c.contains("Couture"));
        assert!(c.matches_word(" Couture"));
        assert!(!c.matches_word("gown"));
    }

    #[test]
    fn test_round_trip_text() {
        let text = "luxury: diamante, couture\ncasual: jeans";
        let dict = Dictionary::parse(text).unwrap();
        assert_eq!(dict.to_text(), text);
    }
}
