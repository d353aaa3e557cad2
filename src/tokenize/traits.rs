// Tokenizer trait: the seam between text and counting.
//
// The aggregator only ever sees `Vec<String>` tokens, so the segmentation
// library behind this trait can change without touching the metrics code.

use std::str::FromStr;

/// Turns free text into lowercase, punctuation-free word tokens.
pub trait Tokenizer {
    /// Tokenize a present text value. Must be pure and deterministic.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Tokenize a cell that may be missing. Missing values yield no tokens.
    fn tokenize_value(&self, text: Option<&str>) -> Vec<String> {
        match text {
            Some(text) => self.tokenize(text),
            None => Vec::new(),
        }
    }
}

/// Which built-in tokenizer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerKind {
    /// Unicode word boundaries (default)
    #[default]
    Words,
    /// Plain whitespace splitting
    Whitespace,
}

impl TokenizerKind {
    pub fn build(self) -> Box<dyn Tokenizer> {
        match self {
            Self::Words => Box::new(super::words::WordTokenizer),
            Self::Whitespace => Box::new(super::words::WhitespaceTokenizer),
        }
    }
}

impl FromStr for TokenizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "words" | "word" | "unicode" => Ok(Self::Words),
            "whitespace" | "ws" => Ok(Self::Whitespace),
            other => Err(format!(
                "unknown tokenizer '{other}' (expected words or whitespace)"
            )),
        }
    }
}
