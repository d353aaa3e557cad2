// Tokenization: text to lowercase word tokens behind a swappable trait.

pub mod traits;
pub mod words;

pub use traits::{Tokenizer, TokenizerKind};
pub use words::{WhitespaceTokenizer, WordTokenizer};

/// Tokenize with the default Unicode word tokenizer.
pub fn tokenize(text: &str) -> Vec<String> {
    WordTokenizer.tokenize(text)
}
