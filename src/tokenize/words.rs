// Word tokenizers built on unicode-segmentation.
//
// Both tokenizers lowercase first, then strip every non-alphanumeric
// character from each piece and drop pieces that end up empty. They differ
// only in how the text is cut into pieces.

use unicode_segmentation::UnicodeSegmentation;

use super::traits::Tokenizer;

/// Splits on UAX #29 word boundaries. Punctuation becomes its own segment
/// and is discarded after stripping, so "couture." yields "couture".
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_word_bounds()
            .filter_map(strip_token)
            .collect()
    }
}

/// Splits on whitespace only. "rock'n'roll" stays one token ("rocknroll").
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter_map(strip_token)
            .collect()
    }
}

/// Keep only alphanumeric characters; `None` when nothing survives.
fn strip_token(piece: &str) -> Option<String> {
    let token: String = piece.chars().filter(|c| c.is_alphanumeric()).collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_punctuation_is_dropped() {
        let tokens = WordTokenizer.tokenize("A diamante gown is couture.");
        assert_eq!(tokens, vec!["a", "diamante", "gown", "is", "couture"]);
    }

    #[test]
    fn test_hashtags_and_mentions_keep_their_word() {
        let tokens = WordTokenizer.tokenize("#OOTD with @Maison!!");
        assert_eq!(tokens, vec!["ootd", "with", "maison"]);
    }

    #[test]
    fn test_emoji_only_text_has_no_tokens() {
        assert!(WordTokenizer.tokenize("✨🔥 ... !!").is_empty());
    }

    #[test]
    fn test_non_ascii_letters_survive() {
        let tokens = WordTokenizer.tokenize("Café CRÈME");
        assert_eq!(tokens, vec!["café", "crème"]);
    }

    #[test]
    fn test_whitespace_tokenizer_joins_inner_punctuation() {
        let tokens = WhitespaceTokenizer.tokenize("Rock'n'roll, baby...  Yes");
        assert_eq!(tokens, vec!["rocknroll", "baby", "yes"]);
    }

    #[test]
    fn test_missing_value_is_empty() {
        assert!(WordTokenizer.tokenize_value(None).is_empty());
        assert_eq!(WordTokenizer.tokenize_value(Some("Hi")), vec!["hi"]);
    }
}
