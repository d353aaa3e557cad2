use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use tally::dictionary::DEFAULT_DICTIONARY;
use tally::ingest::schema::ResolutionPolicy;
use tally::output::DEFAULT_OUTPUT;
use tally::tokenize::TokenizerKind;

/// Rows shown in the terminal preview when nothing else is configured.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Defaults loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every value can be
/// overridden by the matching command-line flag.
pub struct Config {
    /// Dictionary file used when neither --dictionary nor --keywords is given
    pub dictionary_path: Option<PathBuf>,
    /// Where `tally run` writes its export (TALLY_OUTPUT)
    pub output_path: PathBuf,
    pub tokenizer: TokenizerKind,
    pub policy: ResolutionPolicy,
    pub preview_rows: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unknown tokenizer or policy names are errors rather than silently
    /// falling back, so a typo in .env is noticed.
    pub fn load() -> Result<Self> {
        let tokenizer = match env::var("TALLY_TOKENIZER") {
            Ok(v) => v
                .parse::<TokenizerKind>()
                .map_err(anyhow::Error::msg)
                .context("Invalid TALLY_TOKENIZER")?,
            Err(_) => TokenizerKind::default(),
        };

        let policy = match env::var("TALLY_POLICY") {
            Ok(v) => v
                .parse::<ResolutionPolicy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid TALLY_POLICY")?,
            Err(_) => ResolutionPolicy::default(),
        };

        let preview_rows = match env::var("TALLY_PREVIEW_ROWS") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid TALLY_PREVIEW_ROWS: {v}"))?,
            Err(_) => DEFAULT_PREVIEW_ROWS,
        };

        Ok(Self {
            dictionary_path: env::var("TALLY_DICTIONARY").ok().map(PathBuf::from),
            output_path: env::var("TALLY_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT)),
            tokenizer,
            policy,
            preview_rows,
        })
    }

    /// Resolve dictionary text: inline text, then a file (flag or
    /// TALLY_DICTIONARY), then the built-in default.
    pub fn dictionary_text(
        &self,
        inline: Option<&str>,
        path: Option<&PathBuf>,
    ) -> Result<String> {
        if let Some(text) = inline {
            return Ok(text.to_string());
        }
        match path.or(self.dictionary_path.as_ref()) {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read dictionary file {}", path.display())),
            None => Ok(DEFAULT_DICTIONARY.to_string()),
        }
    }
}
