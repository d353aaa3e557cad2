use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use tally::dictionary::suggest::{self, LabelledText, SuggestOptions};
use tally::ingest::schema::{ColumnOverrides, ResolutionPolicy, SchemaResolver};
use tally::ingest::table::{cell, Table};
use tally::output::ExportFormat;
use tally::pipeline::{self, PipelineOptions};
use tally::tokenize::TokenizerKind;
use tally::MetricsError;

mod config;

/// Tally: classifier word metrics for social-media posts.
///
/// Counts, per post identifier, how many words of each caption fall into
/// user-defined keyword classifiers, and exports the totals and percentages.
#[derive(Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute classifier metrics and export them
    Run {
        /// One or more CSV files (raw exports or any file with id/text columns)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Dictionary file, one classifier per line: `name: word1, word2`
        #[arg(long, short = 'd', conflicts_with_all = ["keywords", "auto_top_n"])]
        dictionary: Option<PathBuf>,

        /// Inline dictionary text (use \n between classifiers)
        #[arg(long, short = 'k', conflicts_with = "auto_top_n")]
        keywords: Option<String>,

        /// Generate the dictionary from the N most frequent words instead
        #[arg(long, value_parser = clap::value_parser!(u32).range(5..=50))]
        auto_top_n: Option<u32>,

        /// Ground-truth 0/1 column; with --auto-top-n only rows labelled 1 supply words
        #[arg(long, requires = "auto_top_n")]
        label_column: Option<String>,

        /// Keep English stop words in the generated dictionary
        #[arg(long, requires = "auto_top_n")]
        keep_stop_words: bool,

        /// Export path (default: classifier_metrics.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Export format; guessed from the output extension when omitted
        #[arg(long)]
        format: Option<ExportFormat>,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Tokenizer: words (Unicode word boundaries) or whitespace
        #[arg(long)]
        tokenizer: Option<TokenizerKind>,

        /// Rows to show in the terminal preview
        #[arg(long)]
        preview: Option<usize>,
    },

    /// Show which uploaded table and columns would be used
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// Suggest a dictionary from the most frequent words in a file
    Suggest {
        file: PathBuf,

        /// Text column (default: first text alias found)
        #[arg(long)]
        text_column: Option<String>,

        /// Ground-truth 0/1 column; only rows labelled 1 are counted
        #[arg(long)]
        label_column: Option<String>,

        /// Number of words to keep
        #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(5..=50))]
        top_n: u32,

        /// Count English stop words too
        #[arg(long)]
        keep_stop_words: bool,

        #[arg(long)]
        tokenizer: Option<TokenizerKind>,
    },
}

/// Column selection shared by `run` and `inspect`.
#[derive(clap::Args)]
struct ColumnArgs {
    /// Column holding the post text (overrides alias detection)
    #[arg(long)]
    text_column: Option<String>,

    /// Column holding the post identifier (overrides alias detection)
    #[arg(long)]
    id_column: Option<String>,

    /// Which table wins when several qualify: strict-first or first-qualifying
    #[arg(long)]
    policy: Option<ResolutionPolicy>,
}

impl ColumnArgs {
    fn overrides(&self) -> ColumnOverrides {
        ColumnOverrides {
            id_column: self.id_column.clone(),
            text_column: self.text_column.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tally=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    match cli.command {
        Commands::Run {
            files,
            dictionary,
            keywords,
            auto_top_n,
            label_column,
            keep_stop_words,
            output,
            format,
            columns,
            tokenizer,
            preview,
        } => {
            let tables = load_tables(&files)?;
            let options = PipelineOptions {
                tokenizer: tokenizer.unwrap_or(config.tokenizer),
                policy: columns.policy.unwrap_or(config.policy),
                overrides: columns.overrides(),
            };

            let report = match auto_top_n {
                Some(top_n) => {
                    let suggest_options = SuggestOptions {
                        top_n: top_n as usize,
                        filter_stop_words: !keep_stop_words,
                        positives_only: label_column.is_some(),
                    };
                    let (suggestion, report) = pipeline::run_auto(
                        &tables,
                        label_column.as_deref(),
                        &suggest_options,
                        &options,
                    )
                    .map_err(explain)?;
                    tally::output::terminal::display_suggestion(&suggestion);
                    report
                }
                None => {
                    let dictionary_text = config.dictionary_text(
                        keywords.as_deref().map(unescape_newlines).as_deref(),
                        dictionary.as_ref(),
                    )?;
                    pipeline::run(&tables, &dictionary_text, &options).map_err(explain)?
                }
            };

            tally::output::terminal::display_preview(
                &report,
                preview.unwrap_or(config.preview_rows),
            );

            let output = output.unwrap_or_else(|| config.output_path.clone());
            let format = format.unwrap_or_else(|| ExportFormat::from_path(&output));
            tally::output::export(&report.table, &output, format)
                .with_context(|| format!("Failed to export metrics to {}", output.display()))?;

            info!(
                summary = %serde_json::to_string(&report.summary())?,
                "Run complete"
            );
            println!(
                "\n{}",
                format!("Metrics saved to: {}", output.display()).bold()
            );
        }

        Commands::Inspect { files, columns } => {
            let tables = load_tables(&files)?;
            let resolver = SchemaResolver::new(
                columns.policy.unwrap_or(config.policy),
                &columns.overrides(),
            );
            let matches = resolver.classify_all(&tables);
            let selected = resolver.select(&matches);
            tally::output::terminal::display_inspection(&tables, &matches, selected);
        }

        Commands::Suggest {
            file,
            text_column,
            label_column,
            top_n,
            keep_stop_words,
            tokenizer,
        } => {
            let table = Table::from_path(&file).map_err(explain)?;
            let text_idx = match text_column.as_deref() {
                Some(col) => table.column_index(col),
                None => tally::ingest::schema::TEXT_ALIASES
                    .iter()
                    .find_map(|alias| table.column_index(alias)),
            };
            let Some(text_idx) = text_idx else {
                let missing = text_column.unwrap_or_else(|| "text".to_string());
                return Err(explain(MetricsError::SchemaNotFound {
                    missing: vec![missing],
                }));
            };
            let label_idx = match label_column.as_deref() {
                Some(col) => Some(table.column_index(col).ok_or_else(|| {
                    explain(MetricsError::SchemaNotFound {
                        missing: vec![col.to_string()],
                    })
                })?),
                None => None,
            };

            let rows = table.rows.iter().map(|row| LabelledText {
                text: Some(cell(row, text_idx)).filter(|t| !t.trim().is_empty()),
                label: label_idx.map(|i| cell(row, i)),
            });
            let options = SuggestOptions {
                top_n: top_n as usize,
                filter_stop_words: !keep_stop_words,
                positives_only: label_idx.is_some(),
            };
            let tokenizer = tokenizer.unwrap_or(config.tokenizer).build();

            let suggestion =
                suggest::suggest(rows, tokenizer.as_ref(), &options).map_err(explain)?;
            tally::output::terminal::display_suggestion(&suggestion);
        }
    }

    Ok(())
}

/// Load every file, with a progress bar when there is more than one.
fn load_tables(files: &[PathBuf]) -> Result<Vec<Table>> {
    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Loading [{bar:30}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?,
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        pb.set_message(display_name(path));
        let table = Table::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        if table.is_empty() {
            warn!(file = %path.display(), "File has no data rows");
        }
        tables.push(table);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(files = tables.len(), "Loaded input files");
    Ok(tables)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `--keywords "a: x\nb: y"` arrives with a literal backslash-n from most shells.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Attach a next step to input errors so the message tells the user what
/// to change. I/O and CSV errors already name the file.
fn explain(err: MetricsError) -> anyhow::Error {
    if err.is_input_error() {
        anyhow::Error::new(err)
            .context("Nothing to compute; check the uploaded files and the dictionary")
    } else {
        err.into()
    }
}
