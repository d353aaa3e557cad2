// Colored terminal output for metrics previews, schema checks and
// dictionary suggestions. main.rs delegates all display work here.

use colored::Colorize;

use crate::dictionary::suggest::Suggestion;
use crate::dictionary::Dictionary;
use crate::ingest::schema::{MatchKind, TableMatch};
use crate::ingest::table::Table;
use crate::metrics::models::percent_column;
use crate::pipeline::PipelineReport;

/// Width of the identifier column in previews.
const ID_WIDTH: usize = 16;

/// Show the first `limit` metrics rows as a table.
pub fn display_preview(report: &PipelineReport, limit: usize) {
    let table = &report.table;

    println!(
        "\n{}",
        format!(
            "=== Preview ({} of {} identifiers, {} records from {}) ===",
            limit.min(table.len()),
            table.len(),
            report.records,
            report.source
        )
        .bold()
    );
    println!(
        "  {}",
        format!(
            "identifier column: {}  |  text column: {}",
            report.id_column, report.text_column
        )
        .dimmed()
    );
    println!();

    let mut header = format!(
        "  {:<w$} {:>11}",
        "Identifier",
        "Total words",
        w = ID_WIDTH
    );
    for name in &table.classifiers {
        let width = column_width(name);
        header.push_str(&format!("  {:>width$}", name));
    }
    for name in &table.classifiers {
        let pct = percent_column(name);
        let width = column_width(&pct);
        header.push_str(&format!("  {:>width$}", pct));
    }
    println!("{}", header.dimmed());
    println!("  {}", "-".repeat(header.chars().count().saturating_sub(2)).dimmed());

    for row in table.rows.iter().take(limit) {
        let mut line = format!(
            "  {:<w$} {:>11}",
            super::truncate_chars(&row.identifier, ID_WIDTH - 3),
            row.total_words,
            w = ID_WIDTH
        );
        for (name, count) in table.classifiers.iter().zip(&row.counts) {
            let width = column_width(name);
            line.push_str(&format!("  {:>width$}", count));
        }
        print!("{line}");
        for (name, pct) in table.classifiers.iter().zip(&row.percentages) {
            let width = column_width(&percent_column(name));
            print!("  {}", colorize_percent(*pct, width));
        }
        println!();
    }

    if report.dropped_rows > 0 {
        println!(
            "\n  {} {} rows skipped (blank identifier)",
            "~".yellow(),
            report.dropped_rows
        );
    }
}

/// Show how each uploaded table was classified and which one wins.
pub fn display_inspection(tables: &[Table], matches: &[TableMatch], selected: Option<usize>) {
    println!(
        "\n{}",
        format!("=== Schema check ({} tables) ===", tables.len()).bold()
    );
    println!();

    for (table, verdict) in tables.iter().zip(matches) {
        let marker = if selected == Some(verdict.table_index) {
            "->".green().bold().to_string()
        } else {
            "  ".to_string()
        };
        let kind = match verdict.kind {
            Some(MatchKind::Strict) => "strict".green(),
            Some(MatchKind::Alias) => "alias".cyan(),
            None => "unqualified".red(),
        };
        println!(
            "  {} {:<40} {:<12} {} rows",
            marker,
            super::truncate_chars(&table.source, 37),
            kind,
            table.rows.len()
        );
        println!(
            "       identifier: {}  text: {}",
            verdict.id_column.as_deref().unwrap_or("-"),
            verdict.text_column.as_deref().unwrap_or("-"),
        );
        println!(
            "       {}",
            format!("columns: {}", table.headers.join(", ")).dimmed()
        );
    }

    println!();
    match selected {
        Some(index) => println!(
            "  {} {}",
            "Selected:".bold(),
            tables[index].source
        ),
        None => println!(
            "  {} no table has both an identifier and a text column",
            "!!".red().bold()
        ),
    }
}

/// Show suggested words and the dictionary line to paste.
pub fn display_suggestion(suggestion: &Suggestion) {
    println!(
        "\n{}",
        format!(
            "=== Top {} words ({} rows) ===",
            suggestion.frequencies.len(),
            suggestion.rows_used
        )
        .bold()
    );
    println!();
    println!("  {:>4}  {:<24} {:>6}", "#".dimmed(), "Word".dimmed(), "Count".dimmed());
    for (i, freq) in suggestion.frequencies.iter().enumerate() {
        println!("  {:>4}. {:<24} {:>6}", i + 1, freq.word, freq.count);
    }
    println!("\n{}", "Dictionary:".bold());
    display_dictionary(&suggestion.dictionary);
}

/// Print a dictionary in its text grammar.
pub fn display_dictionary(dictionary: &Dictionary) {
    for line in dictionary.to_text().lines() {
        println!("  {line}");
    }
}

fn column_width(header: &str) -> usize {
    header.chars().count().max(7)
}

/// Color a percentage cell: none, some, or a majority of words matched.
fn colorize_percent(pct: f64, width: usize) -> colored::ColoredString {
    let text = format!("{:>width$.2}", pct);
    if pct <= 0.0 {
        text.dimmed()
    } else if pct >= 50.0 {
        text.green().bold()
    } else {
        text.normal()
    }
}
