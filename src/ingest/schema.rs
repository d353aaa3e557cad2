// Schema resolution: which table, which columns.
//
// Uploads come in two shapes. Raw Instagram exports carry a fixed column
// set (caption, shortcode, username, likes, comments) and are matched
// strictly. Anything else qualifies when it has one identifier alias and
// one text alias. Rules are evaluated in list order so the outcome never
// depends on header order within a file.

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use super::table::{cell, normalize_header, Table};
use crate::error::MetricsError;

/// Canonical name of the grouping key column.
pub const ID_COLUMN: &str = "identifier";
/// Canonical name of the free-text column.
pub const TEXT_COLUMN: &str = "text";

/// Headers accepted for the identifier, highest priority first.
pub const ID_ALIASES: &[&str] = &[
    "shortcode",
    "post_id",
    "postid",
    "post id",
    "post_shortcode",
    "id",
];

/// Headers accepted for the text, highest priority first.
pub const TEXT_ALIASES: &[&str] = &[
    "caption",
    "text",
    "post_text",
    "post_caption",
    "body",
    "content",
];

/// Columns a raw export must contain to match the strict schema.
pub const STRICT_COLUMNS: &[&str] = &["caption", "shortcode", "username", "likes", "comments"];

/// One resolution rule: a canonical column and the headers that fill it.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub canonical: &'static str,
    pub aliases: Vec<String>,
    /// Set when the caller named the column explicitly
    pub overridden: bool,
}

impl ColumnRule {
    fn from_aliases(canonical: &'static str, aliases: &[&str]) -> Self {
        Self {
            canonical,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            overridden: false,
        }
    }

    fn from_override(canonical: &'static str, column: &str) -> Self {
        Self {
            canonical,
            aliases: vec![normalize_header(column)],
            overridden: true,
        }
    }

    /// First alias present in the table, in rule order.
    fn find(&self, table: &Table) -> Option<String> {
        self.aliases
            .iter()
            .find(|alias| table.has_column(alias))
            .cloned()
    }

    /// Name reported when no table satisfies this rule. Overrides report
    /// the requested column, alias rules report the canonical name.
    fn missing_name(&self) -> String {
        match (self.overridden, self.aliases.first()) {
            (true, Some(column)) => column.clone(),
            _ => self.canonical.to_string(),
        }
    }
}

/// How to choose when several uploads qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// First strict table, else the first alias-qualified table.
    #[default]
    StrictFirst,
    /// First table that qualifies by either check.
    FirstQualifying,
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict-first" | "strict_first" | "strict" => Ok(Self::StrictFirst),
            "first-qualifying" | "first_qualifying" | "first" => Ok(Self::FirstQualifying),
            other => Err(format!(
                "unknown resolution policy '{other}' (expected strict-first or first-qualifying)"
            )),
        }
    }
}

/// Caller-chosen columns that replace the alias rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    pub id_column: Option<String>,
    pub text_column: Option<String>,
}

/// How a table qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Strict,
    Alias,
}

/// Per-table verdict, used by `resolve` and by `tally inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMatch {
    pub table_index: usize,
    pub kind: Option<MatchKind>,
    pub id_column: Option<String>,
    pub text_column: Option<String>,
}

impl TableMatch {
    pub fn qualifies(&self) -> bool {
        self.kind.is_some()
    }
}

/// One input row reduced to the two columns the metrics need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identifier: String,
    /// `None` when the cell is empty (a missing caption)
    pub text: Option<String>,
}

impl Record {
    pub fn new(identifier: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.map(str::to_string),
        }
    }
}

/// The chosen table with its canonical columns extracted.
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    /// Position of the chosen table in upload order
    pub table_index: usize,
    pub source: String,
    pub kind: MatchKind,
    /// Header that supplied the identifier
    pub id_column: String,
    /// Header that supplied the text
    pub text_column: String,
    pub records: Vec<Record>,
    /// Rows skipped because their identifier was blank
    pub dropped_rows: usize,
}

/// Ordered rules plus the tie-break policy.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    rules: [ColumnRule; 2],
    policy: ResolutionPolicy,
    strict_enabled: bool,
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::new(ResolutionPolicy::default(), &ColumnOverrides::default())
    }
}

impl SchemaResolver {
    pub fn new(policy: ResolutionPolicy, overrides: &ColumnOverrides) -> Self {
        let id_rule = match &overrides.id_column {
            Some(col) => ColumnRule::from_override(ID_COLUMN, col),
            None => ColumnRule::from_aliases(ID_COLUMN, ID_ALIASES),
        };
        let text_rule = match &overrides.text_column {
            Some(col) => ColumnRule::from_override(TEXT_COLUMN, col),
            None => ColumnRule::from_aliases(TEXT_COLUMN, TEXT_ALIASES),
        };

        Self {
            rules: [id_rule, text_rule],
            policy,
            // Explicit column choices take precedence over the raw-export layout
            strict_enabled: overrides.id_column.is_none() && overrides.text_column.is_none(),
        }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Classify a single table without extracting rows.
    pub fn classify(&self, index: usize, table: &Table) -> TableMatch {
        let is_strict =
            self.strict_enabled && STRICT_COLUMNS.iter().all(|c| table.has_column(c));
        if is_strict {
            return TableMatch {
                table_index: index,
                kind: Some(MatchKind::Strict),
                id_column: Some("shortcode".to_string()),
                text_column: Some("caption".to_string()),
            };
        }

        let [id_rule, text_rule] = &self.rules;
        let id = id_rule.find(table);
        let text = text_rule.find(table);
        let kind = match (&id, &text) {
            (Some(_), Some(_)) => Some(MatchKind::Alias),
            _ => None,
        };

        TableMatch {
            table_index: index,
            kind,
            id_column: id,
            text_column: text,
        }
    }

    /// Classify every table in upload order.
    pub fn classify_all(&self, tables: &[Table]) -> Vec<TableMatch> {
        tables
            .iter()
            .enumerate()
            .map(|(i, t)| self.classify(i, t))
            .collect()
    }

    /// Pick the table the policy prefers, if any qualifies.
    pub fn select(&self, matches: &[TableMatch]) -> Option<usize> {
        let first_of = |kind: MatchKind| {
            matches
                .iter()
                .find(|m| m.kind == Some(kind))
                .map(|m| m.table_index)
        };

        match self.policy {
            ResolutionPolicy::StrictFirst => {
                first_of(MatchKind::Strict).or_else(|| first_of(MatchKind::Alias))
            }
            ResolutionPolicy::FirstQualifying => {
                matches.iter().find(|m| m.qualifies()).map(|m| m.table_index)
            }
        }
    }

    /// Choose one table and extract its records.
    ///
    /// Fails with `SchemaNotFound` naming the columns the closest table
    /// lacked, or `EmptyInput` when there are no tables at all.
    pub fn resolve(&self, tables: &[Table]) -> Result<ResolvedTable, MetricsError> {
        if tables.is_empty() {
            return Err(MetricsError::EmptyInput);
        }

        let matches = self.classify_all(tables);
        let Some(index) = self.select(&matches) else {
            return Err(MetricsError::SchemaNotFound {
                missing: self.missing_columns(&matches),
            });
        };

        let table = &tables[index];
        let verdict = &matches[index];
        let (Some(kind), Some(id_column), Some(text_column)) = (
            verdict.kind,
            verdict.id_column.clone(),
            verdict.text_column.clone(),
        ) else {
            return Err(MetricsError::SchemaNotFound {
                missing: self.missing_columns(&matches),
            });
        };

        let (Some(id_idx), Some(text_idx)) = (
            table.column_index(&id_column),
            table.column_index(&text_column),
        ) else {
            return Err(MetricsError::SchemaNotFound {
                missing: self.missing_columns(&matches),
            });
        };

        let mut records = Vec::with_capacity(table.rows.len());
        let mut dropped_rows = 0;
        for row in &table.rows {
            // Surrounding whitespace is not part of an identifier: "P1 " and
            // "P1" are one group.
            let identifier = cell(row, id_idx).trim();
            if identifier.is_empty() {
                dropped_rows += 1;
                continue;
            }
            let text = cell(row, text_idx);
            let text = if text.trim().is_empty() { None } else { Some(text) };
            records.push(Record::new(identifier, text));
        }

        info!(
            source = %table.source,
            kind = ?kind,
            id_column = %id_column,
            text_column = %text_column,
            records = records.len(),
            dropped = dropped_rows,
            "Resolved input schema"
        );

        Ok(ResolvedTable {
            table_index: index,
            source: table.source.clone(),
            kind,
            id_column,
            text_column,
            records,
            dropped_rows,
        })
    }

    /// Columns absent from the table that satisfied the most rules.
    /// Ties go to the earliest upload.
    fn missing_columns(&self, matches: &[TableMatch]) -> Vec<String> {
        let best = matches.iter().max_by(|a, b| {
            let score = |m: &TableMatch| {
                usize::from(m.id_column.is_some()) + usize::from(m.text_column.is_some())
            };
            // Reverse index so that on equal score the earlier table wins
            score(a)
                .cmp(&score(b))
                .then_with(|| b.table_index.cmp(&a.table_index))
        });

        let [id_rule, text_rule] = &self.rules;
        let mut missing = Vec::new();
        match best {
            Some(m) => {
                if m.id_column.is_none() {
                    missing.push(id_rule.missing_name());
                }
                if m.text_column.is_none() {
                    missing.push(text_rule.missing_name());
                }
            }
            None => {
                missing.push(id_rule.missing_name());
                missing.push(text_rule.missing_name());
            }
        }

        debug!(?missing, "No table satisfied the schema");
        missing
    }
}
