// Unit tests for table loading and schema resolution.
//
// Covers alias detection, the strict raw-export layout, the two tie-break
// policies, explicit column overrides, and the SchemaNotFound report.

use tally::ingest::schema::{
    ColumnOverrides, MatchKind, Record, ResolutionPolicy, SchemaResolver,
};
use tally::ingest::table::Table;
use tally::MetricsError;

fn csv(source: &str, data: &str) -> Table {
    Table::from_reader(source, data.as_bytes()).unwrap()
}

fn raw_export() -> Table {
    csv(
        "raw.csv",
        "caption,shortcode,username,likes,comments\n\
         Couture gala,RAW1,alice,10,2\n",
    )
}

fn alias_table() -> Table {
    csv("alias.csv", "Post ID, Text \nAL1,jeans day\n")
}

// ============================================================
// Alias detection
// ============================================================

#[test]
fn alias_headers_with_case_and_whitespace_qualify() {
    let resolved = SchemaResolver::default().resolve(&[alias_table()]).unwrap();
    assert_eq!(resolved.kind, MatchKind::Alias);
    assert_eq!(resolved.id_column, "post id");
    assert_eq!(resolved.text_column, "text");
    assert_eq!(resolved.records, vec![Record::new("AL1", Some("jeans day"))]);
}

#[test]
fn other_columns_are_ignored() {
    let t = csv("t.csv", "likes,shortcode,extra,caption\n5,P1,x,hello\n");
    let resolved = SchemaResolver::default().resolve(&[t]).unwrap();
    assert_eq!(resolved.records, vec![Record::new("P1", Some("hello"))]);
}

#[test]
fn empty_caption_becomes_missing_value() {
    let t = csv("t.csv", "shortcode,caption\nP1,\nP2,\"  \"\n");
    let resolved = SchemaResolver::default().resolve(&[t]).unwrap();
    assert_eq!(resolved.records[0].text, None);
    assert_eq!(resolved.records[1].text, None);
}

#[test]
fn identifiers_are_trimmed_before_grouping() {
    let t = csv("t.csv", "shortcode,caption\n\" P1 \",hello\nP1,world\n");
    let resolved = SchemaResolver::default().resolve(&[t]).unwrap();
    assert_eq!(resolved.records[0].identifier, "P1");
    assert_eq!(resolved.records[1].identifier, "P1");
}

#[test]
fn hand_built_short_rows_do_not_panic() {
    let t = Table {
        source: "manual".to_string(),
        headers: vec!["shortcode".to_string(), "caption".to_string()],
        rows: vec![vec!["P1".to_string()], vec![]],
    };
    let resolved = SchemaResolver::default().resolve(&[t]).unwrap();
    assert_eq!(resolved.records, vec![Record::new("P1", None)]);
    assert_eq!(resolved.dropped_rows, 1);
}

// ============================================================
// Tie-break policy
// ============================================================

#[test]
fn strict_first_prefers_later_strict_table() {
    let tables = [alias_table(), raw_export()];
    let resolved = SchemaResolver::default().resolve(&tables).unwrap();
    assert_eq!(resolved.source, "raw.csv");
    assert_eq!(resolved.table_index, 1);
    assert_eq!(resolved.kind, MatchKind::Strict);
    assert_eq!(resolved.id_column, "shortcode");
    assert_eq!(resolved.text_column, "caption");
}

#[test]
fn first_qualifying_takes_earliest_table() {
    let tables = [alias_table(), raw_export()];
    let resolver = SchemaResolver::new(ResolutionPolicy::FirstQualifying, &ColumnOverrides::default());
    let resolved = resolver.resolve(&tables).unwrap();
    assert_eq!(resolved.source, "alias.csv");
}

#[test]
fn unqualified_tables_are_skipped() {
    let junk = csv("junk.csv", "a,b\n1,2\n");
    let resolved = SchemaResolver::default().resolve(&[junk, alias_table()]).unwrap();
    assert_eq!(resolved.source, "alias.csv");
}

#[test]
fn first_of_several_strict_tables_wins() {
    let second = csv(
        "raw2.csv",
        "caption,shortcode,username,likes,comments\nx,RAW2,bob,1,1\n",
    );
    let resolved = SchemaResolver::default().resolve(&[raw_export(), second]).unwrap();
    assert_eq!(resolved.source, "raw.csv");
}

#[test]
fn classify_all_reports_every_table() {
    let junk = csv("junk.csv", "a,b\n1,2\n");
    let resolver = SchemaResolver::default();
    let matches = resolver.classify_all(&[junk, alias_table(), raw_export()]);
    let kinds: Vec<Option<MatchKind>> = matches.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![None, Some(MatchKind::Alias), Some(MatchKind::Strict)]);
    assert_eq!(resolver.select(&matches), Some(2));
}

// ============================================================
// Column overrides
// ============================================================

#[test]
fn overrides_select_non_alias_columns() {
    let t = csv("t.csv", "handle,blurb,caption,shortcode\nH1,gala night,ignored,S1\n");
    let overrides = ColumnOverrides {
        id_column: Some("Handle".to_string()),
        text_column: Some("blurb".to_string()),
    };
    let resolved = SchemaResolver::new(ResolutionPolicy::StrictFirst, &overrides)
        .resolve(&[t])
        .unwrap();
    assert_eq!(resolved.id_column, "handle");
    assert_eq!(resolved.records, vec![Record::new("H1", Some("gala night"))]);
}

#[test]
fn override_disables_strict_layout() {
    let overrides = ColumnOverrides {
        id_column: Some("username".to_string()),
        text_column: None,
    };
    let resolved = SchemaResolver::new(ResolutionPolicy::StrictFirst, &overrides)
        .resolve(&[raw_export()])
        .unwrap();
    assert_eq!(resolved.kind, MatchKind::Alias);
    assert_eq!(resolved.records[0].identifier, "alice");
}

#[test]
fn missing_override_column_is_named() {
    let overrides = ColumnOverrides {
        id_column: None,
        text_column: Some("blurb".to_string()),
    };
    let err = SchemaResolver::new(ResolutionPolicy::StrictFirst, &overrides)
        .resolve(&[alias_table()])
        .unwrap_err();
    match err {
        MetricsError::SchemaNotFound { missing } => assert_eq!(missing, vec!["blurb"]),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================
// Failures
// ============================================================

#[test]
fn table_without_any_alias_names_both_columns() {
    let t = csv("t.csv", "username,likes\nalice,3\n");
    let err = SchemaResolver::default().resolve(&[t]).unwrap_err();
    let msg = err.to_string();
    match err {
        MetricsError::SchemaNotFound { missing } => {
            assert_eq!(missing, vec!["identifier", "text"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(msg.contains("identifier"));
    assert!(msg.contains("text"));
}

#[test]
fn ids_split_across_tables_do_not_combine() {
    let ids = csv("ids.csv", "shortcode\nP1\n");
    let texts = csv("texts.csv", "caption\nhello\n");
    let err = SchemaResolver::default().resolve(&[ids, texts]).unwrap_err();
    match err {
        // Both tables satisfy one rule; the earlier one is reported
        MetricsError::SchemaNotFound { missing } => assert_eq!(missing, vec!["text"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn no_tables_is_empty_input() {
    let err = SchemaResolver::default().resolve(&[]).unwrap_err();
    assert!(matches!(err, MetricsError::EmptyInput));
}
