// Property-based tests for the merge invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashMap;

use proptest::prelude::*;
use catalog_merge::config::{MergeConfig, DEFAULT_PROTECTED_COLUMNS};
use catalog_merge::model::MatchOutcome;
use catalog_merge::{run, write_records, Record, Source};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn base_headers() -> Vec<String> {
    let mut headers = vec!["Handle".to_string(), "Title".to_string(), "Body (HTML)".to_string()];
    headers.extend(DEFAULT_PROTECTED_COLUMNS.iter().map(|c| c.to_string()));
    headers
}

/// Handles drawn from a small pool so exact hits and repeats are common.
fn arb_handle() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("blue-mug".to_string()),
        Just("red-cup".to_string()),
        Just("oak-board".to_string()),
        Just("linen-apron".to_string()),
        r"[a-z]{3,8}(-[a-z]{2,5})?",
    ]
}

fn arb_title() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => Just("Blue Mug".to_string()),
        2 => Just("Red Cup".to_string()),
        1 => Just("Oak Serving Board".to_string()),
        2 => r"[A-Za-z ]{0,20}",
        1 => Just(String::new()),
    ]
}

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z0-9 ,./:]{1,20}",
        1 => Just(String::new()),
    ]
}

fn arb_row() -> impl Strategy<Value = Record> {
    (
        arb_handle(),
        arb_title(),
        arb_value(),
        proptest::collection::vec(arb_value(), DEFAULT_PROTECTED_COLUMNS.len()),
    )
        .prop_map(|(handle, title, body, images)| {
            let mut record = Record::default();
            record.set("Handle", handle);
            record.set("Title", title);
            record.set("Body (HTML)", body);
            for (column, value) in DEFAULT_PROTECTED_COLUMNS.iter().zip(images) {
                record.set(column, value);
            }
            record
        })
}

fn arb_source(name: &'static str, max_rows: usize) -> impl Strategy<Value = Source> {
    proptest::collection::vec(arb_row(), 0..max_rows).prop_map(move |records| Source {
        name: name.to_string(),
        // Both sides share columns, so the update side offers image values too.
        headers: base_headers(),
        records,
    })
}

/// Base rows in output order: grouped by handle, groups in first-appearance order.
fn grouped_order(records: &[Record]) -> Vec<Record> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Record>> = HashMap::new();
    for r in records {
        let handle = r.value("Handle").to_string();
        if !groups.contains_key(&handle) {
            order.push(handle.clone());
        }
        groups.entry(handle).or_default().push(r.clone());
    }
    order
        .into_iter()
        .flat_map(|h| groups.remove(&h).unwrap_or_default())
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn row_count_preserved(base in arb_source("fresh", 12), update in arb_source("optimized", 12)) {
        let result = run(&MergeConfig::default(), &base, &update).unwrap();
        prop_assert_eq!(result.records.len(), base.records.len());
        prop_assert_eq!(result.summary.rows_written, base.records.len());
    }

    #[test]
    fn protected_columns_and_handle_from_base(
        base in arb_source("fresh", 12),
        update in arb_source("optimized", 12),
    ) {
        let result = run(&MergeConfig::default(), &base, &update).unwrap();
        let expected = grouped_order(&base.records);

        for (out, orig) in result.records.iter().zip(&expected) {
            for column in DEFAULT_PROTECTED_COLUMNS {
                prop_assert_eq!(out.value(column), orig.value(column));
            }
            prop_assert_eq!(out.value("Handle"), orig.value("Handle"));
        }
    }

    #[test]
    fn non_empty_base_values_only_replaced_by_non_empty(
        base in arb_source("fresh", 12),
        update in arb_source("optimized", 12),
    ) {
        let result = run(&MergeConfig::default(), &base, &update).unwrap();
        let expected = grouped_order(&base.records);

        for (out, orig) in result.records.iter().zip(&expected) {
            for column in ["Title", "Body (HTML)"] {
                if !orig.value(column).is_empty() {
                    prop_assert!(!out.value(column).is_empty());
                }
            }
        }
    }

    #[test]
    fn exact_handle_always_wins(
        base in arb_source("fresh", 12),
        update in arb_source("optimized", 12),
    ) {
        let result = run(&MergeConfig::default(), &base, &update).unwrap();
        let update_handles: Vec<&str> = update.records.iter().map(|r| r.value("Handle")).collect();

        for decision in &result.matches {
            if update_handles.contains(&decision.base_id.as_str()) {
                prop_assert_eq!(
                    &decision.outcome,
                    &MatchOutcome::Exact { update_id: decision.base_id.clone() }
                );
            }
        }
    }

    #[test]
    fn rerun_is_byte_identical(
        base in arb_source("fresh", 12),
        update in arb_source("optimized", 12),
    ) {
        let config = MergeConfig::default();
        let first = run(&config, &base, &update).unwrap();
        let second = run(&config, &base, &update).unwrap();
        let a = write_records("merged", &first.headers, &first.records).unwrap();
        let b = write_records("merged", &second.headers, &second.records).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn accepted_fuzzy_scores_meet_threshold(
        base in arb_source("fresh", 12),
        update in arb_source("optimized", 12),
    ) {
        let config = MergeConfig::default();
        let result = run(&config, &base, &update).unwrap();
        for decision in &result.matches {
            match &decision.outcome {
                MatchOutcome::Fuzzy { score, .. } => {
                    prop_assert!(*score >= config.matching.threshold)
                }
                MatchOutcome::Unmatched { best_score, .. } => {
                    prop_assert!(*best_score < config.matching.threshold)
                }
                MatchOutcome::Exact { .. } => {}
            }
        }
    }
}
