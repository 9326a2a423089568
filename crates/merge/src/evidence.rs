use crate::model::{GroupedSource, MatchOutput, MergeSummary, ReconcileOutput};

/// Compute summary statistics for a finished merge.
pub fn compute_summary(
    base: &GroupedSource,
    update: &GroupedSource,
    matches: &MatchOutput,
    reconciled: &ReconcileOutput,
) -> MergeSummary {
    let matched_exact = matches.exact_count();
    let matched_fuzzy = matches.fuzzy_count();

    MergeSummary {
        base_rows: base.row_count,
        update_rows: update.row_count,
        base_entities: base.len(),
        update_entities: update.len(),
        update_titles: update.title_index.len(),
        matched: matched_exact + matched_fuzzy,
        matched_exact,
        matched_fuzzy,
        unmatched: matches.unmatched.len(),
        reconcile: reconciled.stats.clone(),
        rows_written: reconciled.records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnPolicy, MatchingConfig};
    use crate::group::group_records;
    use crate::matcher::match_entities;
    use crate::reconcile::reconcile;
    use crate::source::load_source;

    #[test]
    fn summary_counts() {
        let fresh = "\
Handle,Title,Image Src,Image Position,Image Alt Text,Variant Image
mug,Blue Mug,m1,1,,
mug,,m2,2,,
cup,Red Cup,c1,1,,
plate,Dinner Plate,p1,1,,
";
        let optimized = "\
Handle,Title
mug,Blue Mug
cup-2024,Red Cup
cup-2024,
";
        let base_src = load_source("fresh", fresh).unwrap();
        let upd_src = load_source("optimized", optimized).unwrap();
        let base = group_records(&base_src, "Handle", "Title").unwrap();
        let update = group_records(&upd_src, "Handle", "Title").unwrap();
        let matches = match_entities(&base, &update, "Title", &MatchingConfig::default());
        let out =
            reconcile(&base, &update, &matches, &base_src.headers, &ColumnPolicy::default()).unwrap();

        let summary = compute_summary(&base, &update, &matches, &out);
        assert_eq!(summary.base_rows, 4);
        assert_eq!(summary.update_rows, 3);
        assert_eq!(summary.base_entities, 3);
        assert_eq!(summary.update_entities, 2);
        assert_eq!(summary.update_titles, 2);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.matched_exact, 1);
        assert_eq!(summary.matched_fuzzy, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.reconcile.rows_merged, 2);
        assert_eq!(summary.reconcile.rows_without_counterpart, 1);
        assert_eq!(summary.reconcile.rows_base_only, 1);
        assert_eq!(summary.rows_written, 4);
    }
}
