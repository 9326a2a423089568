use crate::config::MergeConfig;
use crate::error::MergeError;
use crate::evidence::compute_summary;
use crate::group::group_records;
use crate::matcher::match_entities;
use crate::model::{MergeMeta, MergeResult, Source};
use crate::reconcile::reconcile;

/// Run the merge per config over two loaded sources.
///
/// `base` supplies protected columns and the output column order; `update`
/// supplies everything else for entities that can be matched.
pub fn run(config: &MergeConfig, base: &Source, update: &Source) -> Result<MergeResult, MergeError> {
    let policy = config.columns.policy();

    let base_groups = group_records(base, &policy.identifier, &policy.title)?;
    let update_groups = group_records(update, &policy.identifier, &policy.title)?;

    let matches = match_entities(&base_groups, &update_groups, &policy.title, &config.matching);

    let reconciled = reconcile(&base_groups, &update_groups, &matches, &base.headers, &policy)?;

    let summary = compute_summary(&base_groups, &update_groups, &matches, &reconciled);

    Ok(MergeResult {
        meta: MergeMeta {
            config_name: config.name.clone(),
            base_source: base.name.clone(),
            update_source: update.name.clone(),
            metric: config.matching.metric.to_string(),
            threshold: config.matching.threshold,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        matches: matches.trace,
        headers: base.headers.clone(),
        records: reconciled.records,
    })
}
