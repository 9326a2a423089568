use crate::config::MatchingConfig;
use crate::model::{GroupedSource, MatchDecision, MatchOutcome, MatchOutput, UnmatchedReason};

/// Match every base entity to at most one update entity.
///
/// Exact identifier hits win outright. Otherwise the base entity's first-row
/// title is scored against every update entity's first-row title with the
/// configured metric, and the strictly best candidate is accepted when it
/// reaches the threshold.
pub fn match_entities(
    base: &GroupedSource,
    update: &GroupedSource,
    title_column: &str,
    matching: &MatchingConfig,
) -> MatchOutput {
    let metric = matching.metric;
    match_entities_with(base, update, title_column, matching.threshold, |a, b| {
        metric.score(a, b)
    })
}

/// [`match_entities`] with an arbitrary scoring function.
pub fn match_entities_with<F>(
    base: &GroupedSource,
    update: &GroupedSource,
    title_column: &str,
    threshold: f64,
    score: F,
) -> MatchOutput
where
    F: Fn(&str, &str) -> f64,
{
    // Update order decides ties, so keep it explicit.
    let candidates: Vec<(&str, &str)> = update
        .groups
        .iter()
        .map(|g| (g.identifier.as_str(), g.title(title_column)))
        .filter(|(_, title)| !title.is_empty())
        .collect();

    let mut out = MatchOutput::default();

    for group in &base.groups {
        let base_id = group.identifier.as_str();
        let base_title = group.title(title_column);

        let outcome = if update.contains(base_id) {
            MatchOutcome::Exact {
                update_id: base_id.to_string(),
            }
        } else if base_title.is_empty() {
            MatchOutcome::Unmatched {
                reason: UnmatchedReason::EmptyTitle,
                best_candidate: None,
                best_score: 0.0,
            }
        } else {
            best_title_match(base_title, &candidates, threshold, &score)
        };

        match &outcome {
            MatchOutcome::Exact { .. } => {
                log::debug!("exact: '{base_id}'");
            }
            MatchOutcome::Fuzzy { update_id, update_title, score: s } => {
                log::debug!(
                    "matched: '{base_id}' -> '{update_id}' (score: {s:.2}) base title: {base_title:?}, update title: {update_title:?}"
                );
            }
            MatchOutcome::Unmatched { reason, best_score, .. } => {
                log::debug!("no match for '{base_id}' ({reason}, best score: {best_score:.2})");
            }
        }

        match outcome.update_id() {
            Some(update_id) => {
                out.mapping.insert(base_id.to_string(), update_id.to_string());
            }
            None => out.unmatched.push(base_id.to_string()),
        }

        out.trace.push(MatchDecision {
            base_id: base_id.to_string(),
            base_title: base_title.to_string(),
            outcome,
        });
    }

    log::info!(
        "matched {} of {} entities ({} exact, {} fuzzy), {} unmatched",
        out.mapping.len(),
        base.len(),
        out.exact_count(),
        out.fuzzy_count(),
        out.unmatched.len()
    );

    out
}

fn best_title_match<F>(
    base_title: &str,
    candidates: &[(&str, &str)],
    threshold: f64,
    score: &F,
) -> MatchOutcome
where
    F: Fn(&str, &str) -> f64,
{
    let mut best: Option<(&str, &str)> = None;
    let mut best_score = 0.0;

    for &(update_id, update_title) in candidates {
        let s = score(base_title, update_title);
        // Strict comparison: the first candidate seen keeps a tie.
        if s > best_score {
            best_score = s;
            best = Some((update_id, update_title));
        }
    }

    match best {
        Some((update_id, update_title)) if best_score >= threshold => MatchOutcome::Fuzzy {
            update_id: update_id.to_string(),
            update_title: update_title.to_string(),
            score: best_score,
        },
        Some((update_id, _)) => MatchOutcome::Unmatched {
            reason: UnmatchedReason::BelowThreshold,
            best_candidate: Some(update_id.to_string()),
            best_score,
        },
        None => MatchOutcome::Unmatched {
            reason: UnmatchedReason::NoCandidates,
            best_candidate: None,
            best_score,
        },
    }
}
