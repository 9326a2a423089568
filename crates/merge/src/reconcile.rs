use crate::config::ColumnPolicy;
use crate::error::MergeError;
use crate::model::{GroupedSource, MatchOutput, ReconcileOutput, ReconcileStats, Record};

/// Merge matched update rows into base rows, group by group.
///
/// Rows pair up by position within their entity group. Only non-empty update
/// values in unprotected base columns are taken; the identifier column always
/// ends up holding the base identifier. Output order follows the base groups.
pub fn reconcile(
    base: &GroupedSource,
    update: &GroupedSource,
    matches: &MatchOutput,
    headers: &[String],
    policy: &ColumnPolicy,
) -> Result<ReconcileOutput, MergeError> {
    for column in &policy.protected {
        if !headers.iter().any(|h| h == column) {
            return Err(MergeError::missing_column(&base.name, column));
        }
    }

    let mergeable: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|h| !policy.is_protected(h))
        .collect();

    let mut stats = ReconcileStats::default();
    let mut records = Vec::with_capacity(base.row_count);

    for group in &base.groups {
        let update_rows: &[Record] = match matches.update_for(&group.identifier) {
            Some(update_id) => update.get(update_id).map(|g| g.rows.as_slice()).unwrap_or(&[]),
            None => {
                stats.rows_base_only += group.rows.len();
                records.extend(group.rows.iter().cloned());
                continue;
            }
        };

        for (i, base_row) in group.rows.iter().enumerate() {
            let mut merged = base_row.clone();

            match update_rows.get(i) {
                Some(update_row) => {
                    stats.rows_merged += 1;
                    stats.fields_overwritten += overwrite(&mut merged, update_row, &mergeable);
                }
                None => stats.rows_without_counterpart += 1,
            }

            merged.set(&policy.identifier, group.identifier.as_str());
            records.push(merged);
        }
    }

    log::info!(
        "reconciled {} rows: {} merged, {} past end of update group, {} base only",
        records.len(),
        stats.rows_merged,
        stats.rows_without_counterpart,
        stats.rows_base_only
    );

    Ok(ReconcileOutput { records, stats })
}

/// Copy non-empty `columns` from `src` into `dst`. Returns the number copied.
fn overwrite(dst: &mut Record, src: &Record, columns: &[&str]) -> usize {
    let mut copied = 0;
    for &column in columns {
        if let Some(value) = src.get(column).filter(|v| !v.is_empty()) {
            dst.set(column, value);
            copied += 1;
        }
    }
    copied
}
