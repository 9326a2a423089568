use std::collections::HashMap;

use crate::error::MergeError;
use crate::model::{EntityGroup, GroupedSource, Source};

/// Partition a source's rows by identifier, keeping first-appearance order of
/// groups and source order of rows within a group. Also builds the
/// trimmed-title -> identifier index (first occurrence wins, empty titles skipped).
pub fn group_records(
    source: &Source,
    identifier_column: &str,
    title_column: &str,
) -> Result<GroupedSource, MergeError> {
    for column in [identifier_column, title_column] {
        if !source.has_column(column) {
            return Err(MergeError::missing_column(&source.name, column));
        }
    }

    let mut groups: Vec<EntityGroup> = Vec::new();
    let mut by_identifier: HashMap<String, usize> = HashMap::new();
    let mut title_index: HashMap<String, String> = HashMap::new();

    for record in &source.records {
        let identifier = record.value(identifier_column);

        let slot = match by_identifier.get(identifier) {
            Some(&i) => i,
            None => {
                groups.push(EntityGroup {
                    identifier: identifier.to_string(),
                    rows: Vec::new(),
                });
                by_identifier.insert(identifier.to_string(), groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].rows.push(record.clone());

        let title = record.value(title_column).trim();
        if !title.is_empty() && !title_index.contains_key(title) {
            title_index.insert(title.to_string(), identifier.to_string());
        }
    }

    log::info!(
        "{}: {} rows in {} entities",
        source.name,
        source.records.len(),
        groups.len()
    );

    Ok(GroupedSource {
        name: source.name.clone(),
        groups,
        row_count: source.records.len(),
        title_index,
        by_identifier,
    })
}
