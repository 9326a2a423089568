use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of a catalog export: column name -> value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of `column`, or `""` when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.fields.insert(column.to_string(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A fully loaded tabular source.
#[derive(Debug, Clone)]
pub struct Source {
    /// Name used in diagnostics and error messages.
    pub name: String,
    /// Column names in header order.
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Source {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Rows sharing one identifier, in source order.
#[derive(Debug, Clone)]
pub struct EntityGroup {
    pub identifier: String,
    pub rows: Vec<Record>,
}

impl EntityGroup {
    /// Trimmed value of `title_column` on the first row.
    pub fn title<'a>(&'a self, title_column: &str) -> &'a str {
        self.rows
            .first()
            .map(|r| r.value(title_column).trim())
            .unwrap_or("")
    }
}

/// A source partitioned into entity groups, in first-appearance order.
#[derive(Debug, Clone)]
pub struct GroupedSource {
    pub name: String,
    pub groups: Vec<EntityGroup>,
    pub row_count: usize,
    /// Trimmed title -> identifier. First occurrence wins.
    pub title_index: HashMap<String, String>,
    pub(crate) by_identifier: HashMap<String, usize>,
}

impl GroupedSource {
    pub fn get(&self, identifier: &str) -> Option<&EntityGroup> {
        self.by_identifier.get(identifier).map(|&i| &self.groups[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Base title is empty; no fuzzy attempt was made.
    EmptyTitle,
    /// No update title scored above zero.
    NoCandidates,
    /// Best candidate scored under the threshold.
    BelowThreshold,
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "empty_title"),
            Self::NoCandidates => write!(f, "no_candidates"),
            Self::BelowThreshold => write!(f, "below_threshold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Exact {
        update_id: String,
    },
    Fuzzy {
        update_id: String,
        update_title: String,
        score: f64,
    },
    Unmatched {
        reason: UnmatchedReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        best_candidate: Option<String>,
        best_score: f64,
    },
}

impl MatchOutcome {
    pub fn update_id(&self) -> Option<&str> {
        match self {
            Self::Exact { update_id } | Self::Fuzzy { update_id, .. } => Some(update_id),
            Self::Unmatched { .. } => None,
        }
    }

    /// 1.0 for exact matches, the title score otherwise.
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Exact { .. } => 1.0,
            Self::Fuzzy { score, .. } => *score,
            Self::Unmatched { best_score, .. } => *best_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDecision {
    pub base_id: String,
    pub base_title: String,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutput {
    /// Base identifier -> accepted update identifier.
    pub mapping: HashMap<String, String>,
    /// Base identifiers without a match, in base order.
    pub unmatched: Vec<String>,
    /// One decision per base identifier, in base order.
    pub trace: Vec<MatchDecision>,
}

impl MatchOutput {
    pub fn update_for(&self, base_id: &str) -> Option<&str> {
        self.mapping.get(base_id).map(String::as_str)
    }

    pub fn exact_count(&self) -> usize {
        self.trace
            .iter()
            .filter(|d| matches!(d.outcome, MatchOutcome::Exact { .. }))
            .count()
    }

    pub fn fuzzy_count(&self) -> usize {
        self.trace
            .iter()
            .filter(|d| matches!(d.outcome, MatchOutcome::Fuzzy { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Rows that had a positional counterpart in the matched update group.
    pub rows_merged: usize,
    /// Rows of matched groups past the end of the update group.
    pub rows_without_counterpart: usize,
    /// Rows of unmatched groups, copied unchanged.
    pub rows_base_only: usize,
    /// Field values taken from the update source.
    pub fields_overwritten: usize,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutput {
    pub records: Vec<Record>,
    pub stats: ReconcileStats,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub base_rows: usize,
    pub update_rows: usize,
    pub base_entities: usize,
    pub update_entities: usize,
    pub update_titles: usize,
    pub matched: usize,
    pub matched_exact: usize,
    pub matched_fuzzy: usize,
    pub unmatched: usize,
    #[serde(flatten)]
    pub reconcile: ReconcileStats,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub config_name: String,
    pub base_source: String,
    pub update_source: String,
    pub metric: String,
    pub threshold: f64,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    pub matches: Vec<MatchDecision>,
    /// Output column order (the base header).
    #[serde(skip)]
    pub headers: Vec<String>,
    #[serde(skip)]
    pub records: Vec<Record>,
}
