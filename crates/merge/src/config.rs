use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::MergeError;
use crate::similarity::SimilarityMetric;

/// Columns holding image data. Always taken from the base source.
pub const DEFAULT_PROTECTED_COLUMNS: [&str; 4] =
    ["Image Src", "Image Position", "Image Alt Text", "Variant Image"];

/// Minimum title similarity for a fuzzy match to be accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Handle";
pub const DEFAULT_TITLE_COLUMN: &str = "Title";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_base")]
    pub base: SourceConfig,
    #[serde(default = "default_update")]
    pub update: SourceConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            base: default_base(),
            update: default_update(),
            columns: ColumnConfig::default(),
            matching: MatchingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_name() -> String {
    "catalog-merge".into()
}

fn default_base() -> SourceConfig {
    SourceConfig {
        file: "products_export_fresh_import.csv".into(),
    }
}

fn default_update() -> SourceConfig {
    SourceConfig {
        file: "products_export_optimized.csv".into(),
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub file: String,
}

// ---------------------------------------------------------------------------
// Column policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default = "default_identifier")]
    pub identifier: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_protected")]
    pub protected: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            title: default_title(),
            protected: default_protected(),
        }
    }
}

fn default_identifier() -> String {
    DEFAULT_IDENTIFIER_COLUMN.into()
}

fn default_title() -> String {
    DEFAULT_TITLE_COLUMN.into()
}

fn default_protected() -> Vec<String> {
    DEFAULT_PROTECTED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Resolved column roles used by grouping and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPolicy {
    pub identifier: String,
    pub title: String,
    pub protected: BTreeSet<String>,
}

impl ColumnPolicy {
    pub fn is_protected(&self, column: &str) -> bool {
        self.protected.contains(column)
    }
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        ColumnConfig::default().policy()
    }
}

impl ColumnConfig {
    pub fn policy(&self) -> ColumnPolicy {
        ColumnPolicy {
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            protected: self.protected.iter().cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub metric: SimilarityMetric,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            metric: SimilarityMetric::default(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: String,
    #[serde(default)]
    pub report: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: default_output_file(),
            report: None,
        }
    }
}

fn default_output_file() -> String {
    "products_merged.csv".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        let threshold = self.matching.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(MergeError::ConfigValidation(format!(
                "matching.threshold must be in (0, 1], got {threshold}"
            )));
        }

        let cols = &self.columns;
        if cols.identifier.trim().is_empty() {
            return Err(MergeError::ConfigValidation(
                "columns.identifier must not be empty".into(),
            ));
        }
        if cols.title.trim().is_empty() {
            return Err(MergeError::ConfigValidation(
                "columns.title must not be empty".into(),
            ));
        }

        // The identifier is rewritten after merging and the title drives
        // matching; neither can be pinned to the base source.
        for role in [&cols.identifier, &cols.title] {
            if cols.protected.iter().any(|p| p == role) {
                return Err(MergeError::ConfigValidation(format!(
                    "column '{role}' cannot be protected"
                )));
            }
        }

        for (field, path) in [
            ("base.file", &self.base.file),
            ("update.file", &self.update.file),
            ("output.file", &self.output.file),
        ] {
            if path.trim().is_empty() {
                return Err(MergeError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
