//! `catalog-merge`: entity matching and field reconciliation for diverged
//! product catalog exports.
//!
//! Pure engine crate: receives CSV text or pre-loaded sources, returns merged
//! records plus a match trace. No filesystem or CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod group;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod similarity;
pub mod source;

pub use config::{ColumnPolicy, MergeConfig};
pub use engine::run;
pub use error::MergeError;
pub use model::{MatchDecision, MatchOutcome, MergeResult, MergeSummary, Record, Source};
pub use similarity::SimilarityMetric;
pub use source::{load_source, write_records};
