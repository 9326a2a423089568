//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `catmerge` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (unmatched products are not a failure)       |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args; reported by clap)         |
//! | 3    | Config file unreadable, unparseable or invalid       |
//! | 4    | Required column missing from a source header         |
//! | 5    | Input source unreadable or malformed                 |
//! | 6    | Output or report could not be written                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `merge_exit_code` or the relevant command

use catalog_merge::MergeError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or missing subcommand.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge (3-9)
// =============================================================================

/// Config file cannot be read, parsed or validated.
pub const EXIT_MERGE_INVALID_CONFIG: u8 = 3;

/// A source lacks the identifier, title or a protected column.
pub const EXIT_MERGE_MISSING_COLUMN: u8 = 4;

/// An input CSV cannot be read or parsed.
pub const EXIT_MERGE_SOURCE_READ: u8 = 5;

/// The merged CSV or the JSON report cannot be written.
pub const EXIT_MERGE_SINK_WRITE: u8 = 6;

/// Map an engine error to its exit code.
pub fn merge_exit_code(err: &MergeError) -> u8 {
    match err {
        MergeError::ConfigParse(_) | MergeError::ConfigValidation(_) => EXIT_MERGE_INVALID_CONFIG,
        MergeError::MissingColumn { .. } => EXIT_MERGE_MISSING_COLUMN,
        MergeError::SourceRead { .. } => EXIT_MERGE_SOURCE_READ,
        MergeError::SinkWrite { .. } => EXIT_MERGE_SINK_WRITE,
    }
}
