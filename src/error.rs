//! Error types shared across the storage, repository and import layers.
//!
//! Validation failures are silent no-ops to the caller, storage read failures
//! degrade to empty/default state, and import failures carry the user-visible
//! message verbatim.

use thiserror::Error;

/// A task or subtask description trimmed down to nothing.
///
/// The triggering operation is a no-op; any in-progress draft is left intact
/// so the user can fix it up.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Description cannot be empty")]
pub struct EmptyDescription;

/// Failure talking to the key-value medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure importing a task document supplied by the user.
///
/// Both variants are surfaced as blocking messages; the task list is left
/// untouched in either case.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document parsed, but the top-level value is not an array.
    #[error("Invalid file format")]
    Format,
    /// The document did not parse at all.
    #[error("Error reading file")]
    Parse(#[source] serde_json::Error),
}
