//! Import and export of the task list as a portable JSON document.
//!
//! The export is a pretty-printed top-level array including all nested
//! entities. Import replaces the list wholesale; there is no merging.

use serde_json::Value;

use crate::error::ImportError;
use crate::task::Task;

/// Fixed name of the export artifact.
pub const EXPORT_FILE_NAME: &str = "tasks.json";

/// Serialize the full task list to a pretty-printed JSON document.
pub fn export_json(tasks: &[Task]) -> String {
    serde_json::to_string_pretty(tasks).expect("task list serialization cannot fail")
}

/// Parse a task document, validating only the top-level shape.
///
/// The top-level value must be an array; anything else is `Format`, and
/// input that does not parse at all is `Parse`. Tasks inside the array are
/// trusted as-is beyond what deserialization requires, matching the
/// behaviour of documents produced by `export_json`.
pub fn import_json(document: &str) -> Result<Vec<Task>, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::Parse)?;
    if !value.is_array() {
        return Err(ImportError::Format);
    }
    serde_json::from_value(value).map_err(ImportError::Parse)
}
