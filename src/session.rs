//! Transient per-session state and the persisted theme flag.
//!
//! Everything here except the theme lives only as long as the session; the
//! undo slot in particular is lost when the process ends. The theme persists
//! under its own key, independently of the tasks.

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::{KeyValueStore, DARK_MODE_KEY};
use crate::task::DeletedRecord;

/// UI-adjacent state: active filter, search text, drag source, theme flag
/// and the single-slot undo buffer.
#[derive(Debug, Default)]
pub struct SessionState {
    pub filter: Filter,
    pub search: String,
    pub dragged_index: Option<usize>,
    pub last_deleted: Option<DeletedRecord>,
    pub dark_mode: bool,
}

impl SessionState {
    /// Fresh session with the theme restored from the store.
    pub fn with_theme(store: &impl KeyValueStore) -> Self {
        SessionState {
            dark_mode: load_theme(store),
            ..SessionState::default()
        }
    }

    /// Remember a deletion, overwriting any earlier record.
    pub fn record_delete(&mut self, record: DeletedRecord) {
        self.last_deleted = Some(record);
    }

    /// Take the pending undo record, leaving the slot empty.
    pub fn take_undo(&mut self) -> Option<DeletedRecord> {
        self.last_deleted.take()
    }

    /// Drop any pending undo record, e.g. after a bulk clear has made its
    /// captured index meaningless.
    pub fn invalidate_undo(&mut self) {
        self.last_deleted = None;
    }
}

/// Dark mode is on iff the stored value is exactly `"true"`.
///
/// Anything else, including a missing key or a read failure, falls back to
/// light mode.
pub fn load_theme(store: &impl KeyValueStore) -> bool {
    matches!(store.get(DARK_MODE_KEY), Ok(Some(v)) if v == "true")
}

/// Flip the theme flag and persist it. Returns the new mode.
pub fn toggle_theme(
    store: &mut impl KeyValueStore,
    state: &mut SessionState,
) -> Result<bool, StoreError> {
    state.dark_mode = !state.dark_mode;
    store.set(DARK_MODE_KEY, if state.dark_mode { "true" } else { "false" })?;
    Ok(state.dark_mode)
}
