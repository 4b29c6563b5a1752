//! Read-only derivation of the visible task subset.
//!
//! Filtering never mutates the list and is re-evaluated on every read.
//! Relative order is always preserved from the underlying list. The drop
//! helpers translate pointer geometry into list positions so reordering
//! works even while a filter or search narrows the view.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Completion filter over the task list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

/// Rendered bounding box of one visible item, in pointer coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ItemBox {
    pub top: f64,
    pub height: f64,
}

fn matches(task: &Task, filter: Filter, query: &str) -> bool {
    let keep = match filter {
        Filter::All => true,
        Filter::Active => !task.completed,
        Filter::Completed => task.completed,
    };
    if !keep {
        return false;
    }
    if query.is_empty() {
        return true;
    }
    task.description.to_lowercase().contains(query) || task.notes.to_lowercase().contains(query)
}

/// Derive the visible subsequence for a filter and search query.
///
/// The search is a trimmed, case-insensitive substring match against the
/// description or the notes of each task.
pub fn filtered<'a>(tasks: &'a [Task], filter: Filter, search: &str) -> Vec<&'a Task> {
    let query = search.trim().to_lowercase();
    tasks.iter().filter(|t| matches(t, filter, &query)).collect()
}

/// Positions in the backing list of the tasks `filtered` would return.
pub fn visible_indices(tasks: &[Task], filter: Filter, search: &str) -> Vec<usize> {
    let query = search.trim().to_lowercase();
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| matches(t, filter, &query))
        .map(|(i, _)| i)
        .collect()
}

/// Resolve a pointer's vertical position to a drop slot in the visible list.
///
/// Returns the index of the first visible item whose vertical midpoint lies
/// below the pointer, or the count of visible items to append at the end.
pub fn drop_index(pointer_y: f64, boxes: &[ItemBox]) -> usize {
    for (i, b) in boxes.iter().enumerate() {
        if pointer_y < b.top + b.height / 2.0 {
            return i;
        }
    }
    boxes.len()
}

/// Map a drop slot in the visible list back to a backing-list index.
///
/// With no filter active this is the identity. Under a filter, dropping on a
/// visible item targets that item's real position; dropping past the last
/// visible item appends at the end of the backing list.
pub fn resolve_drop(visible_slot: usize, visible: &[usize], backing_len: usize) -> usize {
    visible.get(visible_slot).copied().unwrap_or(backing_len)
}
