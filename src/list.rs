//! The task repository: an ordered, owned list of tasks.
//!
//! `TaskList` performs every top-level mutation (add, delete, undo, clear,
//! reorder, edit) and owns serialization to the `tasks` key of the store.
//! List order is significant; insertion position and reordering carry
//! meaning, so nothing here ever sorts.

use crate::error::{EmptyDescription, StoreError};
use crate::store::{KeyValueStore, TASKS_KEY};
use crate::task::{DeletedRecord, IdGen, Task, TaskDraft};

/// The ordered sequence of tasks, exclusively owned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Load the task list from the store.
    ///
    /// A missing key yields an empty list. A blob that no longer parses is
    /// logged and discarded wholesale; there is no partial recovery.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let blob = match store.get(TASKS_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return TaskList::default(),
            Err(e) => {
                eprintln!("Error loading tasks, starting fresh: {e}");
                return TaskList::default();
            }
        };
        match serde_json::from_str(&blob) {
            Ok(tasks) => TaskList { tasks },
            Err(e) => {
                eprintln!("Error parsing tasks, starting fresh: {e}");
                TaskList::default()
            }
        }
    }

    /// Serialize the full list and write it back under the `tasks` key.
    ///
    /// Called after every mutating operation; no batching, no debounce.
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        let blob = serde_json::to_string_pretty(&self.tasks)
            .expect("task list serialization cannot fail");
        store.set(TASKS_KEY, &blob)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether any task is marked completed.
    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|t| t.completed)
    }

    /// Commit the draft as a new task appended to the end of the list.
    ///
    /// A whitespace-only description is rejected and the draft is left
    /// untouched for the user to fix. On success the draft resets to
    /// defaults and the new task's id is returned.
    pub fn add(&mut self, draft: &mut TaskDraft, ids: &mut IdGen) -> Result<u64, EmptyDescription> {
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(EmptyDescription);
        }
        let id = ids.next_id();
        self.tasks.push(Task {
            id,
            description: description.to_string(),
            priority: draft.priority,
            due_date: draft.due_date.clone(),
            recurring: draft.recurring,
            notes: draft.notes.trim().to_string(),
            completed: false,
            subtasks: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            editing: false,
            show_details: false,
        });
        *draft = TaskDraft::default();
        Ok(id)
    }

    /// Remove the task at `index`, returning the undo record.
    ///
    /// The caller stores the record in its session (overwriting any prior
    /// one; at most one undo level). Out-of-range indices are a caller bug.
    pub fn delete(&mut self, index: usize) -> DeletedRecord {
        let task = self.tasks.remove(index);
        DeletedRecord { task, index }
    }

    /// Re-insert a previously deleted task at its captured position.
    ///
    /// If the list has shrunk past the captured index the task is appended
    /// at the end rather than failing.
    pub fn undo(&mut self, record: DeletedRecord) {
        let at = record.index.min(self.tasks.len());
        self.tasks.insert(at, record.task);
    }

    /// Remove all completed tasks in one pass, returning how many went.
    ///
    /// When the count is non-zero the caller must drop any pending
    /// `DeletedRecord`, since its captured index no longer means anything.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    /// Flip the completed flag of the task at `index`.
    pub fn toggle(&mut self, index: usize) {
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
    }

    /// Move the task at `from` to the position given by the drop hint.
    ///
    /// The hint is an insertion slot computed after removal, clamped to the
    /// remaining length. `from == hint` leaves the order unchanged but the
    /// operation still counts as a mutation (and is persisted by callers).
    pub fn reorder(&mut self, from: usize, to_hint: usize) {
        let task = self.tasks.remove(from);
        let at = to_hint.min(self.tasks.len());
        self.tasks.insert(at, task);
    }

    /// Finish an inline edit of the task at `index`.
    ///
    /// The new description is trimmed; an edit may not produce an empty
    /// description, so a whitespace-only value reverts to the previous one.
    /// Leaves edit mode either way.
    pub fn commit_edit(
        &mut self,
        index: usize,
        new_description: &str,
    ) -> Result<(), EmptyDescription> {
        let task = &mut self.tasks[index];
        task.editing = false;
        let trimmed = new_description.trim();
        if trimmed.is_empty() {
            return Err(EmptyDescription);
        }
        task.description = trimmed.to_string();
        Ok(())
    }

    /// Replace the entire list wholesale, e.g. after an import.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn draft(description: &str) -> TaskDraft {
        TaskDraft {
            description: description.to_string(),
            ..TaskDraft::default()
        }
    }

    fn list_of(descriptions: &[&str]) -> (TaskList, IdGen) {
        let mut list = TaskList::default();
        let mut ids = IdGen::seeded_from(&list.tasks);
        for d in descriptions {
            list.add(&mut draft(d), &mut ids).unwrap();
        }
        (list, ids)
    }

    #[test]
    fn test_add_appends_incomplete_task() {
        let (mut list, mut ids) = list_of(&["Buy milk"]);
        let id = list.add(&mut draft("  Walk dog  "), &mut ids).unwrap();
        assert_eq!(list.len(), 2);
        let task = &list.tasks[1];
        assert_eq!(task.id, id);
        assert_eq!(task.description, "Walk dog");
        assert!(!task.completed);
        assert!(!task.editing);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn test_add_whitespace_only_is_rejected_and_draft_kept() {
        let (mut list, mut ids) = list_of(&[]);
        let mut d = draft("   ");
        assert_eq!(list.add(&mut d, &mut ids), Err(EmptyDescription));
        assert!(list.is_empty());
        // Draft is not cleared on rejection.
        assert_eq!(d.description, "   ");
    }

    #[test]
    fn test_add_resets_draft_on_success() {
        let (mut list, mut ids) = list_of(&[]);
        let mut d = draft("Buy milk");
        d.notes = "semi-skimmed".to_string();
        list.add(&mut d, &mut ids).unwrap();
        assert_eq!(d.description, "");
        assert_eq!(d.notes, "");
        assert_eq!(list.tasks[0].notes, "semi-skimmed");
    }

    #[test]
    fn test_delete_then_undo_restores_exact_order() {
        let (mut list, _) = list_of(&["a", "b", "c"]);
        let snapshot = list.clone();
        let record = list.delete(1);
        assert_eq!(list.len(), 2);
        assert_eq!(record.task.description, "b");
        assert_eq!(record.index, 1);
        list.undo(record);
        assert_eq!(list, snapshot);
    }

    #[test]
    fn test_undo_past_end_appends() {
        let (mut list, _) = list_of(&["a", "b", "c"]);
        let record = list.delete(2);
        list.delete(1);
        list.delete(0);
        list.undo(record);
        assert_eq!(list.len(), 1);
        assert_eq!(list.tasks[0].description, "c");
    }

    #[test]
    fn test_clear_completed_removes_in_one_pass() {
        let (mut list, _) = list_of(&["a", "b", "c", "d"]);
        list.toggle(1);
        list.toggle(3);
        assert_eq!(list.clear_completed(), 2);
        let left: Vec<&str> = list.tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(left, ["a", "c"]);
    }

    #[test]
    fn test_clear_completed_with_none_completed_changes_nothing() {
        let (mut list, _) = list_of(&["a", "b"]);
        let snapshot = list.clone();
        assert!(!list.has_completed());
        assert_eq!(list.clear_completed(), 0);
        assert_eq!(list, snapshot);
    }

    #[test]
    fn test_reorder_front_to_back() {
        let (mut list, _) = list_of(&["X", "Y", "Z"]);
        list.reorder(0, 2);
        let order: Vec<&str> = list.tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(order, ["Y", "Z", "X"]);
    }

    #[test]
    fn test_reorder_to_same_slot_is_identity() {
        let (mut list, _) = list_of(&["X", "Y", "Z"]);
        let snapshot = list.clone();
        list.reorder(1, 1);
        assert_eq!(list, snapshot);
    }

    #[test]
    fn test_commit_edit_trims() {
        let (mut list, _) = list_of(&["a"]);
        list.tasks[0].editing = true;
        list.commit_edit(0, "  renamed  ").unwrap();
        assert_eq!(list.tasks[0].description, "renamed");
        assert!(!list.tasks[0].editing);
    }

    #[test]
    fn test_commit_edit_empty_reverts_description() {
        let (mut list, _) = list_of(&["keep me"]);
        list.tasks[0].editing = true;
        assert_eq!(list.commit_edit(0, "   "), Err(EmptyDescription));
        assert_eq!(list.tasks[0].description, "keep me");
        assert!(!list.tasks[0].editing);
    }

    #[test]
    fn test_load_missing_key_yields_empty_list() {
        let store = MemoryStore::new();
        assert!(TaskList::load(&store).is_empty());
    }

    #[test]
    fn test_load_corrupt_blob_resets_to_empty() {
        let mut store = MemoryStore::new();
        store.set(TASKS_KEY, "{not json").unwrap();
        assert!(TaskList::load(&store).is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let (mut list, _) = list_of(&["a", "b"]);
        list.toggle(0);
        list.save(&mut store).unwrap();
        let loaded = TaskList::load(&store);
        assert_eq!(loaded, list);
    }
}
