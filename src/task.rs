//! Task data structures and related functionality.
//!
//! This module defines the core `Task` struct together with its nested
//! entities (subtasks, comments, attachments), the new-task draft form,
//! the single-slot undo record and the id generator.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Importance of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Repetition schedule for a recurring task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

/// A to-do item with metadata and nested entities.
///
/// Field names serialize in camelCase so documents exported by older
/// versions of the app import cleanly. The nested collections default to
/// empty when absent from a loaded document, and the `editing` /
/// `show_details` flags are per-session only and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub recurring: Option<Recurrence>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip)]
    pub editing: bool,
    #[serde(skip)]
    pub show_details: bool,
}

/// A checklist item owned by a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A note attached to a task, stamped with a display timestamp at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub text: String,
    pub timestamp: String,
}

/// A file attached to a task, payload held as base64 text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: u64,
    pub name: String,
    pub data: String,
}

/// The in-progress, not-yet-committed new-task form.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub recurring: Option<Recurrence>,
    pub notes: String,
}

/// Single-slot undo buffer: the most recently deleted task and where it sat.
///
/// Overwritten on each delete, cleared on undo or when a bulk clear makes
/// the captured index meaningless. Never persisted.
#[derive(Debug, Clone)]
pub struct DeletedRecord {
    pub task: Task,
    pub index: usize,
}

/// Monotonic id generator shared by tasks and all nested entities.
///
/// Seeded from the largest id found in the loaded list, so ids stay unique
/// across restarts. Replaces the clock-tick ids of earlier versions, which
/// could collide when two entities were created within the same tick.
#[derive(Debug, Clone)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    /// Seed the generator from an existing task list.
    pub fn seeded_from(tasks: &[Task]) -> Self {
        let max = tasks
            .iter()
            .flat_map(|t| {
                std::iter::once(t.id)
                    .chain(t.subtasks.iter().map(|s| s.id))
                    .chain(t.comments.iter().map(|c| c.id))
                    .chain(t.attachments.iter().map(|a| a.id))
            })
            .max()
            .unwrap_or(0);
        IdGen { next: max + 1 }
    }

    /// Hand out the next unique id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_ids(id: u64, sub: u64, comment: u64) -> Task {
        Task {
            id,
            description: "t".into(),
            priority: Priority::Medium,
            due_date: None,
            recurring: None,
            notes: String::new(),
            completed: false,
            subtasks: vec![Subtask {
                id: sub,
                description: "s".into(),
                completed: false,
            }],
            comments: vec![Comment {
                id: comment,
                text: "c".into(),
                timestamp: "2026-01-01 10:00:00".into(),
            }],
            attachments: Vec::new(),
            editing: false,
            show_details: false,
        }
    }

    #[test]
    fn test_id_gen_seeds_past_nested_ids() {
        let tasks = vec![task_with_ids(3, 9, 5)];
        let mut ids = IdGen::seeded_from(&tasks);
        assert_eq!(ids.next_id(), 10);
        assert_eq!(ids.next_id(), 11);
    }

    #[test]
    fn test_id_gen_on_empty_list_starts_at_one() {
        let mut ids = IdGen::seeded_from(&[]);
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn test_missing_nested_collections_default_to_empty() {
        let json = r#"{"id":1,"description":"Buy milk","completed":false}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.subtasks.is_empty());
        assert!(task.comments.is_empty());
        assert!(task.attachments.is_empty());
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.notes, "");
    }

    #[test]
    fn test_transient_flags_never_serialize() {
        let mut task = task_with_ids(1, 2, 3);
        task.editing = true;
        task.show_details = true;
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("editing"));
        assert!(!json.contains("showDetails"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert!(!back.editing);
        assert!(!back.show_details);
    }

    #[test]
    fn test_camel_case_field_names() {
        let json = r#"{"id":1,"description":"x","dueDate":"2026-09-01","recurring":"weekly"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date.as_deref(), Some("2026-09-01"));
        assert_eq!(task.recurring, Some(Recurrence::Weekly));
    }
}
