//! Nested collections owned by a task: subtasks, comments, attachments.
//!
//! Each collection has the same add/remove lifecycle, scoped to its parent
//! task. Nothing here persists by itself; callers save the owning list after
//! every mutation. Removal indices are guarded by callers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;

use crate::task::{Attachment, Comment, IdGen, Subtask, Task};

/// Format used for the display timestamp stamped on new comments.
const COMMENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append a subtask to `task`. Whitespace-only text is a no-op.
///
/// Returns whether anything was added.
pub fn add_subtask(task: &mut Task, ids: &mut IdGen, text: &str) -> bool {
    let description = text.trim();
    if description.is_empty() {
        return false;
    }
    task.subtasks.push(Subtask {
        id: ids.next_id(),
        description: description.to_string(),
        completed: false,
    });
    true
}

/// Remove the subtask at `index`.
pub fn remove_subtask(task: &mut Task, index: usize) {
    task.subtasks.remove(index);
}

/// Flip the completed flag of the subtask at `index`.
pub fn toggle_subtask(task: &mut Task, index: usize) {
    let subtask = &mut task.subtasks[index];
    subtask.completed = !subtask.completed;
}

/// Append a comment to `task`, stamped with the local time of creation.
///
/// The timestamp is a display string captured once at add time and never
/// recomputed. Whitespace-only text is a no-op.
pub fn add_comment(task: &mut Task, ids: &mut IdGen, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    task.comments.push(Comment {
        id: ids.next_id(),
        text: text.to_string(),
        timestamp: Local::now().format(COMMENT_TIMESTAMP_FORMAT).to_string(),
    });
    true
}

/// Remove the comment at `index`.
pub fn remove_comment(task: &mut Task, index: usize) {
    task.comments.remove(index);
}

/// Append an attachment to `task`, encoding the payload as base64.
///
/// An empty payload is a no-op. Callers apply this only once the payload is
/// fully read, re-fetching the target task at that point rather than holding
/// a snapshot taken when the read was submitted; interleaved reads therefore
/// land in whatever state the task is in when they complete.
pub fn add_attachment(task: &mut Task, ids: &mut IdGen, name: &str, payload: &[u8]) -> bool {
    if payload.is_empty() {
        return false;
    }
    task.attachments.push(Attachment {
        id: ids.next_id(),
        name: name.to_string(),
        data: BASE64.encode(payload),
    });
    true
}

/// Remove the attachment at `index`.
pub fn remove_attachment(task: &mut Task, index: usize) {
    task.attachments.remove(index);
}

/// Decode an attachment payload back to bytes, e.g. for saving to disk.
pub fn decode_attachment(attachment: &Attachment) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(&attachment.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskDraft};

    fn task() -> (Task, IdGen) {
        let mut list = crate::list::TaskList::default();
        let mut ids = IdGen::seeded_from(&list.tasks);
        let mut draft = TaskDraft {
            description: "parent".to_string(),
            priority: Priority::Medium,
            ..TaskDraft::default()
        };
        list.add(&mut draft, &mut ids).unwrap();
        (list.tasks.remove(0), ids)
    }

    #[test]
    fn test_add_subtask_trims_and_appends() {
        let (mut task, mut ids) = task();
        assert!(add_subtask(&mut task, &mut ids, "  step one  "));
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].description, "step one");
        assert!(!task.subtasks[0].completed);
    }

    #[test]
    fn test_add_subtask_empty_is_noop() {
        let (mut task, mut ids) = task();
        assert!(!add_subtask(&mut task, &mut ids, ""));
        assert!(!add_subtask(&mut task, &mut ids, "   "));
        assert_eq!(task.subtasks.len(), 0);
    }

    #[test]
    fn test_remove_and_toggle_subtask() {
        let (mut task, mut ids) = task();
        add_subtask(&mut task, &mut ids, "a");
        add_subtask(&mut task, &mut ids, "b");
        toggle_subtask(&mut task, 1);
        assert!(task.subtasks[1].completed);
        remove_subtask(&mut task, 0);
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].description, "b");
    }

    #[test]
    fn test_add_comment_stamps_timestamp_once() {
        let (mut task, mut ids) = task();
        assert!(add_comment(&mut task, &mut ids, " looks good "));
        assert_eq!(task.comments[0].text, "looks good");
        assert!(!task.comments[0].timestamp.is_empty());
        let stamped = task.comments[0].timestamp.clone();
        // The stamp is data, not a live value.
        assert_eq!(task.comments[0].timestamp, stamped);
    }

    #[test]
    fn test_add_comment_empty_is_noop() {
        let (mut task, mut ids) = task();
        assert!(!add_comment(&mut task, &mut ids, "  "));
        assert!(task.comments.is_empty());
    }

    #[test]
    fn test_attachment_encodes_and_decodes() {
        let (mut task, mut ids) = task();
        let payload = b"\x00\x01binary\xff";
        assert!(add_attachment(&mut task, &mut ids, "blob.bin", payload));
        assert_eq!(task.attachments[0].name, "blob.bin");
        assert_eq!(
            decode_attachment(&task.attachments[0]).unwrap(),
            payload.to_vec()
        );
    }

    #[test]
    fn test_attachment_empty_payload_is_noop() {
        let (mut task, mut ids) = task();
        assert!(!add_attachment(&mut task, &mut ids, "empty.bin", &[]));
        assert!(task.attachments.is_empty());
    }

    #[test]
    fn test_nested_ids_are_unique_across_kinds() {
        let (mut task, mut ids) = task();
        add_subtask(&mut task, &mut ids, "s");
        add_comment(&mut task, &mut ids, "c");
        add_attachment(&mut task, &mut ids, "a", b"x");
        let mut seen = vec![
            task.id,
            task.subtasks[0].id,
            task.comments[0].id,
            task.attachments[0].id,
        ];
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }
}
