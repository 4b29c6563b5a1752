//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers that implement the various
//! subcommands, from basic CRUD operations over the task list to nested
//! entities, import/export and the interactive shell session.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::EmptyDescription;
use crate::exchange::{export_json, import_json, EXPORT_FILE_NAME};
use crate::filter::{resolve_drop, visible_indices, Filter};
use crate::list::TaskList;
use crate::nested::{
    add_attachment, add_comment, add_subtask, remove_attachment, remove_comment, remove_subtask,
    toggle_subtask,
};
use crate::session::{toggle_theme, SessionState};
use crate::store::KeyValueStore;
use crate::task::{IdGen, Priority, Recurrence, Task, TaskDraft};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task to the end of the list.
    Add {
        /// What needs doing.
        description: String,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date, e.g. 2026-09-01.
        #[arg(long)]
        due: Option<String>,
        /// Recurrence: daily | weekly | monthly.
        #[arg(long, value_enum)]
        recurring: Option<Recurrence>,
        /// Free-form notes.
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List tasks, optionally filtered and searched.
    List {
        /// Completion filter: all | active | completed.
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
        /// Case-insensitive substring match on description or notes.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show full details of one task.
    View {
        /// List position of the task.
        index: usize,
    },

    /// Flip a task between active and completed.
    Toggle { index: usize },

    /// Replace a task's description.
    Edit { index: usize, description: String },

    /// Delete the task at a position (undoable until the next delete).
    Delete { index: usize },

    /// Restore the most recently deleted task (shell session only).
    Undo,

    /// Remove all completed tasks in one pass.
    ClearCompleted,

    /// Move a task to a new position.
    Move { from: usize, to: usize },

    /// Manage a task's subtasks.
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },

    /// Manage a task's comments.
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Manage a task's file attachments.
    Attach {
        #[command(subcommand)]
        action: AttachAction,
    },

    /// Write the full task list to a portable JSON file.
    Export {
        /// Output path (default: tasks.json).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the task list with the contents of a JSON file.
    Import {
        /// Input JSON file; the top-level value must be an array.
        input: PathBuf,
    },

    /// Toggle between light and dark mode.
    Theme,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Interactive session keeping filter, search and undo state alive.
    Shell,
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Add a subtask to the task at `index`.
    Add { index: usize, text: String },
    /// Remove one subtask.
    Remove { index: usize, subtask: usize },
    /// Flip a subtask between done and pending.
    Toggle { index: usize, subtask: usize },
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to the task at `index`, stamped with the current time.
    Add { index: usize, text: String },
    /// Remove one comment.
    Remove { index: usize, comment: usize },
}

#[derive(Subcommand)]
pub enum AttachAction {
    /// Attach a file's contents to the task at `index`.
    Add { index: usize, file: PathBuf },
    /// Remove one attachment.
    Remove { index: usize, attachment: usize },
}

/// Everything a command needs: the list, the id source, the session and the
/// store they persist through. Passed explicitly to every handler.
pub struct App<S: KeyValueStore> {
    pub list: TaskList,
    pub ids: IdGen,
    pub session: SessionState,
    pub store: S,
}

impl<S: KeyValueStore> App<S> {
    /// Load the task list and theme from the store and start a session.
    pub fn open(store: S) -> Self {
        let list = TaskList::load(&store);
        let ids = IdGen::seeded_from(&list.tasks);
        let session = SessionState::with_theme(&store);
        App {
            list,
            ids,
            session,
            store,
        }
    }

    fn persist(&mut self) -> Result<(), String> {
        self.list
            .save(&mut self.store)
            .map_err(|e| format!("Failed to save tasks: {e}"))
    }

    fn check_index(&self, index: usize) -> Result<(), String> {
        if index >= self.list.len() {
            return Err(format!("No task at index {index}."));
        }
        Ok(())
    }
}

/// Add a new task from the command-line draft.
pub fn cmd_add<S: KeyValueStore>(
    app: &mut App<S>,
    description: String,
    priority: Priority,
    due: Option<String>,
    recurring: Option<Recurrence>,
    notes: String,
) -> Result<(), String> {
    let mut draft = TaskDraft {
        description,
        priority,
        due_date: due,
        recurring,
        notes,
    };
    match app.list.add(&mut draft, &mut app.ids) {
        Ok(id) => {
            app.persist()?;
            println!("Added task {} at position {}", id, app.list.len() - 1);
            Ok(())
        }
        // Empty submissions are rejected outright; the draft stays put.
        Err(EmptyDescription) => Ok(()),
    }
}

/// Print the visible subset of the list as a table.
pub fn cmd_list(list: &TaskList, filter: Filter, search: &str) {
    let visible = visible_indices(&list.tasks, filter, search);
    if visible.is_empty() {
        println!("No tasks.");
        return;
    }
    println!(
        "{:<5} {:<4} {:<8} {:<12} {}",
        "Pos", "Done", "Pri", "Due", "Description"
    );
    for &i in &visible {
        let t = &list.tasks[i];
        let extras = format_extras(t);
        println!(
            "{:<5} {:<4} {:<8} {:<12} {}{}",
            i,
            if t.completed { "[x]" } else { "[ ]" },
            format_priority(t.priority),
            t.due_date.as_deref().unwrap_or("-"),
            t.description,
            extras,
        );
    }
}

fn format_extras(t: &Task) -> String {
    let mut parts = Vec::new();
    if !t.subtasks.is_empty() {
        let done = t.subtasks.iter().filter(|s| s.completed).count();
        parts.push(format!("{}/{} subtasks", done, t.subtasks.len()));
    }
    if !t.comments.is_empty() {
        parts.push(format!("{} comments", t.comments.len()));
    }
    if !t.attachments.is_empty() {
        parts.push(format!("{} attachments", t.attachments.len()));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  ({})", parts.join(", "))
    }
}

fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn format_recurrence(r: Option<Recurrence>) -> &'static str {
    match r {
        Some(Recurrence::Daily) => "daily",
        Some(Recurrence::Weekly) => "weekly",
        Some(Recurrence::Monthly) => "monthly",
        None => "-",
    }
}

/// Print full details of one task, including its nested entities.
pub fn cmd_view<S: KeyValueStore>(app: &App<S>, index: usize) -> Result<(), String> {
    app.check_index(index)?;
    let t = &app.list.tasks[index];
    println!("ID:          {}", t.id);
    println!("Description: {}", t.description);
    println!("Status:      {}", if t.completed { "completed" } else { "active" });
    println!("Priority:    {}", format_priority(t.priority));
    println!("Due:         {}", t.due_date.as_deref().unwrap_or("-"));
    println!("Recurring:   {}", format_recurrence(t.recurring));
    println!("Notes:       {}", if t.notes.is_empty() { "-" } else { &t.notes });
    if !t.subtasks.is_empty() {
        println!("Subtasks:");
        for (i, s) in t.subtasks.iter().enumerate() {
            println!(
                "  {} {} {}",
                i,
                if s.completed { "[x]" } else { "[ ]" },
                s.description
            );
        }
    }
    if !t.comments.is_empty() {
        println!("Comments:");
        for (i, c) in t.comments.iter().enumerate() {
            println!("  {} [{}] {}", i, c.timestamp, c.text);
        }
    }
    if !t.attachments.is_empty() {
        println!("Attachments:");
        for (i, a) in t.attachments.iter().enumerate() {
            println!("  {} {} ({} bytes encoded)", i, a.name, a.data.len());
        }
    }
    Ok(())
}

/// Flip a task's completed flag.
pub fn cmd_toggle<S: KeyValueStore>(app: &mut App<S>, index: usize) -> Result<(), String> {
    app.check_index(index)?;
    app.list.toggle(index);
    app.persist()?;
    let t = &app.list.tasks[index];
    println!(
        "Task {} is now {}",
        index,
        if t.completed { "completed" } else { "active" }
    );
    Ok(())
}

/// Replace a task's description, rejecting empty results.
pub fn cmd_edit<S: KeyValueStore>(
    app: &mut App<S>,
    index: usize,
    description: String,
) -> Result<(), String> {
    app.check_index(index)?;
    match app.list.commit_edit(index, &description) {
        Ok(()) => {
            app.persist()?;
            println!("Updated task {index}");
            Ok(())
        }
        // An edit may not produce an empty description; previous one kept.
        Err(EmptyDescription) => Ok(()),
    }
}

/// Delete a task, remembering it in the session's single undo slot.
pub fn cmd_delete<S: KeyValueStore>(app: &mut App<S>, index: usize) -> Result<(), String> {
    app.check_index(index)?;
    let record = app.list.delete(index);
    app.session.record_delete(record);
    app.persist()?;
    println!("Deleted task at position {index} (undo available)");
    Ok(())
}

/// Re-insert the most recently deleted task at its old position.
pub fn cmd_undo<S: KeyValueStore>(app: &mut App<S>) -> Result<(), String> {
    match app.session.take_undo() {
        Some(record) => {
            let index = record.index.min(app.list.len());
            app.list.undo(record);
            app.persist()?;
            println!("Restored task at position {index}");
        }
        None => println!("Nothing to undo."),
    }
    Ok(())
}

/// Remove all completed tasks and invalidate any pending undo.
pub fn cmd_clear_completed<S: KeyValueStore>(app: &mut App<S>) -> Result<(), String> {
    if !app.list.has_completed() {
        println!("No completed tasks.");
        return Ok(());
    }
    let removed = app.list.clear_completed();
    // Captured indices no longer mean anything.
    app.session.invalidate_undo();
    app.persist()?;
    println!("Cleared {removed} completed task(s)");
    Ok(())
}

/// Move a task from one position to another.
pub fn cmd_move<S: KeyValueStore>(app: &mut App<S>, from: usize, to: usize) -> Result<(), String> {
    app.check_index(from)?;
    if to > app.list.len() {
        return Err(format!("No position {to} to move to."));
    }
    app.list.reorder(from, to);
    app.persist()?;
    println!("Moved task from {from} to {}", to.min(app.list.len() - 1));
    Ok(())
}

/// Dispatch a subtask action against its parent task.
pub fn cmd_subtask<S: KeyValueStore>(app: &mut App<S>, action: SubtaskAction) -> Result<(), String> {
    match action {
        SubtaskAction::Add { index, text } => {
            app.check_index(index)?;
            if add_subtask(&mut app.list.tasks[index], &mut app.ids, &text) {
                app.persist()?;
                println!("Added subtask to task {index}");
            }
        }
        SubtaskAction::Remove { index, subtask } => {
            app.check_index(index)?;
            let task = &mut app.list.tasks[index];
            if subtask >= task.subtasks.len() {
                return Err(format!("No subtask at index {subtask}."));
            }
            remove_subtask(task, subtask);
            app.persist()?;
            println!("Removed subtask {subtask} from task {index}");
        }
        SubtaskAction::Toggle { index, subtask } => {
            app.check_index(index)?;
            let task = &mut app.list.tasks[index];
            if subtask >= task.subtasks.len() {
                return Err(format!("No subtask at index {subtask}."));
            }
            toggle_subtask(task, subtask);
            app.persist()?;
        }
    }
    Ok(())
}

/// Dispatch a comment action against its parent task.
pub fn cmd_comment<S: KeyValueStore>(app: &mut App<S>, action: CommentAction) -> Result<(), String> {
    match action {
        CommentAction::Add { index, text } => {
            app.check_index(index)?;
            if add_comment(&mut app.list.tasks[index], &mut app.ids, &text) {
                app.persist()?;
                println!("Added comment to task {index}");
            }
        }
        CommentAction::Remove { index, comment } => {
            app.check_index(index)?;
            let task = &mut app.list.tasks[index];
            if comment >= task.comments.len() {
                return Err(format!("No comment at index {comment}."));
            }
            remove_comment(task, comment);
            app.persist()?;
            println!("Removed comment {comment} from task {index}");
        }
    }
    Ok(())
}

/// Dispatch an attachment action against its parent task.
///
/// The file is read to completion before the task is touched, and the target
/// task is fetched by position at that point; if other mutations happened in
/// between, the append lands on the list as it is now.
pub fn cmd_attach<S: KeyValueStore>(app: &mut App<S>, action: AttachAction) -> Result<(), String> {
    match action {
        AttachAction::Add { index, file } => {
            app.check_index(index)?;
            let payload =
                std::fs::read(&file).map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string();
            app.check_index(index)?;
            if add_attachment(&mut app.list.tasks[index], &mut app.ids, &name, &payload) {
                app.persist()?;
                println!("Attached {} to task {index}", name);
            }
        }
        AttachAction::Remove { index, attachment } => {
            app.check_index(index)?;
            let task = &mut app.list.tasks[index];
            if attachment >= task.attachments.len() {
                return Err(format!("No attachment at index {attachment}."));
            }
            remove_attachment(task, attachment);
            app.persist()?;
            println!("Removed attachment {attachment} from task {index}");
        }
    }
    Ok(())
}

/// Export the full task list to a portable JSON file.
pub fn cmd_export(list: &TaskList, output: Option<PathBuf>) -> Result<(), String> {
    let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    let document = export_json(&list.tasks);
    std::fs::write(&path, document)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    println!("Exported {} task(s) to {}", list.len(), path.display());
    Ok(())
}

/// Replace the task list wholesale from a JSON document.
pub fn cmd_import<S: KeyValueStore>(app: &mut App<S>, input: &Path) -> Result<(), String> {
    let document =
        std::fs::read_to_string(input).map_err(|_| "Error reading file".to_string())?;
    let tasks = import_json(&document).map_err(|e| e.to_string())?;
    let count = tasks.len();
    app.list.replace(tasks);
    app.ids = IdGen::seeded_from(&app.list.tasks);
    app.persist()?;
    println!("Imported {count} task(s)");
    Ok(())
}

/// Flip the theme flag and persist it.
pub fn cmd_theme<S: KeyValueStore>(app: &mut App<S>) -> Result<(), String> {
    let dark = toggle_theme(&mut app.store, &mut app.session)
        .map_err(|e| format!("Failed to save theme: {e}"))?;
    println!("Dark mode {}", if dark { "on" } else { "off" });
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Interactive session: same operations, but filter, search, drag state and
/// the undo slot stay alive between commands.
pub fn cmd_shell<S: KeyValueStore>(app: &mut App<S>) -> Result<(), String> {
    println!("todo shell. Type 'help' for commands, 'quit' to leave.");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        line.clear();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "quit" | "exit") {
            break;
        }
        if let Err(e) = shell_dispatch(app, input) {
            eprintln!("{e}");
        }
    }
    Ok(())
}

fn shell_dispatch<S: KeyValueStore>(app: &mut App<S>, input: &str) -> Result<(), String> {
    let (verb, rest) = split_token(input);
    match verb {
        "help" => print_shell_help(),
        "add" => cmd_add(
            app,
            rest.to_string(),
            Priority::Medium,
            None,
            None,
            String::new(),
        )?,
        "list" => cmd_list(&app.list, app.session.filter, &app.session.search),
        "filter" => {
            app.session.filter = match rest {
                "all" => Filter::All,
                "active" => Filter::Active,
                "completed" => Filter::Completed,
                other => return Err(format!("Unknown filter '{other}'. Use all | active | completed.")),
            };
            cmd_list(&app.list, app.session.filter, &app.session.search);
        }
        "search" => {
            app.session.search = rest.to_string();
            cmd_list(&app.list, app.session.filter, &app.session.search);
        }
        "view" => cmd_view(app, parse_index(rest)?)?,
        "details" => {
            let index = parse_index(rest)?;
            app.check_index(index)?;
            let shown = {
                let task = &mut app.list.tasks[index];
                task.show_details = !task.show_details;
                task.show_details
            };
            if shown {
                cmd_view(app, index)?;
            }
        }
        "toggle" => cmd_toggle(app, parse_index(rest)?)?,
        "edit" => {
            let (index, text) = split_token(rest);
            cmd_edit(app, parse_index(index)?, text.to_string())?;
        }
        "delete" => cmd_delete(app, parse_index(rest)?)?,
        "undo" => cmd_undo(app)?,
        "clear" => cmd_clear_completed(app)?,
        "move" => {
            let (from, to) = split_token(rest);
            cmd_move(app, parse_index(from)?, parse_index(to)?)?;
        }
        "drag" => {
            let index = parse_index(rest)?;
            app.check_index(index)?;
            app.session.dragged_index = Some(index);
            println!("Dragging task {index}");
        }
        "drop" => {
            let Some(from) = app.session.dragged_index.take() else {
                return Err("Nothing is being dragged.".to_string());
            };
            let slot = parse_index(rest)?;
            // The drop slot is expressed against the visible, filtered view;
            // map it back to a position in the backing list.
            let visible = visible_indices(&app.list.tasks, app.session.filter, &app.session.search);
            let target = resolve_drop(slot, &visible, app.list.len());
            let to_hint = if target > from { target - 1 } else { target };
            cmd_move(app, from, to_hint)?;
        }
        "sub" => {
            let (action, rest) = split_token(rest);
            match action {
                "add" => {
                    let (index, text) = split_token(rest);
                    cmd_subtask(app, SubtaskAction::Add { index: parse_index(index)?, text: text.to_string() })?;
                }
                "rm" => {
                    let (index, sub) = split_token(rest);
                    cmd_subtask(app, SubtaskAction::Remove { index: parse_index(index)?, subtask: parse_index(sub)? })?;
                }
                "toggle" => {
                    let (index, sub) = split_token(rest);
                    cmd_subtask(app, SubtaskAction::Toggle { index: parse_index(index)?, subtask: parse_index(sub)? })?;
                }
                other => return Err(format!("Unknown subtask action '{other}'.")),
            }
        }
        "comment" => {
            let (action, rest) = split_token(rest);
            match action {
                "add" => {
                    let (index, text) = split_token(rest);
                    cmd_comment(app, CommentAction::Add { index: parse_index(index)?, text: text.to_string() })?;
                }
                "rm" => {
                    let (index, c) = split_token(rest);
                    cmd_comment(app, CommentAction::Remove { index: parse_index(index)?, comment: parse_index(c)? })?;
                }
                other => return Err(format!("Unknown comment action '{other}'.")),
            }
        }
        "attach" => {
            let (action, rest) = split_token(rest);
            match action {
                "add" => {
                    let (index, file) = split_token(rest);
                    cmd_attach(app, AttachAction::Add { index: parse_index(index)?, file: PathBuf::from(file) })?;
                }
                "rm" => {
                    let (index, a) = split_token(rest);
                    cmd_attach(app, AttachAction::Remove { index: parse_index(index)?, attachment: parse_index(a)? })?;
                }
                other => return Err(format!("Unknown attach action '{other}'.")),
            }
        }
        "export" => {
            let output = if rest.is_empty() { None } else { Some(PathBuf::from(rest)) };
            cmd_export(&app.list, output)?;
        }
        "import" => cmd_import(app, Path::new(rest))?,
        "theme" => cmd_theme(app)?,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    }
    Ok(())
}

fn split_token(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (input, ""),
    }
}

fn parse_index(token: &str) -> Result<usize, String> {
    token
        .parse::<usize>()
        .map_err(|_| format!("Expected a list position, got '{token}'."))
}

fn print_shell_help() {
    println!("Commands:");
    println!("  add <description>            filter all|active|completed");
    println!("  list                         search [text]");
    println!("  view <i>    details <i>      toggle <i>    edit <i> <description>");
    println!("  delete <i>  undo  clear      move <from> <to>");
    println!("  drag <i>    drop <slot>      (slot is a position in the visible list)");
    println!("  sub add <i> <text> | sub rm <i> <j> | sub toggle <i> <j>");
    println!("  comment add <i> <text> | comment rm <i> <j>");
    println!("  attach add <i> <file> | attach rm <i> <j>");
    println!("  export [path]  import <path>  theme  quit");
}
