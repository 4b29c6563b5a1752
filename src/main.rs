//! # todo - Personal to-do list manager
//!
//! A file-backed to-do list manager for a single user: tasks with
//! priorities, due dates, recurrence, notes, subtasks, comments and file
//! attachments, plus filtered/searched views, drag-style reordering and a
//! single-slot undo for the last delete.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task
//! todo add "Buy milk" --priority high --due 2026-09-01
//!
//! # List active tasks matching a search
//! todo list --filter active --search milk
//!
//! # Tick it off, then clear completed tasks
//! todo toggle 0
//! todo clear-completed
//!
//! # Long-lived session with live filter/search/undo state
//! todo shell
//! ```
//!
//! ## Storage
//!
//! State lives under `~/.todo` (override with `--data-dir`): the task list
//! as a pretty-printed JSON array under the `tasks` key and the theme flag
//! under `darkMode`. `todo export` / `todo import` round-trip the list
//! through a portable `tasks.json` document.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod error;
pub mod exchange;
pub mod filter;
pub mod list;
pub mod nested;
pub mod session;
pub mod store;
pub mod task;

use cli::Cli;
use cmd::*;
use store::FileStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no store at all.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".todo")
    });
    let store = match FileStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open data directory {}: {e}", data_dir.display());
            std::process::exit(1);
        }
    };
    let mut app = App::open(store);

    let result = match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Add {
            description,
            priority,
            due,
            recurring,
            notes,
        } => cmd_add(&mut app, description, priority, due, recurring, notes),
        Commands::List { filter, search } => {
            cmd_list(&app.list, filter, &search);
            Ok(())
        }
        Commands::View { index } => cmd_view(&app, index),
        Commands::Toggle { index } => cmd_toggle(&mut app, index),
        Commands::Edit { index, description } => cmd_edit(&mut app, index, description),
        Commands::Delete { index } => cmd_delete(&mut app, index),
        Commands::Undo => cmd_undo(&mut app),
        Commands::ClearCompleted => cmd_clear_completed(&mut app),
        Commands::Move { from, to } => cmd_move(&mut app, from, to),
        Commands::Subtask { action } => cmd_subtask(&mut app, action),
        Commands::Comment { action } => cmd_comment(&mut app, action),
        Commands::Attach { action } => cmd_attach(&mut app, action),
        Commands::Export { output } => cmd_export(&app.list, output),
        Commands::Import { input } => cmd_import(&mut app, &input),
        Commands::Theme => cmd_theme(&mut app),
        Commands::Shell => cmd_shell(&mut app),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
