use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed to-do list manager.
/// State lives under ~/.todo or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal to-do list manager")]
pub struct Cli {
    /// Directory holding the persisted task list and theme flag.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
