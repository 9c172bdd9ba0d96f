//! Command-line shell over the task board.
//!
//! # Responsibility
//! - Wire configuration, logging, session and HTTP store into a `TaskBoard`.
//! - Render columns as text and act on navigation intents.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use taskboard_core::{
    init_logging, BoardConfig, BoardError, ColumnView, HttpTaskStore, NavigationIntent,
    Reconciliation, Session, SortMode, TaskBoard, TaskDraft, TaskPatch, TaskStatus,
};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Work with a remote task board")]
struct Cli {
    /// Bearer token issued at sign-in.
    #[arg(long, env = "TASKBOARD_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the three status columns.
    List {
        /// Case-insensitive title filter.
        #[arg(long, default_value = "")]
        search: String,
        /// `recent` or `oldest`.
        #[arg(long, default_value = "recent")]
        sort: SortMode,
    },
    /// Create a task in the TO DO column.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a task's title or description.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move a task to another column.
    Move { id: String, status: TaskStatus },
    /// Delete a task.
    Delete { id: String },
    /// End the session.
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &BoardConfig) -> Result<(), BoardError> {
    let session = match cli.token {
        Some(token) => Session::with_token(token),
        None => Session::new(),
    };
    let store = Arc::new(HttpTaskStore::new(config)?);
    let mut board = TaskBoard::from_config(store, session, config);

    match cli.command {
        Command::List { search, sort } => {
            board.load().await?;
            for column in board.columns(&search, sort) {
                print_column(&column);
            }
        }
        Command::Add { title, description } => {
            board.load().await?;
            board.open_create();
            let before = board.tasks().len();
            board
                .save_editor(TaskDraft::new(title, description))
                .await?;
            if let Some(task) = board.tasks().get(before) {
                println!("created {}", task.id);
            }
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let patch = TaskPatch {
                title,
                description,
                status: None,
            };
            if patch.is_empty() {
                println!("nothing to change");
                return Ok(());
            }
            board.load().await?;
            board.open_edit(&id)?;
            board.update(&id, patch).await?;
            board.close_editor();
            println!("updated {id}");
        }
        Command::Move { id, status } => {
            board.load().await?;
            match board.move_task(&id, status).await? {
                Reconciliation::Confirmed => println!("moved {id} to {}", status.label()),
                Reconciliation::RolledBack(err)
                | Reconciliation::KeptOptimistic(err)
                | Reconciliation::Superseded(err) => return Err(BoardError::Remote(err)),
            }
        }
        Command::Delete { id } => {
            board.load().await?;
            board.delete(&id).await?;
            println!("deleted {id}");
        }
        Command::Logout => match board.logout().await? {
            NavigationIntent::EntryPage => println!("signed out; continue at the entry page"),
        },
    }

    Ok(())
}

fn print_column(column: &ColumnView) {
    println!("== {} ({}) ==", column.status.label(), column.len());
    for entry in &column.entries {
        println!(
            "- [{}] {}  (created {})",
            entry.task.id, entry.task.title, entry.created_display
        );
        if !entry.task.description.is_empty() {
            println!("    {}", entry.task.description);
        }
    }
    println!();
}
