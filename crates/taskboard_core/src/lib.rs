//! Core client logic for the task board.
//! This crate owns the task collection view model and its remote store seam.

pub mod board;
pub mod config;
pub mod logging;
pub mod model;
pub mod remote;
pub mod session;

pub use board::editor::EditorState;
pub use board::view::{column_view, format_created_at, ColumnEntry, ColumnView, IndexOutOfRange};
pub use board::view_model::{
    BoardError, BoardResult, MoveOutcome, NavigationIntent, PendingMove, ReconcilePolicy,
    Reconciliation, TaskBoard,
};
pub use config::{BoardConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    MissingTaskId, NewTask, SortMode, Task, TaskDraft, TaskId, TaskPatch, TaskStatus,
    TaskValidationError, UnknownStatus,
};
pub use remote::http_store::HttpTaskStore;
pub use remote::memory_store::{InMemoryTaskStore, StoreCall};
pub use remote::task_store::{RemoteError, RemoteResult, TaskStore};
pub use session::{Credential, Session};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
