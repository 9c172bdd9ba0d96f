//! Remote task store contract.
//!
//! # Responsibility
//! - Define the async CRUD + logout surface the board consumes.
//! - Classify remote failures into a small, stable taxonomy.
//!
//! # Invariants
//! - Every call carries the credential explicitly; stores never read
//!   ambient session state.
//! - Implementations never retry.

use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::session::Credential;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of one remote store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request could not complete (connect, timeout, broken body).
    Network(String),
    /// Credential missing or refused by the store.
    Auth(String),
    /// The store answered with a non-success status.
    Rejected { status: u16, body: String },
    /// The response could not be decoded or violates task invariants.
    InvalidData(String),
}

impl RemoteError {
    /// Stable short name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Rejected { .. } => "rejected",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network failure: {message}"),
            Self::Auth(message) => write!(f, "authentication failure: {message}"),
            Self::Rejected { status, body } if body.is_empty() => {
                write!(f, "remote rejected request with status {status}")
            }
            Self::Rejected { status, body } => {
                write!(f, "remote rejected request with status {status}: {body}")
            }
            Self::InvalidData(message) => write!(f, "invalid remote task data: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Remote source of truth for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetches the whole collection in store order.
    async fn list_tasks(&self, credential: &Credential) -> RemoteResult<Vec<Task>>;

    /// Creates one task and returns the stored record with its id.
    async fn create_task(&self, credential: &Credential, task: &NewTask) -> RemoteResult<Task>;

    /// Applies a partial update. The response body is not used.
    async fn update_task(
        &self,
        credential: &Credential,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> RemoteResult<()>;

    /// Deletes one task.
    async fn delete_task(&self, credential: &Credential, id: &TaskId) -> RemoteResult<()>;

    /// Ends the remote session for `credential`.
    async fn logout(&self, credential: &Credential) -> RemoteResult<()>;
}
