//! In-process [`TaskStore`] for tests and demos.
//!
//! Behaves like the REST store: assigns ids on create, answers 404 for
//! unknown ids, and can be told to fail upcoming calls.

use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::remote::task_store::{RemoteError, RemoteResult, TaskStore};
use crate::session::Credential;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Store operation, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Create,
    Update(TaskId, TaskPatch),
    Delete(TaskId),
    Logout,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    pending_failures: VecDeque<RemoteError>,
    calls: Vec<StoreCall>,
    required_token: Option<String>,
}

/// Vec-backed store guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: Mutex<MemoryState>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `tasks` already stored, in the given order.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        store.lock().tasks = tasks;
        store
    }

    /// Rejects credentials other than `token` with `RemoteError::Auth`.
    pub fn require_token(&self, token: impl Into<String>) {
        self.lock().required_token = Some(token.into());
    }

    /// Makes the next call fail with `error`. Queued failures are consumed
    /// in order, one per call.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().pending_failures.push_back(error);
    }

    /// Snapshot of stored tasks.
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Calls received so far, including failed ones.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `call` and applies auth and injected failures.
    fn begin(&self, credential: &Credential, call: StoreCall) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(required) = &state.required_token {
            if required != credential.token() {
                return Err(RemoteError::Auth("status 401".to_string()));
            }
        }
        if let Some(error) = state.pending_failures.pop_front() {
            return Err(error);
        }
        Ok(state)
    }
}

fn not_found(id: &TaskId) -> RemoteError {
    RemoteError::Rejected {
        status: 404,
        body: format!("task {id} not found"),
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_tasks(&self, credential: &Credential) -> RemoteResult<Vec<Task>> {
        let state = self.begin(credential, StoreCall::List)?;
        Ok(state.tasks.clone())
    }

    async fn create_task(&self, credential: &Credential, task: &NewTask) -> RemoteResult<Task> {
        let mut state = self.begin(credential, StoreCall::Create)?;
        let created = Task {
            id: Uuid::new_v4().simple().to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            created_at: task.created_at,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        credential: &Credential,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> RemoteResult<()> {
        let mut state = self.begin(credential, StoreCall::Update(id.clone(), patch.clone()))?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| not_found(id))?;
        task.apply_patch(patch);
        Ok(())
    }

    async fn delete_task(&self, credential: &Credential, id: &TaskId) -> RemoteResult<()> {
        let mut state = self.begin(credential, StoreCall::Delete(id.clone()))?;
        let before = state.tasks.len();
        state.tasks.retain(|task| &task.id != id);
        if state.tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn logout(&self, credential: &Credential) -> RemoteResult<()> {
        self.begin(credential, StoreCall::Logout)?;
        Ok(())
    }
}
