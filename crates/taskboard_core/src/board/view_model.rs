//! Task board use-case service.
//!
//! # Responsibility
//! - Own the in-memory task collection for one session.
//! - Route create/update/delete/move/logout through the remote store.
//! - Derive column views and hand navigation intents to the host shell.
//!
//! # Invariants
//! - Create, update and delete mutate the collection only after the store
//!   confirms them.
//! - Moves are applied locally before the store is asked; a failed move is
//!   reconciled per [`ReconcilePolicy`] and never overwrites a newer move.
//! - Every failure is logged here, once, and returned to the caller.
//! - Nothing is retried.

use crate::board::editor::EditorState;
use crate::board::view::{column_view, ColumnView, IndexOutOfRange};
use crate::config::{default_display_offset, BoardConfig};
use crate::model::task::{
    SortMode, Task, TaskDraft, TaskId, TaskPatch, TaskStatus, TaskValidationError,
};
use crate::remote::task_store::{RemoteError, RemoteResult, TaskStore};
use crate::session::{Credential, Session};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

pub type BoardResult<T> = Result<T, BoardError>;

/// Errors from board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// No credential in the session; nothing was sent.
    NotSignedIn,
    /// The remote store failed the call.
    Remote(RemoteError),
    /// No task with this id in the local collection.
    TaskNotFound(TaskId),
    /// A loaded record violates task invariants.
    InvalidTask(TaskValidationError),
    /// A loaded collection repeats an id.
    DuplicateTaskId(TaskId),
    /// Reorder index outside the column.
    IndexOutOfRange(IndexOutOfRange),
    /// Save requested while the editor is closed.
    EditorClosed,
}

impl BoardError {
    /// Stable short name used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "not_signed_in",
            Self::Remote(err) => err.kind(),
            Self::TaskNotFound(_) => "task_not_found",
            Self::InvalidTask(_) => "invalid_task",
            Self::DuplicateTaskId(_) => "duplicate_task_id",
            Self::IndexOutOfRange(_) => "index_out_of_range",
            Self::EditorClosed => "editor_closed",
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no session credential; sign in first"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id in collection: {id}"),
            Self::IndexOutOfRange(err) => write!(f, "{err}"),
            Self::EditorClosed => write!(f, "task editor is not open"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::InvalidTask(err) => Some(err),
            Self::IndexOutOfRange(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for BoardError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<IndexOutOfRange> for BoardError {
    fn from(value: IndexOutOfRange) -> Self {
        Self::IndexOutOfRange(value)
    }
}

/// What to do with an optimistic move the store rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Restore the status the task had before the move.
    #[default]
    RollBack,
    /// Leave the optimistic status in place.
    KeepOptimistic,
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rollback" | "roll_back" => Ok(Self::RollBack),
            "keep" | "keep_optimistic" => Ok(Self::KeepOptimistic),
            other => Err(format!("unsupported reconcile policy `{other}`; expected rollback|keep")),
        }
    }
}

/// Outcome of reconciling one optimistic move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The store accepted the move.
    Confirmed,
    /// The store refused; the previous status was restored.
    RolledBack(RemoteError),
    /// The store refused; the optimistic status was kept per policy.
    KeptOptimistic(RemoteError),
    /// The store refused, but a newer move was started on the task (or it
    /// left the board) before the answer arrived, so nothing was restored.
    Superseded(RemoteError),
}

impl Reconciliation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Where the host shell should take the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    /// Sign-in / sign-up landing page.
    EntryPage,
}

/// A move already applied locally, waiting for the store.
///
/// Submitting does not borrow the board, so views built in between show
/// the task in its new column.
#[derive(Debug)]
pub struct PendingMove<S: TaskStore> {
    id: TaskId,
    seq: u64,
    previous: TaskStatus,
    target: TaskStatus,
    credential: Credential,
    store: Arc<S>,
}

impl<S: TaskStore> PendingMove<S> {
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn target(&self) -> TaskStatus {
        self.target
    }

    /// Sends the status-only patch to the store.
    pub async fn submit(self) -> MoveOutcome {
        let patch = TaskPatch::status(self.target);
        let result = self
            .store
            .update_task(&self.credential, &self.id, &patch)
            .await;
        MoveOutcome {
            id: self.id,
            seq: self.seq,
            previous: self.previous,
            target: self.target,
            result,
        }
    }
}

/// Store answer for a submitted move, to be handed back to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub id: TaskId,
    /// Order of the move among all moves started on the board.
    pub seq: u64,
    pub previous: TaskStatus,
    pub target: TaskStatus,
    pub result: RemoteResult<()>,
}

/// Client-side view model over a remote task store.
pub struct TaskBoard<S: TaskStore> {
    store: Arc<S>,
    session: Session,
    tasks: Vec<Task>,
    editor: EditorState,
    display_offset: FixedOffset,
    reconcile: ReconcilePolicy,
    clock: fn() -> DateTime<Utc>,
    next_move_seq: u64,
    latest_moves: HashMap<TaskId, u64>,
}

impl<S: TaskStore> TaskBoard<S> {
    /// Creates an empty board with default display offset and policy.
    pub fn new(store: Arc<S>, session: Session) -> Self {
        Self {
            store,
            session,
            tasks: Vec::new(),
            editor: EditorState::Closed,
            display_offset: default_display_offset(),
            reconcile: ReconcilePolicy::default(),
            clock: Utc::now,
            next_move_seq: 0,
            latest_moves: HashMap::new(),
        }
    }

    /// Creates an empty board using display and reconcile settings from `config`.
    pub fn from_config(store: Arc<S>, session: Session, config: &BoardConfig) -> Self {
        Self::new(store, session)
            .with_display_offset(config.display_offset)
            .with_reconcile_policy(config.reconcile)
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    pub fn with_reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile = policy;
        self
    }

    /// Replaces the clock used to stamp `created_at` on new tasks.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        self.reconcile
    }

    /// Collection in store order (creates appended).
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Replaces the collection with the store's.
    ///
    /// On failure the previous collection is kept.
    pub async fn load(&mut self) -> BoardResult<usize> {
        let credential = self.credential("task_load")?;
        let loaded = match self.store.list_tasks(&credential).await {
            Ok(tasks) => tasks,
            Err(err) => return Err(log_failure("task_load", None, err.into())),
        };
        if let Err(err) = check_collection(&loaded) {
            return Err(log_failure("task_load", None, err));
        }

        self.tasks = loaded;
        info!(
            "event=task_load module=board status=ok count={}",
            self.tasks.len()
        );
        Ok(self.tasks.len())
    }

    /// Creates a task with status `TODO` stamped now; appends the stored
    /// record on success.
    pub async fn create(&mut self, draft: TaskDraft) -> BoardResult<Task> {
        let credential = self.credential("task_create")?;
        let new_task = draft.into_new_task((self.clock)());
        let created = match self.store.create_task(&credential, &new_task).await {
            Ok(task) => task,
            Err(err) => return Err(log_failure("task_create", None, err.into())),
        };
        if let Err(err) = created.validate() {
            return Err(log_failure("task_create", None, err.into()));
        }
        if self.task(&created.id).is_some() {
            return Err(log_failure(
                "task_create",
                Some(&created.id),
                BoardError::DuplicateTaskId(created.id.clone()),
            ));
        }

        info!(
            "event=task_create module=board status=ok task_id={}",
            created.id
        );
        self.tasks.push(created.clone());
        Ok(created)
    }

    /// Sends `patch` for `id`; merges it locally once the store accepts.
    pub async fn update(&mut self, id: &str, patch: TaskPatch) -> BoardResult<()> {
        let credential = self.credential("task_update")?;
        let id = id.to_string();
        if let Err(err) = self.store.update_task(&credential, &id, &patch).await {
            return Err(log_failure("task_update", Some(&id), err.into()));
        }

        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => task.apply_patch(&patch),
            None => debug!(
                "event=task_update module=board status=ok task_id={} local=missing",
                id
            ),
        }
        info!("event=task_update module=board status=ok task_id={}", id);
        Ok(())
    }

    /// Deletes `id` remotely, then drops it from the collection.
    pub async fn delete(&mut self, id: &str) -> BoardResult<()> {
        let credential = self.credential("task_delete")?;
        let id = id.to_string();
        if let Err(err) = self.store.delete_task(&credential, &id).await {
            return Err(log_failure("task_delete", Some(&id), err.into()));
        }

        self.tasks.retain(|task| task.id != id);
        self.latest_moves.remove(&id);
        if self.editor.editing_id() == Some(&id) {
            self.editor = EditorState::Closed;
        }
        info!("event=task_delete module=board status=ok task_id={}", id);
        Ok(())
    }

    /// Applies a move locally and returns the pending store submission.
    ///
    /// Column views reflect the new status as soon as this returns.
    pub fn begin_move(&mut self, id: &str, target: TaskStatus) -> BoardResult<PendingMove<S>> {
        let credential = self.credential("task_move")?;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Err(log_failure(
                "task_move",
                Some(id),
                BoardError::TaskNotFound(id.to_string()),
            ));
        };

        let previous = task.status;
        task.status = target;
        self.next_move_seq += 1;
        let seq = self.next_move_seq;
        self.latest_moves.insert(id.to_string(), seq);
        debug!(
            "event=task_move module=board status=pending task_id={} seq={} from={} to={}",
            id, seq, previous, target
        );

        Ok(PendingMove {
            id: id.to_string(),
            seq,
            previous,
            target,
            credential,
            store: Arc::clone(&self.store),
        })
    }

    /// Reconciles a submitted move with the collection.
    pub fn finish_move(&mut self, outcome: MoveOutcome) -> Reconciliation {
        let is_latest = self.latest_moves.get(&outcome.id) == Some(&outcome.seq);
        if is_latest {
            self.latest_moves.remove(&outcome.id);
        }

        let error = match outcome.result {
            Ok(()) => {
                info!(
                    "event=task_move module=board status=ok task_id={} to={}",
                    outcome.id, outcome.target
                );
                return Reconciliation::Confirmed;
            }
            Err(error) => error,
        };

        // Why: the status alone cannot tell a later move to the same column
        // apart from this one, so only the newest move per task may restore.
        let current = self
            .tasks
            .iter_mut()
            .find(|task| task.id == outcome.id)
            .filter(|task| is_latest && task.status == outcome.target);
        let (reconciliation, resolution) = match (self.reconcile, current) {
            (ReconcilePolicy::KeepOptimistic, _) => {
                (Reconciliation::KeptOptimistic(error.clone()), "kept")
            }
            (ReconcilePolicy::RollBack, Some(task)) => {
                task.status = outcome.previous;
                (Reconciliation::RolledBack(error.clone()), "rolled_back")
            }
            (ReconcilePolicy::RollBack, _) => (Reconciliation::Superseded(error.clone()), "superseded"),
        };

        warn!(
            "event=task_move module=board status=error task_id={} to={} resolution={} kind={} error={}",
            outcome.id,
            outcome.target,
            resolution,
            error.kind(),
            error
        );
        reconciliation
    }

    /// Moves `id` to `target`: local first, then the store, then reconcile.
    pub async fn move_task(&mut self, id: &str, target: TaskStatus) -> BoardResult<Reconciliation> {
        let pending = self.begin_move(id, target)?;
        let outcome = pending.submit().await;
        Ok(self.finish_move(outcome))
    }

    /// Reorders a rendered column. The collection and store are untouched.
    pub fn reorder_within_column(
        &self,
        view: &mut ColumnView,
        source: usize,
        target: usize,
    ) -> BoardResult<()> {
        view.reorder(source, target).map_err(|err| {
            log_failure("column_reorder", None, BoardError::IndexOutOfRange(err))
        })?;
        debug!(
            "event=column_reorder module=board status=ok column={} from={} to={}",
            view.status, source, target
        );
        Ok(())
    }

    /// Builds the column for `status`.
    pub fn column_view(&self, status: TaskStatus, search_term: &str, sort: SortMode) -> ColumnView {
        column_view(&self.tasks, status, search_term, sort, self.display_offset)
    }

    /// Builds all columns in board order.
    pub fn columns(&self, search_term: &str, sort: SortMode) -> Vec<ColumnView> {
        TaskStatus::ALL
            .iter()
            .map(|status| self.column_view(*status, search_term, sort))
            .collect()
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Opens the editor for a new task.
    pub fn open_create(&mut self) {
        self.editor = EditorState::Creating;
    }

    /// Opens the editor on an existing task.
    pub fn open_edit(&mut self, id: &str) -> BoardResult<&Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return Err(BoardError::TaskNotFound(id.to_string()));
        };
        self.editor = EditorState::Editing(id.to_string());
        Ok(&self.tasks[index])
    }

    pub fn close_editor(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// Saves the editor contents and closes the editor.
    ///
    /// The editor closes whether or not the store accepted the save; the
    /// returned error is the only trace of a failed save.
    pub async fn save_editor(&mut self, draft: TaskDraft) -> BoardResult<()> {
        // Why: the dialog closes before the request goes out, so a failed
        // save cannot leave it open on stale input.
        let state = std::mem::take(&mut self.editor);
        match state {
            EditorState::Closed => Err(BoardError::EditorClosed),
            EditorState::Creating => self.create(draft).await.map(|_| ()),
            EditorState::Editing(id) => self.update(&id, TaskPatch::from_draft(draft)).await,
        }
    }

    /// Ends the remote session and clears the local credential.
    ///
    /// The session is kept when the store refuses the logout.
    pub async fn logout(&mut self) -> BoardResult<NavigationIntent> {
        let credential = self.credential("logout")?;
        if let Err(err) = self.store.logout(&credential).await {
            return Err(log_failure("logout", None, err.into()));
        }

        self.session.clear();
        self.editor = EditorState::Closed;
        info!("event=logout module=board status=ok");
        Ok(NavigationIntent::EntryPage)
    }

    /// Intent for the sign-in and sign-up shortcuts.
    pub fn go_to_entry(&self) -> NavigationIntent {
        NavigationIntent::EntryPage
    }

    fn credential(&self, event: &'static str) -> BoardResult<Credential> {
        self.session
            .credential()
            .ok_or_else(|| log_failure(event, None, BoardError::NotSignedIn))
    }
}

fn check_collection(tasks: &[Task]) -> BoardResult<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate()?;
        if !seen.insert(task.id.as_str()) {
            return Err(BoardError::DuplicateTaskId(task.id.clone()));
        }
    }
    Ok(())
}

fn log_failure(event: &str, task_id: Option<&str>, err: BoardError) -> BoardError {
    match task_id {
        Some(id) => warn!(
            "event={} module=board status=error task_id={} kind={} error={}",
            event,
            id,
            err.kind(),
            err
        ),
        None => warn!(
            "event={} module=board status=error kind={} error={}",
            event,
            err.kind(),
            err
        ),
    }
    err
}
