//! Local task cache and reconciliation.
//!
//! `TaskBoard` owns the in-memory task list and the editor (form) state.
//! All mutation flows through [`TaskBoard::apply`], which drops superseded
//! or cancelled responses before anything touches the list. Reconciliation
//! only ever appends (create), replaces in place (update), or removes
//! (delete); the list is never reordered client-side, and nothing mutates
//! except from a confirmed server response.
//!
//! Operations of the same kind are guarded by a sequence id: issuing a new
//! one supersedes the previous, and the stale response is ignored when it
//! eventually lands. Operations of *different* kinds are not ordered against
//! each other: an update racing a delete of the same id resolves to
//! whichever response arrives last.

use tokio_util::sync::CancellationToken;

use crate::api::{ApiFailure, ApiOutcome};
use crate::tasks::{Task, TaskDraft};

/// Identifier for one issued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId(pub u64);

#[derive(Debug, Default)]
struct OpSeq {
    next: u64,
}

impl OpSeq {
    fn next_id(&mut self) -> OpId {
        let id = OpId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// The four synchronizer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Load,
    Create,
    Update,
    Delete,
}

/// In-flight state for one operation kind (mutated only by the board).
#[derive(Debug, Clone, Default)]
struct OpState {
    active: Option<OpId>,
    cancel: Option<CancellationToken>,
}

impl OpState {
    fn on_started(&mut self, id: OpId, cancel: CancellationToken) {
        self.active = Some(id);
        self.cancel = Some(cancel);
    }

    fn finish_if_active(&mut self, id: OpId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
            self.cancel = None;
        }
        ok
    }

    fn cancel_and_clear(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.active = None;
    }
}

#[derive(Debug, Default)]
struct InflightOps {
    load: OpState,
    create: OpState,
    update: OpState,
    delete: OpState,
}

impl InflightOps {
    fn state_mut(&mut self, kind: OpKind) -> &mut OpState {
        match kind {
            OpKind::Load => &mut self.load,
            OpKind::Create => &mut self.create,
            OpKind::Update => &mut self.update,
            OpKind::Delete => &mut self.delete,
        }
    }

    fn cancel_all(&mut self) {
        self.load.cancel_and_clear();
        self.create.cancel_and_clear();
        self.update.cancel_and_clear();
        self.delete.cancel_and_clear();
    }
}

/// Editor (form) state for the create/edit panel.
///
/// `editing` holds the target id in the edit flow; `None` means create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    pub draft: TaskDraft,
    pub editing: Option<i64>,
}

/// Ticket handed to an operation at dispatch time.
///
/// Carries the op id for the stale guard and a cancellation token the
/// board can fire when the screen is abandoned.
#[derive(Debug, Clone)]
pub struct OpTicket {
    pub id: OpId,
    pub kind: OpKind,
    pub cancel: CancellationToken,
}

/// A validated save: the ticket plus the draft snapshot to send.
#[derive(Debug, Clone)]
pub struct SaveOp {
    pub ticket: OpTicket,
    pub draft: TaskDraft,
    /// Target id for update; `None` means create.
    pub editing: Option<i64>,
}

/// Completion events fed back into [`TaskBoard::apply`].
#[derive(Debug)]
pub enum SyncEvent {
    Loaded {
        op: OpId,
        outcome: ApiOutcome<Vec<Task>>,
    },
    Created {
        op: OpId,
        outcome: ApiOutcome<Task>,
    },
    Updated {
        op: OpId,
        outcome: ApiOutcome<Task>,
    },
    Deleted {
        op: OpId,
        id: i64,
        outcome: ApiOutcome<()>,
    },
    /// The operation was cancelled before a response was consumed.
    Cancelled { op: OpId, kind: OpKind },
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// List state was updated from a confirmed server response.
    Applied,
    /// The response belonged to a superseded or cancelled operation and was
    /// dropped without touching the list.
    Stale,
    /// The session is no longer valid; the credential is already cleared and
    /// the caller must route to sign-in. The list is untouched.
    SessionExpired,
    /// The operation failed; the list is untouched and an open editor keeps
    /// its input.
    Failed(ApiFailure),
}

/// In-memory task list plus the state that governs how responses may
/// mutate it.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    loading: bool,
    editor: Option<Editor>,
    seq: OpSeq,
    inflight: InflightOps,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached list, in server-insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True while a load is in flight. Distinguishes "no tasks yet" from
    /// "still fetching".
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Opens the editor: blank draft for create, prefilled for edit.
    pub fn open_editor(&mut self, editing: Option<&Task>) {
        self.editor = Some(match editing {
            Some(task) => Editor {
                draft: TaskDraft::from_task(task),
                editing: Some(task.id),
            },
            None => Editor::default(),
        });
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Mutable access to the open editor's draft, if any.
    pub fn draft_mut(&mut self) -> Option<&mut TaskDraft> {
        self.editor.as_mut().map(|e| &mut e.draft)
    }

    /// Registers a load or delete operation and returns its ticket.
    ///
    /// Starting a new operation supersedes any in-flight one of the same
    /// kind: the old response will be dropped by the guard when it lands.
    pub fn begin(&mut self, kind: OpKind) -> OpTicket {
        if kind == OpKind::Load {
            self.loading = true;
        }
        let id = self.seq.next_id();
        let cancel = CancellationToken::new();
        self.inflight.state_mut(kind).on_started(id, cancel.clone());
        OpTicket { id, kind, cancel }
    }

    /// Validates the open editor and registers the save it describes.
    ///
    /// Returns `None`, dispatching nothing, when no editor is open or
    /// when the draft has an empty/whitespace-only title *and* description.
    /// The editor stays open either way.
    pub fn begin_save(&mut self) -> Option<SaveOp> {
        let editor = self.editor.as_ref()?;
        if editor.draft.is_blank() {
            tracing::debug!("blank draft; save not dispatched");
            return None;
        }

        let draft = editor.draft.clone();
        let editing = editor.editing;
        let kind = if editing.is_some() {
            OpKind::Update
        } else {
            OpKind::Create
        };
        let ticket = self.begin(kind);
        Some(SaveOp {
            ticket,
            draft,
            editing,
        })
    }

    /// Cancels every in-flight operation so late responses are dropped.
    ///
    /// Called when the list screen is left; nothing that resolves afterwards
    /// may mutate state belonging to it.
    pub fn abandon(&mut self) {
        self.inflight.cancel_all();
        self.loading = false;
    }

    /// Applies a completion event.
    ///
    /// Responses from superseded or cancelled operations are dropped here;
    /// everything else reconciles per the server's confirmed payload.
    pub fn apply(&mut self, event: SyncEvent) -> SyncOutcome {
        match event {
            SyncEvent::Loaded { op, outcome } => {
                if !self.inflight.load.finish_if_active(op) {
                    tracing::debug!(op = op.0, "dropping superseded load response");
                    return SyncOutcome::Stale;
                }
                self.loading = false;
                match outcome {
                    ApiOutcome::Success(tasks) => {
                        self.tasks = tasks;
                        SyncOutcome::Applied
                    }
                    ApiOutcome::SessionExpired => SyncOutcome::SessionExpired,
                    ApiOutcome::Failure(f) => {
                        tracing::warn!(error = %f, "task list fetch failed");
                        SyncOutcome::Failed(f)
                    }
                }
            }
            SyncEvent::Created { op, outcome } => {
                if !self.inflight.create.finish_if_active(op) {
                    tracing::debug!(op = op.0, "dropping superseded create response");
                    return SyncOutcome::Stale;
                }
                match outcome {
                    ApiOutcome::Success(task) => {
                        self.tasks.push(task);
                        self.close_editor();
                        SyncOutcome::Applied
                    }
                    ApiOutcome::SessionExpired => SyncOutcome::SessionExpired,
                    ApiOutcome::Failure(f) => {
                        tracing::warn!(error = %f, "task create failed");
                        SyncOutcome::Failed(f)
                    }
                }
            }
            SyncEvent::Updated { op, outcome } => {
                if !self.inflight.update.finish_if_active(op) {
                    tracing::debug!(op = op.0, "dropping superseded update response");
                    return SyncOutcome::Stale;
                }
                match outcome {
                    ApiOutcome::Success(task) => {
                        // Replace in place only. A concurrent delete may have
                        // removed the entry already; nothing is re-added then.
                        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                            *slot = task;
                        } else {
                            tracing::debug!(id = task.id, "updated task no longer in list");
                        }
                        self.close_editor();
                        SyncOutcome::Applied
                    }
                    ApiOutcome::SessionExpired => SyncOutcome::SessionExpired,
                    ApiOutcome::Failure(f) => {
                        tracing::warn!(error = %f, "task update failed");
                        SyncOutcome::Failed(f)
                    }
                }
            }
            SyncEvent::Deleted { op, id, outcome } => {
                if !self.inflight.delete.finish_if_active(op) {
                    tracing::debug!(op = op.0, "dropping superseded delete response");
                    return SyncOutcome::Stale;
                }
                match outcome {
                    ApiOutcome::Success(()) => {
                        self.tasks.retain(|t| t.id != id);
                        SyncOutcome::Applied
                    }
                    ApiOutcome::SessionExpired => SyncOutcome::SessionExpired,
                    ApiOutcome::Failure(f) => {
                        tracing::warn!(error = %f, id, "task delete failed");
                        SyncOutcome::Failed(f)
                    }
                }
            }
            SyncEvent::Cancelled { op, kind } => {
                let finished = self.inflight.state_mut(kind).finish_if_active(op);
                if finished && kind == OpKind::Load {
                    self.loading = false;
                }
                tracing::debug!(op = op.0, ?kind, "operation cancelled");
                SyncOutcome::Stale
            }
        }
    }
}
