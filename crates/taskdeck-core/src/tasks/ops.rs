//! Async task operations.
//!
//! Free functions that dispatch one authenticated call each and hand back a
//! [`SyncEvent`] for [`super::TaskBoard::apply`]. Cancellation races the
//! request itself: a fired token resolves to a `Cancelled` event instead of
//! whatever the network eventually returns.

use crate::api::ApiClient;
use crate::tasks::board::{OpKind, OpTicket, SaveOp, SyncEvent};

/// Fetches the full task list for the current session.
pub async fn load(client: &ApiClient, ticket: &OpTicket) -> SyncEvent {
    tokio::select! {
        () = ticket.cancel.cancelled() => SyncEvent::Cancelled {
            op: ticket.id,
            kind: OpKind::Load,
        },
        outcome = client.list_tasks() => SyncEvent::Loaded {
            op: ticket.id,
            outcome,
        },
    }
}

/// Dispatches a validated save: POST for create, PUT for an existing id.
pub async fn save(client: &ApiClient, op: &SaveOp) -> SyncEvent {
    match op.editing {
        Some(id) => {
            tokio::select! {
                () = op.ticket.cancel.cancelled() => SyncEvent::Cancelled {
                    op: op.ticket.id,
                    kind: OpKind::Update,
                },
                outcome = client.update_task(id, &op.draft) => SyncEvent::Updated {
                    op: op.ticket.id,
                    outcome,
                },
            }
        }
        None => {
            tokio::select! {
                () = op.ticket.cancel.cancelled() => SyncEvent::Cancelled {
                    op: op.ticket.id,
                    kind: OpKind::Create,
                },
                outcome = client.create_task(&op.draft) => SyncEvent::Created {
                    op: op.ticket.id,
                    outcome,
                },
            }
        }
    }
}

/// Deletes a task by id. No confirmation step; the server's word is final.
pub async fn delete(client: &ApiClient, ticket: &OpTicket, id: i64) -> SyncEvent {
    tokio::select! {
        () = ticket.cancel.cancelled() => SyncEvent::Cancelled {
            op: ticket.id,
            kind: OpKind::Delete,
        },
        outcome = client.delete_task(id) => SyncEvent::Deleted {
            op: ticket.id,
            id,
            outcome,
        },
    }
}
