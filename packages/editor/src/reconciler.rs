//! # Reconciler
//!
//! Server signals for operations this client already applied.
//!
//! ```text
//!                      ┌── ack ──→ Confirmed   (pending entry dropped)
//! Applied-Locally-Pending
//!                      └── nack ─→ Rolled-Back (inverse applied, history entry repaired)
//! ```
//!
//! Broadcasts from other participants are applied as-is. They never enter
//! the undo stack or the pending table, so a user cannot undo someone
//! else's edit.

use crate::dispatcher::{Dispatcher, PendingOp, SentAs};
use crate::inverse::invert_kind;
use crate::messages::{OperationAck, OperationBroadcast, OperationNack, ServerMessage};
use crate::operation::Operation;
use crate::store::DocumentStore;
use crate::undo_stack::StackSide;
use tracing::{debug, info, warn};

/// Result of handling a server rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackOutcome {
    /// The edit was reverted locally
    RolledBack,
    /// No inverse could be built; local state stays diverged until a resync
    Diverged,
    /// The id was not pending
    Unknown,
}

impl<S: DocumentStore> Dispatcher<S> {
    /// Server confirmed an operation. Returns false if it was not pending.
    pub fn handle_ack(&mut self, ack: &OperationAck) -> bool {
        match self.pending.remove(&ack.operation_id) {
            Some(pending) => {
                debug!(
                    op_id = %pending.op.id,
                    server_seq = ack.server_seq,
                    "Operation confirmed"
                );
                true
            }
            None => {
                debug!(op_id = %ack.operation_id, "Ack for unknown operation");
                false
            }
        }
    }

    /// Server rejected an operation: roll it back locally and repair the
    /// history entry it came from.
    ///
    /// A rejected dispatch or redo copy drops its history entry. A rejected
    /// undo inverse puts the entry back on the undo stack. Nothing is
    /// reapplied when the local stacks already show the entry reverted.
    pub fn handle_nack(&mut self, nack: &OperationNack) -> NackOutcome {
        let Some(PendingOp {
            op,
            origin,
            sent_as,
        }) = self.pending.remove(&nack.operation_id)
        else {
            warn!(op_id = %nack.operation_id, reason = %nack.reason, "Nack for unknown operation");
            return NackOutcome::Unknown;
        };

        let Some(inverse) = invert_kind(&op.kind) else {
            warn!(
                op_id = %op.id,
                origin = %origin,
                kind = op.name(),
                reason = %nack.reason,
                "Rejected operation cannot be rolled back, local state diverged"
            );
            self.history.remove(&origin);
            self.needs_resync = true;
            return NackOutcome::Diverged;
        };

        let side = self.history.side_of(&origin);
        let revert = match sent_as {
            SentAs::Dispatch | SentAs::Redo => {
                self.history.remove(&origin);
                side != Some(StackSide::Redo)
            }
            SentAs::Undo => {
                // Undone locally but not on the server: make it undoable again
                if side == Some(StackSide::Redo) {
                    if let Some((_, entry)) = self.history.take(&origin) {
                        if let Some(evicted) = self.history.push_undo(entry) {
                            debug!(op_id = %evicted.id, "Evicted oldest undo entry");
                        }
                    }
                }
                side != Some(StackSide::Undo)
            }
        };

        if revert {
            let inverse = Operation::new(
                self.ids.next_id(),
                self.clock.now_millis(),
                op.client_sequence,
                inverse,
            );
            self.apply(&inverse);
        }

        info!(
            op_id = %op.id,
            origin = %origin,
            kind = op.name(),
            reverted = revert,
            reason = %nack.reason,
            "Rolled back rejected operation"
        );
        NackOutcome::RolledBack
    }

    /// Apply another participant's operation. Returns whether the document changed.
    pub fn handle_remote_op(&mut self, broadcast: &OperationBroadcast) -> bool {
        let op = &broadcast.operation;

        // Our own edit echoed back: it is already applied
        if self.pending.contains_key(&op.id) {
            debug!(op_id = %op.id, "Skipping echo of pending local operation");
            return false;
        }

        let changed = self.apply(op);
        debug!(
            op_id = %op.id,
            kind = op.name(),
            user_id = %broadcast.user_id,
            server_seq = broadcast.server_seq,
            changed,
            "Applied remote operation"
        );
        changed
    }

    /// Route a decoded server message
    pub fn handle_server_message(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::Ack(ack) => {
                self.handle_ack(ack);
            }
            ServerMessage::Nack(nack) => {
                self.handle_nack(nack);
            }
            ServerMessage::Broadcast(broadcast) => {
                self.handle_remote_op(broadcast);
            }
        }
    }
}
