//! # Dispatcher
//!
//! One client's entry point for editing a document.
//!
//! Every local edit is applied to the document immediately (optimistic),
//! recorded for undo, and, while a send function is attached, submitted to
//! the server and tracked as pending until the server acks or nacks it.
//!
//! ```text
//! dispatch(kind)
//!   → stamp id / timestamp / client sequence
//!   → capture previous state from the current document
//!   → apply to the document
//!   → record on the undo stack (redo cleared)
//!   → if connected: pending[id] = op, send op.submit
//! ```
//!
//! The dispatcher is a plain value owned by the host application. All
//! entry points take `&mut self` and run to completion.

use crate::applier::apply_in_place;
use crate::capture::capture;
use crate::config::EditorConfig;
use crate::inverse::invert_kind;
use crate::messages::ClientMessage;
use crate::operation::{InverseSource, OpKind, Operation, OperationId};
use crate::store::DocumentStore;
use crate::undo_stack::UndoStack;
use std::collections::HashMap;
use tracing::debug;
use vectra_common::{Clock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
use vectra_model::Document;

/// Hands a message to the network transport
pub type SendFn = Box<dyn FnMut(ClientMessage)>;

/// Why an operation went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SentAs {
    Dispatch,
    /// Inverse of the history entry `origin`
    Undo,
    /// Fresh copy of the history entry `origin`
    Redo,
}

/// An operation awaiting the server's verdict
#[derive(Debug, Clone)]
pub(crate) struct PendingOp {
    pub(crate) op: Operation,
    /// Id of the history entry this operation was derived from
    pub(crate) origin: OperationId,
    pub(crate) sent_as: SentAs,
}

pub struct Dispatcher<S: DocumentStore> {
    pub(crate) store: S,
    pub(crate) history: UndoStack,

    /// Sent but not yet acked or nacked
    pub(crate) pending: HashMap<OperationId, PendingOp>,

    send: Option<SendFn>,
    pub(crate) ids: Box<dyn IdGenerator>,
    pub(crate) clock: Box<dyn Clock>,
    config: EditorConfig,
    client_sequence: u64,

    /// Raised when a rejected edit could not be rolled back
    pub(crate) needs_resync: bool,
}

impl<S: DocumentStore> Dispatcher<S> {
    /// Dispatcher with default config
    pub fn new(store: S) -> Self {
        Self::with_config(store, EditorConfig::default())
    }

    pub fn with_config(store: S, config: EditorConfig) -> Self {
        let ids: Box<dyn IdGenerator> = match &config.client_id {
            Some(prefix) => Box::new(SequentialIds::new(prefix.clone())),
            None => Box::new(UuidGenerator),
        };

        Self {
            store,
            history: UndoStack::with_max_levels(config.history_limit),
            pending: HashMap::new(),
            send: None,
            ids,
            clock: Box::new(SystemClock),
            config,
            client_sequence: 0,
            needs_resync: false,
        }
    }

    /// Replace the identifier source
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Apply a local edit.
    ///
    /// Returns the assigned operation id, or `None` when no document is
    /// loaded (nothing to mutate). A create that changes nothing (its id is
    /// taken, or its parent is gone) is neither recorded nor sent.
    pub fn dispatch(&mut self, kind: OpKind) -> Option<OperationId> {
        if self.store.document().is_none() {
            debug!(kind = kind.name(), "No document loaded, dropping edit");
            return None;
        }

        let op = self.stamp(kind);
        let doc = self.store.document()?;
        let op = capture(op, doc);

        let mut next = doc.clone();
        let changed = apply_in_place(&mut next, &op);
        if changed {
            self.store.set_document(next);
        }

        debug!(
            op_id = %op.id,
            kind = op.name(),
            changed,
            invertible = op.is_invertible(),
            "Dispatched operation"
        );

        // The delete inverting a no-op create would remove the existing entity
        if !changed && op.kind.inverse_source() == InverseSource::Payload {
            debug!(op_id = %op.id, kind = op.name(), "Create had no effect, not recorded");
            return Some(op.id);
        }

        if let Some(evicted) = self.history.record(op.clone()) {
            debug!(op_id = %evicted.id, "Evicted oldest undo entry");
        }

        let id = op.id.clone();
        self.submit(op, id.clone(), SentAs::Dispatch);
        Some(id)
    }

    /// Undo the most recent local edit. Returns false if there was nothing
    /// to undo or the entry cannot be inverted; the stacks are unchanged then.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.history.pop_undo() else {
            return false;
        };

        let inverse = match invert_kind(&op.kind) {
            Some(kind) if self.store.document().is_some() => kind,
            _ => {
                debug!(op_id = %op.id, kind = op.name(), "Undo unavailable for operation");
                self.history.push_undo(op);
                return false;
            }
        };

        let inverse = self.stamp(inverse);
        self.apply(&inverse);
        debug!(op_id = %op.id, inverse_id = %inverse.id, kind = op.name(), "Undid operation");

        let origin = op.id.clone();
        self.history.push_redo(op);
        if self.config.forward_history {
            self.submit(inverse, origin, SentAs::Undo);
        }
        true
    }

    /// Reapply the most recently undone edit
    pub fn redo(&mut self) -> bool {
        let Some(op) = self.history.pop_redo() else {
            return false;
        };
        if self.store.document().is_none() {
            self.history.push_redo(op);
            return false;
        }

        self.apply(&op);
        debug!(op_id = %op.id, kind = op.name(), "Redid operation");

        let copy = self.stamp(op.kind.clone());
        let origin = op.id.clone();
        self.history.push_undo(op);
        if self.config.forward_history {
            self.submit(copy, origin, SentAs::Redo);
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forget all history and pending operations
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.pending.clear();
    }

    /// Attach (`Some`) or detach (`None`) the transport. Detaching keeps
    /// already-pending operations; it only stops future forwarding.
    pub fn set_send_function(&mut self, send: Option<SendFn>) {
        debug!(connected = send.is_some(), "Transport changed");
        self.send = send;
    }

    pub fn is_connected(&self) -> bool {
        self.send.is_some()
    }

    /// Switch to a different document. History never carries across documents.
    pub fn load_document(&mut self, document: Document) {
        self.store.set_document(document);
        self.clear_history();
        self.needs_resync = false;
    }

    pub fn document(&self) -> Option<&Document> {
        self.store.document()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// True after a server rejection left local state diverged
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    fn next_sequence(&mut self) -> u64 {
        self.client_sequence += 1;
        self.client_sequence
    }

    /// New operation identity around `kind`
    fn stamp(&mut self, kind: OpKind) -> Operation {
        Operation::new(
            self.ids.next_id(),
            self.clock.now_millis(),
            self.next_sequence(),
            kind,
        )
    }

    /// Apply through the store. Returns whether the document changed.
    pub(crate) fn apply(&mut self, op: &Operation) -> bool {
        let Some(doc) = self.store.document() else {
            return false;
        };
        let mut next = doc.clone();
        let changed = apply_in_place(&mut next, op);
        if changed {
            self.store.set_document(next);
        }
        changed
    }

    /// Send to the server when connected, tracking it as pending
    fn submit(&mut self, op: Operation, origin: OperationId, sent_as: SentAs) {
        let Some(send) = self.send.as_mut() else {
            return;
        };
        debug!(op_id = %op.id, kind = op.name(), origin = %origin, "Submitting operation");
        self.pending.insert(
            op.id.clone(),
            PendingOp {
                op: op.clone(),
                origin,
                sent_as,
            },
        );
        send(ClientMessage::Submit(op));
    }
}
