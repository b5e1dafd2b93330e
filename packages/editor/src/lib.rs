//! # Vectra Editor
//!
//! Operation log and reconciliation engine for collaborative document editing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI event → Dispatcher::dispatch(kind)       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ capture: record values about to change      │
//! │ applier: mutate the document                │
//! │ undo stack: record, clear redo              │
//! └─────────────────────────────────────────────┘
//!                     ↓ (if connected)
//! ┌─────────────────────────────────────────────┐
//! │ op.submit → server                          │
//! │ server → op.ack / op.nack / op.broadcast    │
//! │        → reconciler                         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Optimistic clients**: local edits apply before the network sees them
//! 2. **Server authority**: ordering is the server's; a rejection rolls back
//! 3. **Invertible edits**: every operation carries what it needs to be undone
//! 4. **Own history only**: remote edits are never undoable locally
//! 5. **No OT/CRDT**: field-level last-write-wins is the only merge
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vectra_editor::{Dispatcher, MemoryStore, OpKind};
//!
//! let mut dispatcher = Dispatcher::new(MemoryStore::new(document));
//! dispatcher.set_send_function(Some(Box::new(move |msg| socket.send(msg))));
//!
//! dispatcher.dispatch(OpKind::ObjectVisibility {
//!     object_id: "rect-1".into(),
//!     visible: false,
//!     previous: None,
//! });
//! dispatcher.undo();
//!
//! // from the socket's message handler
//! let message = vectra_editor::decode_server_message(&text)?;
//! dispatcher.handle_server_message(&message);
//! ```

pub mod applier;
pub mod capture;
mod config;
mod dispatcher;
mod errors;
pub mod inverse;
mod messages;
mod operation;
mod reconciler;
mod store;
mod undo_stack;

pub use applier::{apply, apply_in_place};
pub use capture::capture;
pub use config::EditorConfig;
pub use dispatcher::{Dispatcher, SendFn};
pub use errors::EditorError;
pub use inverse::{invert, invert_kind};
pub use messages::{
    decode_server_message, encode_client_message, ClientMessage, OperationAck,
    OperationBroadcast, OperationNack, ServerMessage,
};
pub use operation::{
    DeletedObject, DeletedScene, DeletedTrack, InverseSource, ObjectSubtree, OpKind, Operation,
    OperationId, ParentSlot, SlottedTrack,
};
pub use reconciler::NackOutcome;
pub use store::{DocumentStore, MemoryStore};
pub use undo_stack::{StackSide, UndoStack};

// Re-export the model for convenience
pub use vectra_model as model;
