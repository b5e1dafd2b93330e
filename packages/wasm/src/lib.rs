use tracing::warn;
use wasm_bindgen::prelude::*;
use vectra_editor::model::Document;
use vectra_editor::{
    decode_server_message, encode_client_message, ClientMessage, Dispatcher, EditorConfig,
    MemoryStore, OpKind, SendFn,
};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// One client's editing session, owned by the page
#[wasm_bindgen]
pub struct EditorHandle {
    dispatcher: Dispatcher<MemoryStore>,
}

#[wasm_bindgen]
impl EditorHandle {
    /// `documentJson` may be null to start without a document
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: Option<String>, history_limit: usize) -> Result<EditorHandle, JsValue> {
        let store = match document_json {
            Some(json) => MemoryStore::new(
                serde_json::from_str(&json).map_err(|e| js_error("Document parse error", e))?,
            ),
            None => MemoryStore::empty(),
        };
        let config = EditorConfig {
            history_limit,
            ..Default::default()
        };

        Ok(EditorHandle {
            dispatcher: Dispatcher::with_config(store, config),
        })
    }

    /// Apply an edit given as an operation kind JSON object.
    /// Returns the new operation id, or undefined without a document.
    pub fn dispatch(&mut self, kind_json: &str) -> Result<Option<String>, JsValue> {
        let kind: OpKind =
            serde_json::from_str(kind_json).map_err(|e| js_error("Operation parse error", e))?;
        Ok(self.dispatcher.dispatch(kind))
    }

    pub fn undo(&mut self) -> bool {
        self.dispatcher.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.dispatcher.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.dispatcher.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.dispatcher.can_redo()
    }

    #[wasm_bindgen(js_name = undoDescription)]
    pub fn undo_description(&self) -> Option<String> {
        self.dispatcher.history().undo_description()
    }

    #[wasm_bindgen(js_name = redoDescription)]
    pub fn redo_description(&self) -> Option<String> {
        self.dispatcher.history().redo_description()
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&mut self) {
        self.dispatcher.clear_history();
    }

    /// Feed one message received from the collaboration server
    #[wasm_bindgen(js_name = handleServerMessage)]
    pub fn handle_server_message(&mut self, json: &str) -> Result<(), JsValue> {
        let message =
            decode_server_message(json).map_err(|e| js_error("Server message error", e))?;
        self.dispatcher.handle_server_message(&message);
        Ok(())
    }

    /// Attach a function receiving each outgoing message as a JSON string,
    /// or detach with null
    #[wasm_bindgen(js_name = setSendFunction)]
    pub fn set_send_function(&mut self, send: Option<js_sys::Function>) {
        let send = send.map(|function| {
            Box::new(move |message: ClientMessage| {
                let json = match encode_client_message(&message) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!(error = %err, "Failed to encode outgoing message");
                        return;
                    }
                };
                if let Err(err) = function.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    warn!(error = ?err, "Send function threw");
                }
            }) as SendFn
        });
        self.dispatcher.set_send_function(send);
    }

    #[wasm_bindgen(js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.dispatcher.is_connected()
    }

    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> usize {
        self.dispatcher.pending_count()
    }

    /// True once a rejected edit could not be rolled back; reload the
    /// document from the server to recover
    #[wasm_bindgen(js_name = needsResync)]
    pub fn needs_resync(&self) -> bool {
        self.dispatcher.needs_resync()
    }

    /// Current document as JSON, undefined when none is loaded
    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<Option<String>, JsValue> {
        self.dispatcher
            .document()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| js_error("Serialization error", e))
    }

    /// Replace the document; clears history
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<(), JsValue> {
        let document: Document =
            serde_json::from_str(json).map_err(|e| js_error("Document parse error", e))?;
        self.dispatcher.load_document(document);
        Ok(())
    }
}
