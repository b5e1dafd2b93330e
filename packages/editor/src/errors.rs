//! Error types for the editor
//!
//! Edit paths (dispatch, undo, redo, reconcile) never fail; these errors only
//! surface at the edges: decoding wire messages and loading configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] vectra_common::CommonError),
}
