//! # Wire Messages
//!
//! JSON shapes exchanged with the collaboration server. The transport that
//! carries them (socket lifecycle, reconnect) lives outside this crate.

use crate::errors::EditorError;
use crate::operation::{Operation, OperationId};
use serde::{Deserialize, Serialize};

/// Client → server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    #[serde(rename = "op.submit")]
    Submit(Operation),
}

impl ClientMessage {
    pub fn operation(&self) -> &Operation {
        match self {
            ClientMessage::Submit(op) => op,
        }
    }
}

/// Server → client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    #[serde(rename = "op.ack")]
    Ack(OperationAck),

    #[serde(rename = "op.nack")]
    Nack(OperationNack),

    #[serde(rename = "op.broadcast")]
    Broadcast(OperationBroadcast),
}

/// Server accepted a submitted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationAck {
    pub operation_id: OperationId,
    pub server_seq: u64,
    pub server_timestamp: i64,
}

/// Server rejected a submitted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationNack {
    pub operation_id: OperationId,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_op: Option<Operation>,
}

/// Operation from another participant, relayed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBroadcast {
    pub operation: Operation,
    pub user_id: String,
    pub server_seq: u64,
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, EditorError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, EditorError> {
    Ok(serde_json::to_string(message)?)
}
