//! Server acks, rejections and remote broadcasts

mod fixtures;

use fixtures::{dispatcher, doc, move_x, recording_sender};
use vectra_editor::model::*;
use vectra_editor::{
    decode_server_message, Dispatcher, MemoryStore, NackOutcome, OpKind, Operation,
    OperationAck, OperationBroadcast, OperationNack,
};

fn connected() -> Dispatcher<MemoryStore> {
    let mut dispatcher = dispatcher();
    let (send, _sent) = recording_sender();
    dispatcher.set_send_function(Some(send));
    dispatcher
}

fn ack(id: &str) -> OperationAck {
    OperationAck {
        operation_id: id.to_string(),
        server_seq: 1,
        server_timestamp: 1_700_000_000_500,
    }
}

fn nack(id: &str) -> OperationNack {
    OperationNack {
        operation_id: id.to_string(),
        reason: "object locked by another user".to_string(),
        conflicting_op: None,
    }
}

fn remote(id: &str, kind: OpKind) -> OperationBroadcast {
    OperationBroadcast {
        operation: Operation::new(id, 1_700_000_000_100, 1, kind),
        user_id: "user-2".to_string(),
        server_seq: 7,
    }
}

#[test]
fn test_ack_confirms_pending_operation() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();

    assert!(dispatcher.handle_ack(&ack(&id)));

    assert!(!dispatcher.is_pending(&id));
    assert!(dispatcher.can_undo());
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 50.0);

    // Duplicate ack is ignored
    assert!(!dispatcher.handle_ack(&ack(&id)));
}

#[test]
fn test_nack_rolls_back_local_edit() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();

    let outcome = dispatcher.handle_nack(&nack(&id));

    assert_eq!(outcome, NackOutcome::RolledBack);
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
    assert!(!dispatcher.is_pending(&id));
    assert!(!dispatcher.can_undo());
    assert!(!dispatcher.can_redo());
}

#[test]
fn test_nack_of_one_edit_keeps_the_others() {
    let mut dispatcher = connected();
    let first = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    let second = dispatcher
        .dispatch(OpKind::ObjectVisibility {
            object_id: "e1".to_string(),
            visible: false,
            previous: None,
        })
        .unwrap();

    assert_eq!(dispatcher.handle_nack(&nack(&first)), NackOutcome::RolledBack);

    let doc = doc(&dispatcher);
    assert_eq!(doc.objects["r1"].transform.x, 10.0);
    assert!(!doc.objects["e1"].visible);
    let remaining: Vec<_> = dispatcher
        .history()
        .undo_entries()
        .map(|op| op.id.clone())
        .collect();
    assert_eq!(remaining, vec![second]);
}

#[test]
fn test_nack_for_unknown_operation() {
    let mut dispatcher = connected();
    let before = doc(&dispatcher).clone();

    assert_eq!(dispatcher.handle_nack(&nack("nope")), NackOutcome::Unknown);
    assert_eq!(doc(&dispatcher), &before);
}

#[test]
fn test_nack_without_inverse_diverges() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("ghost", 1.0)).unwrap();
    assert!(!dispatcher.needs_resync());

    assert_eq!(dispatcher.handle_nack(&nack(&id)), NackOutcome::Diverged);

    assert!(dispatcher.needs_resync());
    assert!(!dispatcher.is_pending(&id));
    assert!(!dispatcher.can_undo());

    // A fresh document clears the flag
    dispatcher.load_document(fixtures::sample_document());
    assert!(!dispatcher.needs_resync());
}

#[test]
fn test_nack_after_local_undo_does_not_revert_twice() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    dispatcher.undo();
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);

    assert_eq!(dispatcher.handle_nack(&nack(&id)), NackOutcome::RolledBack);

    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
    assert!(!dispatcher.can_redo());
}

#[test]
fn test_rejected_undo_is_reverted() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    dispatcher.handle_ack(&ack(&id));
    dispatcher.undo();

    // The undo went out as its own pending operation
    assert_eq!(dispatcher.pending_count(), 1);
    let undo_id = "local-2";
    assert!(dispatcher.is_pending(undo_id));

    assert_eq!(dispatcher.handle_nack(&nack(undo_id)), NackOutcome::RolledBack);
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 50.0);

    // The edit stands on the server, so it is undoable again
    assert!(dispatcher.can_undo());
    assert!(!dispatcher.can_redo());
    assert!(dispatcher.undo());
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
}

#[test]
fn test_rejected_redo_drops_the_entry() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    dispatcher.handle_ack(&ack(&id));
    dispatcher.undo();
    dispatcher.handle_ack(&ack("local-2"));
    dispatcher.redo();

    let redo_id = "local-3";
    assert!(dispatcher.is_pending(redo_id));

    assert_eq!(dispatcher.handle_nack(&nack(redo_id)), NackOutcome::RolledBack);
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
    assert!(!dispatcher.can_undo());
    assert!(!dispatcher.can_redo());

    let before = doc(&dispatcher).clone();
    assert!(!dispatcher.undo());
    assert_eq!(doc(&dispatcher), &before);
}

#[test]
fn test_rejected_undo_after_local_redo_keeps_the_edit() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    dispatcher.handle_ack(&ack(&id));
    dispatcher.undo();
    dispatcher.redo();

    // Server never applied the undo, and locally the edit is back
    assert_eq!(dispatcher.handle_nack(&nack("local-2")), NackOutcome::RolledBack);
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 50.0);
    assert!(dispatcher.can_undo());
    assert_eq!(dispatcher.history().undo_levels(), 1);
    assert!(dispatcher.is_pending("local-3"));
}

#[test]
fn test_create_on_existing_id_is_never_pending() {
    let mut dispatcher = connected();
    let track = doc(&dispatcher).tracks["t1"].clone();
    let id = dispatcher
        .dispatch(OpKind::TrackCreate {
            track,
            index: None,
            keyframes: vec![],
        })
        .unwrap();

    assert!(!dispatcher.is_pending(&id));
    assert_eq!(dispatcher.handle_nack(&nack(&id)), NackOutcome::Unknown);
    assert!(doc(&dispatcher).tracks.contains_key("t1"));
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
}

#[test]
fn test_remote_operation_is_applied_but_not_undoable() {
    let mut dispatcher = connected();

    let changed = dispatcher.handle_remote_op(&remote(
        "remote-1",
        OpKind::SceneUpdate {
            scene_id: "s1".to_string(),
            changes: ScenePatch {
                name: Some("Renamed by peer".to_string()),
                background: None,
            },
            previous: None,
        },
    ));

    assert!(changed);
    assert_eq!(doc(&dispatcher).scenes["s1"].name, "Renamed by peer");
    assert!(!dispatcher.can_undo());
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_undo_skips_interleaved_remote_edits() {
    let mut dispatcher = connected();
    dispatcher.dispatch(move_x("r1", 50.0));
    dispatcher.handle_remote_op(&remote("remote-1", move_x("e1", 33.0)));

    dispatcher.undo();

    let doc = doc(&dispatcher);
    assert_eq!(doc.objects["r1"].transform.x, 10.0);
    assert_eq!(doc.objects["e1"].transform.x, 33.0);
}

#[test]
fn test_remote_write_to_same_field_wins_until_undo() {
    let mut dispatcher = connected();
    dispatcher.dispatch(move_x("r1", 50.0));
    dispatcher.handle_remote_op(&remote("remote-1", move_x("r1", 70.0)));
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 70.0);

    // Undo restores what this client saw before its own edit
    dispatcher.undo();
    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
}

#[test]
fn test_echo_of_pending_operation_is_skipped() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();
    let before = doc(&dispatcher).clone();

    let echo = OperationBroadcast {
        operation: dispatcher.history().undo_entries().next().unwrap().clone(),
        user_id: "me".to_string(),
        server_seq: 3,
    };

    assert!(!dispatcher.handle_remote_op(&echo));
    assert_eq!(doc(&dispatcher), &before);
    assert!(dispatcher.is_pending(&id));
}

#[test]
fn test_remote_edit_for_missing_target_is_silent() {
    let mut dispatcher = connected();
    let before = doc(&dispatcher).clone();

    assert!(!dispatcher.handle_remote_op(&remote("remote-1", move_x("ghost", 5.0))));
    assert_eq!(doc(&dispatcher), &before);
}

#[test]
fn test_routes_decoded_server_messages() {
    let mut dispatcher = connected();
    let id = dispatcher.dispatch(move_x("r1", 50.0)).unwrap();

    let broadcast = decode_server_message(
        r#"{
            "type": "op.broadcast",
            "payload": {
                "operation": {
                    "id": "remote-9",
                    "timestamp": 1700000000200,
                    "clientSequence": 4,
                    "kind": "object.visibility",
                    "objectId": "e1",
                    "visible": false
                },
                "userId": "user-2",
                "serverSeq": 8
            }
        }"#,
    )
    .unwrap();
    dispatcher.handle_server_message(&broadcast);
    assert!(!doc(&dispatcher).objects["e1"].visible);

    let rejection = decode_server_message(&format!(
        r#"{{"type":"op.nack","payload":{{"operationId":"{}","reason":"stale"}}}}"#,
        id
    ))
    .unwrap();
    dispatcher.handle_server_message(&rejection);

    assert_eq!(doc(&dispatcher).objects["r1"].transform.x, 10.0);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_unknown_message_type_fails_to_decode() {
    assert!(decode_server_message(r#"{"type":"op.mystery","payload":{}}"#).is_err());
}
