//! Shared document fixtures for editor tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use vectra_common::{FixedClock, SequentialIds};
use vectra_editor::model::*;
use vectra_editor::{ClientMessage, Dispatcher, MemoryStore, SendFn};

pub fn keyframe(id: &str, track_id: &str, frame: u32, value: f64) -> Keyframe {
    Keyframe {
        id: id.to_string(),
        track_id: track_id.to_string(),
        frame,
        value: KeyframeValue::Number(value),
        easing: Easing::Linear,
    }
}

/// Two scenes. `s1` holds a group `g1` with a rectangle `r1` (x = 10) and an
/// ellipse `e1`; `r1` is animated by track `t1` with keys at 0 and 20.
pub fn sample_document() -> Document {
    let mut doc = Document::new("p1", "Demo");
    let root = doc.add_scene("s1", "Intro");
    doc.add_object(SceneObject::group("g1", "s1").with_parent(root.clone()));

    let mut rect = SceneObject::new(
        "r1",
        "s1",
        Shape::Rectangle {
            width: 100.0,
            height: 40.0,
        },
    )
    .with_parent("g1");
    rect.transform.x = 10.0;
    doc.add_object(rect);

    doc.add_object(SceneObject::new("e1", "s1", Shape::Ellipse { rx: 5.0, ry: 5.0 }).with_parent(root));

    doc.add_track(Track {
        id: "t1".to_string(),
        scene_id: "s1".to_string(),
        object_id: "r1".to_string(),
        property: "transform.x".to_string(),
        keyframe_ids: vec!["k0".to_string(), "k20".to_string()],
    });
    doc.keyframes.insert("k0".to_string(), keyframe("k0", "t1", 0, 10.0));
    doc.keyframes.insert("k20".to_string(), keyframe("k20", "t1", 20, 80.0));

    doc.add_track(Track {
        id: "t2".to_string(),
        scene_id: "s1".to_string(),
        object_id: "e1".to_string(),
        property: "style.opacity".to_string(),
        keyframe_ids: vec![],
    });

    let outro_root = doc.add_scene("s2", "Outro");
    doc.add_object(
        SceneObject::new(
            "txt",
            "s2",
            Shape::Text {
                content: "Bye".to_string(),
                font_size: 24.0,
            },
        )
        .with_parent(outro_root),
    );
    doc
}

pub fn dispatcher() -> Dispatcher<MemoryStore> {
    dispatcher_with_limit(100)
}

pub fn dispatcher_with_limit(limit: usize) -> Dispatcher<MemoryStore> {
    let config = vectra_editor::EditorConfig {
        history_limit: limit,
        ..Default::default()
    };
    Dispatcher::with_config(MemoryStore::new(sample_document()), config)
        .with_ids(SequentialIds::new("local"))
        .with_clock(FixedClock(1_700_000_000_000))
}

/// Send function that records every outgoing message
pub fn recording_sender() -> (SendFn, Rc<RefCell<Vec<ClientMessage>>>) {
    let sent = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&sent);
    let send: SendFn = Box::new(move |message| sink.borrow_mut().push(message));
    (send, sent)
}

pub fn doc(dispatcher: &Dispatcher<MemoryStore>) -> &Document {
    dispatcher.document().expect("document loaded")
}

pub fn move_x(object_id: &str, x: f64) -> vectra_editor::OpKind {
    vectra_editor::OpKind::ObjectTransform {
        object_id: object_id.to_string(),
        transform: TransformPatch {
            x: Some(x),
            ..Default::default()
        },
        previous: None,
    }
}
