//! # Previous-State Capture
//!
//! Reads, from the current document, the values an operation is about to
//! overwrite and stores them in the operation's `previous` field.
//!
//! Must run before the operation is applied; the dispatcher enforces that
//! ordering. A target that no longer exists leaves the operation unchanged,
//! which makes it best-effort and not undoable.

use crate::operation::{
    DeletedObject, DeletedScene, DeletedTrack, ObjectSubtree, OpKind, Operation, ParentSlot,
    SlottedTrack,
};
use vectra_common::SubtreeCollector;
use vectra_model::{Document, Track};

/// Return `op` enriched with the pre-mutation state it needs to be inverted
pub fn capture(mut op: Operation, doc: &Document) -> Operation {
    capture_kind(&mut op.kind, doc);
    op
}

pub fn capture_kind(kind: &mut OpKind, doc: &Document) {
    match kind {
        OpKind::ObjectTransform {
            object_id,
            transform,
            previous,
        } => {
            if let Some(object) = doc.object(object_id) {
                *previous = Some(transform.snapshot_of(&object.transform));
            }
        }

        OpKind::ObjectStyle {
            object_id,
            style,
            previous,
        } => {
            if let Some(object) = doc.object(object_id) {
                *previous = Some(style.snapshot_of(&object.style));
            }
        }

        // Inverse is a delete of the created root
        OpKind::ObjectCreate { .. } => {}

        OpKind::ObjectDelete { object_id, previous } => {
            *previous = capture_deleted_object(doc, object_id);
        }

        OpKind::ObjectReparent {
            object_id,
            previous,
            ..
        } => {
            if let Some(parent_id) = doc.object(object_id).and_then(|o| o.parent_id.clone()) {
                *previous = Some(ParentSlot {
                    index: doc.child_index(object_id),
                    parent_id,
                });
            }
        }

        OpKind::ObjectVisibility {
            object_id,
            previous,
            ..
        } => {
            if let Some(object) = doc.object(object_id) {
                *previous = Some(object.visible);
            }
        }

        OpKind::ObjectLock {
            object_id,
            previous,
            ..
        } => {
            if let Some(object) = doc.object(object_id) {
                *previous = Some(object.locked);
            }
        }

        OpKind::SceneUpdate {
            scene_id,
            changes,
            previous,
        } => {
            if let Some(scene) = doc.scene(scene_id) {
                *previous = Some(changes.snapshot_of(scene));
            }
        }

        OpKind::SceneCreate { .. } => {}

        OpKind::SceneDelete { scene_id, previous } => {
            *previous = capture_deleted_scene(doc, scene_id);
        }

        OpKind::TimelineUpdate {
            scene_id,
            changes,
            previous,
        } => {
            if let Some(scene) = doc.scene(scene_id) {
                *previous = Some(changes.snapshot_of(&scene.timeline));
            }
        }

        OpKind::TrackCreate { .. } => {}

        OpKind::TrackDelete { track_id, previous } => {
            if let Some(track) = doc.track(track_id) {
                *previous = Some(DeletedTrack {
                    index: timeline_index(doc, track),
                    keyframes: track
                        .keyframe_ids
                        .iter()
                        .filter_map(|id| doc.keyframe(id))
                        .cloned()
                        .collect(),
                    track: track.clone(),
                });
            }
        }

        // Only a same-frame fold needs state; a plain add inverts to a delete
        OpKind::KeyframeAdd { keyframe, replaced } => {
            if doc.keyframe(&keyframe.id).is_none() {
                *replaced = doc
                    .keyframe_at(&keyframe.track_id, keyframe.frame)
                    .cloned();
            }
        }

        OpKind::KeyframeUpdate {
            keyframe_id,
            changes,
            previous,
        } => {
            if let Some(keyframe) = doc.keyframe(keyframe_id) {
                *previous = Some(changes.snapshot_of(keyframe));
            }
        }

        OpKind::KeyframeDelete {
            keyframe_id,
            previous,
        } => {
            *previous = doc.keyframe(keyframe_id).cloned();
        }

        OpKind::ProjectRename { previous, .. } => {
            *previous = Some(doc.project.name.clone());
        }
    }
}

fn capture_deleted_object(doc: &Document, object_id: &str) -> Option<DeletedObject> {
    let object = doc.object(object_id)?;
    // Scene roots go away with their scene, never on their own
    let parent_id = object.parent_id.clone()?;
    let collected = SubtreeCollector::object(doc, object_id)?;

    Some(DeletedObject {
        subtree: into_subtree(doc, collected),
        index: doc.child_index(object_id),
        parent_id,
    })
}

fn capture_deleted_scene(doc: &Document, scene_id: &str) -> Option<DeletedScene> {
    let scene = doc.scene(scene_id)?;
    let collected = SubtreeCollector::scene(doc, scene_id)?;

    Some(DeletedScene {
        index: doc.scene_order.iter().position(|id| id == scene_id),
        contents: into_subtree(doc, collected),
        scene: scene.clone(),
    })
}

fn into_subtree(doc: &Document, collected: SubtreeCollector) -> ObjectSubtree {
    let tracks = collected
        .tracks
        .into_iter()
        .map(|track| SlottedTrack {
            index: timeline_index(doc, &track).unwrap_or(usize::MAX),
            track,
        })
        .collect();

    ObjectSubtree {
        objects: collected.objects,
        tracks,
        keyframes: collected.keyframes,
    }
}

fn timeline_index(doc: &Document, track: &Track) -> Option<usize> {
    doc.scene(&track.scene_id)?
        .timeline
        .track_ids
        .iter()
        .position(|id| *id == track.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_model::{Shape, SceneObject, TransformPatch};

    fn doc() -> Document {
        let mut doc = Document::new("p1", "Demo");
        let root = doc.add_scene("s1", "Intro");
        let mut rect = SceneObject::new(
            "r1",
            "s1",
            Shape::Rectangle {
                width: 10.0,
                height: 10.0,
            },
        )
        .with_parent(root);
        rect.transform.x = 10.0;
        doc.add_object(rect);
        doc
    }

    #[test]
    fn test_capture_transform_reads_only_patched_fields() {
        let op = Operation::new(
            "op-1",
            0,
            1,
            OpKind::ObjectTransform {
                object_id: "r1".to_string(),
                transform: TransformPatch {
                    x: Some(50.0),
                    ..Default::default()
                },
                previous: None,
            },
        );

        let captured = capture(op, &doc());

        match captured.kind {
            OpKind::ObjectTransform { previous, .. } => {
                let previous = previous.unwrap();
                assert_eq!(previous.x, Some(10.0));
                assert!(previous.y.is_none());
            }
            _ => panic!("kind changed"),
        }
    }

    #[test]
    fn test_capture_missing_target_is_noop() {
        let op = Operation::new(
            "op-1",
            0,
            1,
            OpKind::ObjectVisibility {
                object_id: "ghost".to_string(),
                visible: false,
                previous: None,
            },
        );

        let captured = capture(op.clone(), &doc());
        assert_eq!(captured, op);
        assert!(!captured.is_invertible());
    }

    #[test]
    fn test_capture_delete_records_parent_and_index() {
        let op = Operation::new(
            "op-1",
            0,
            1,
            OpKind::ObjectDelete {
                object_id: "r1".to_string(),
                previous: None,
            },
        );

        match capture(op, &doc()).kind {
            OpKind::ObjectDelete {
                previous: Some(deleted),
                ..
            } => {
                assert_eq!(deleted.parent_id, "s1-root");
                assert_eq!(deleted.index, Some(0));
                assert_eq!(deleted.subtree.objects[0].id, "r1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_capture_refuses_scene_root_delete() {
        let op = Operation::new(
            "op-1",
            0,
            1,
            OpKind::ObjectDelete {
                object_id: "s1-root".to_string(),
                previous: None,
            },
        );
        assert!(!capture(op, &doc()).is_invertible());
    }
}
