//! # Inverse Generation
//!
//! Builds the operation that undoes an already-applied one. Never touches
//! the document; the result goes through the applier like any other edit.
//!
//! - In-place updates swap `previous` with the forward payload, so the
//!   inverse is itself invertible
//! - Create inverts to a delete whose `previous` is the created content
//! - Delete inverts to a create from the captured content
//! - A kind that needs `previous` but lacks it has no inverse

use crate::operation::{DeletedObject, DeletedScene, DeletedTrack, OpKind, Operation, ParentSlot};
use vectra_model::KeyframePatch;

/// Inverse of `op` under a new id, keeping the original's timestamp and sequence
pub fn invert(op: &Operation, id: impl Into<String>) -> Option<Operation> {
    let kind = invert_kind(&op.kind)?;
    Some(Operation::new(id, op.timestamp, op.client_sequence, kind))
}

pub fn invert_kind(kind: &OpKind) -> Option<OpKind> {
    let inverse = match kind {
        OpKind::ObjectTransform {
            object_id,
            transform,
            previous,
        } => OpKind::ObjectTransform {
            object_id: object_id.clone(),
            transform: previous.clone()?,
            previous: Some(transform.clone()),
        },

        OpKind::ObjectStyle {
            object_id,
            style,
            previous,
        } => OpKind::ObjectStyle {
            object_id: object_id.clone(),
            style: previous.clone()?,
            previous: Some(style.clone()),
        },

        OpKind::ObjectCreate {
            parent_id,
            index,
            subtree,
        } => OpKind::ObjectDelete {
            object_id: subtree.root()?.id.clone(),
            previous: Some(DeletedObject {
                subtree: subtree.clone(),
                parent_id: parent_id.clone(),
                index: *index,
            }),
        },

        OpKind::ObjectDelete { previous, .. } => {
            let deleted = previous.clone()?;
            OpKind::ObjectCreate {
                parent_id: deleted.parent_id,
                index: deleted.index,
                subtree: deleted.subtree,
            }
        }

        OpKind::ObjectReparent {
            object_id,
            new_parent_id,
            index,
            previous,
        } => {
            let slot = previous.clone()?;
            OpKind::ObjectReparent {
                object_id: object_id.clone(),
                new_parent_id: slot.parent_id,
                index: slot.index,
                previous: Some(ParentSlot {
                    parent_id: new_parent_id.clone(),
                    index: *index,
                }),
            }
        }

        OpKind::ObjectVisibility {
            object_id,
            visible,
            previous,
        } => OpKind::ObjectVisibility {
            object_id: object_id.clone(),
            visible: (*previous)?,
            previous: Some(*visible),
        },

        OpKind::ObjectLock {
            object_id,
            locked,
            previous,
        } => OpKind::ObjectLock {
            object_id: object_id.clone(),
            locked: (*previous)?,
            previous: Some(*locked),
        },

        OpKind::SceneUpdate {
            scene_id,
            changes,
            previous,
        } => OpKind::SceneUpdate {
            scene_id: scene_id.clone(),
            changes: previous.clone()?,
            previous: Some(changes.clone()),
        },

        OpKind::SceneCreate {
            scene,
            index,
            contents,
        } => OpKind::SceneDelete {
            scene_id: scene.id.clone(),
            previous: Some(DeletedScene {
                scene: scene.clone(),
                index: *index,
                contents: contents.clone(),
            }),
        },

        OpKind::SceneDelete { previous, .. } => {
            let deleted = previous.clone()?;
            OpKind::SceneCreate {
                scene: deleted.scene,
                index: deleted.index,
                contents: deleted.contents,
            }
        }

        OpKind::TimelineUpdate {
            scene_id,
            changes,
            previous,
        } => OpKind::TimelineUpdate {
            scene_id: scene_id.clone(),
            changes: previous.clone()?,
            previous: Some(changes.clone()),
        },

        OpKind::TrackCreate {
            track,
            index,
            keyframes,
        } => OpKind::TrackDelete {
            track_id: track.id.clone(),
            previous: Some(DeletedTrack {
                track: track.clone(),
                index: *index,
                keyframes: keyframes.clone(),
            }),
        },

        OpKind::TrackDelete { previous, .. } => {
            let deleted = previous.clone()?;
            OpKind::TrackCreate {
                track: deleted.track,
                index: deleted.index,
                keyframes: deleted.keyframes,
            }
        }

        OpKind::KeyframeAdd { keyframe, replaced } => match replaced {
            // Folded add: restore the overwritten value and easing
            Some(existing) => OpKind::KeyframeUpdate {
                keyframe_id: existing.id.clone(),
                changes: KeyframePatch {
                    frame: None,
                    value: Some(existing.value.clone()),
                    easing: Some(existing.easing.clone()),
                },
                previous: Some(KeyframePatch {
                    frame: None,
                    value: Some(keyframe.value.clone()),
                    easing: Some(keyframe.easing.clone()),
                }),
            },
            None => OpKind::KeyframeDelete {
                keyframe_id: keyframe.id.clone(),
                previous: Some(keyframe.clone()),
            },
        },

        OpKind::KeyframeUpdate {
            keyframe_id,
            changes,
            previous,
        } => OpKind::KeyframeUpdate {
            keyframe_id: keyframe_id.clone(),
            changes: previous.clone()?,
            previous: Some(changes.clone()),
        },

        OpKind::KeyframeDelete { previous, .. } => OpKind::KeyframeAdd {
            keyframe: previous.clone()?,
            replaced: None,
        },

        OpKind::ProjectRename { name, previous } => OpKind::ProjectRename {
            name: previous.clone()?,
            previous: Some(name.clone()),
        },
    };

    Some(inverse)
}
