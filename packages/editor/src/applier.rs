//! # Document Applier
//!
//! Applies one operation, forward, to a document.
//!
//! ## Semantics
//!
//! ### Field updates (transform, style, visibility, lock, scene, timeline, keyframe, project)
//! - Merge the named fields; everything else is untouched
//! - Last write wins per field under concurrent edits
//! - No-op if the target is gone
//!
//! ### Create (object, scene, track, keyframe)
//! - Duplicate id is a no-op, so replaying a create is harmless
//! - Missing parent/owner is a no-op
//! - Index is clamped; `None` appends
//!
//! ### Delete
//! - Removes the entity with everything it owns
//! - Missing id is a no-op
//!
//! ### Reparent
//! - No-op if it would create a cycle or cross scenes
//!
//! Keyframe lists stay sorted ascending by frame.

use crate::operation::{ObjectSubtree, OpKind, Operation, SlottedTrack};
use std::collections::BTreeSet;
use vectra_model::{Document, Keyframe, Scene, SceneObject, Track};

/// Next document after applying `op`; `doc` itself is left as is
pub fn apply(doc: &Document, op: &Operation) -> Document {
    let mut next = doc.clone();
    apply_in_place(&mut next, op);
    next
}

/// Apply `op` to `doc`. Returns false when the operation was a no-op.
pub fn apply_in_place(doc: &mut Document, op: &Operation) -> bool {
    match &op.kind {
        OpKind::ObjectTransform {
            object_id,
            transform,
            ..
        } => match doc.objects.get_mut(object_id) {
            Some(object) => {
                transform.apply_to(&mut object.transform);
                true
            }
            None => false,
        },

        OpKind::ObjectStyle {
            object_id, style, ..
        } => match doc.objects.get_mut(object_id) {
            Some(object) => {
                style.apply_to(&mut object.style);
                true
            }
            None => false,
        },

        OpKind::ObjectCreate {
            parent_id,
            index,
            subtree,
        } => insert_subtree(doc, parent_id, *index, subtree),

        OpKind::ObjectDelete { object_id, .. } => remove_object(doc, object_id),

        OpKind::ObjectReparent {
            object_id,
            new_parent_id,
            index,
            ..
        } => reparent(doc, object_id, new_parent_id, *index),

        OpKind::ObjectVisibility {
            object_id, visible, ..
        } => match doc.objects.get_mut(object_id) {
            Some(object) => {
                object.visible = *visible;
                true
            }
            None => false,
        },

        OpKind::ObjectLock {
            object_id, locked, ..
        } => match doc.objects.get_mut(object_id) {
            Some(object) => {
                object.locked = *locked;
                true
            }
            None => false,
        },

        OpKind::SceneUpdate {
            scene_id, changes, ..
        } => match doc.scenes.get_mut(scene_id) {
            Some(scene) => {
                changes.apply_to(scene);
                true
            }
            None => false,
        },

        OpKind::SceneCreate {
            scene,
            index,
            contents,
        } => insert_scene(doc, scene, *index, contents),

        OpKind::SceneDelete { scene_id, .. } => remove_scene(doc, scene_id),

        OpKind::TimelineUpdate {
            scene_id, changes, ..
        } => match doc.scenes.get_mut(scene_id) {
            Some(scene) => {
                changes.apply_to(&mut scene.timeline);
                true
            }
            None => false,
        },

        OpKind::TrackCreate {
            track,
            index,
            keyframes,
        } => insert_track(doc, track, *index, keyframes),

        OpKind::TrackDelete { track_id, .. } => remove_track(doc, track_id),

        OpKind::KeyframeAdd { keyframe, .. } => add_keyframe(doc, keyframe),

        OpKind::KeyframeUpdate {
            keyframe_id,
            changes,
            ..
        } => {
            let Some(keyframe) = doc.keyframes.get_mut(keyframe_id) else {
                return false;
            };
            changes.apply_to(keyframe);
            if changes.moves_frame() {
                let track_id = keyframe.track_id.clone();
                sort_track(doc, &track_id);
            }
            true
        }

        OpKind::KeyframeDelete { keyframe_id, .. } => remove_keyframe(doc, keyframe_id),

        OpKind::ProjectRename { name, .. } => {
            doc.project.name = name.clone();
            true
        }
    }
}

fn insert_at<T>(list: &mut Vec<T>, index: Option<usize>, value: T) {
    let at = index.map_or(list.len(), |i| i.min(list.len()));
    list.insert(at, value);
}

fn insert_subtree(
    doc: &mut Document,
    parent_id: &str,
    index: Option<usize>,
    subtree: &ObjectSubtree,
) -> bool {
    let Some(root) = subtree.root() else {
        return false;
    };
    if subtree.objects.iter().any(|o| doc.objects.contains_key(&o.id)) {
        return false;
    }
    let Some(parent) = doc.objects.get_mut(parent_id) else {
        return false;
    };

    let scene_id = parent.scene_id.clone();
    insert_at(&mut parent.children, index, root.id.clone());

    for (position, object) in subtree.objects.iter().enumerate() {
        let mut object = object.clone();
        object.scene_id = scene_id.clone();
        if position == 0 {
            object.parent_id = Some(parent_id.to_string());
        }
        doc.objects.insert(object.id.clone(), object);
    }
    restore_tracks(doc, &subtree.tracks, &subtree.keyframes);
    true
}

/// Reinsert tracks at their recorded timeline slots, lowest slot first
fn restore_tracks(doc: &mut Document, tracks: &[SlottedTrack], keyframes: &[Keyframe]) {
    let mut ordered: Vec<&SlottedTrack> = tracks.iter().collect();
    ordered.sort_by_key(|slotted| slotted.index);

    for slotted in ordered {
        let track = &slotted.track;
        if let Some(scene) = doc.scenes.get_mut(&track.scene_id) {
            if !scene.timeline.track_ids.contains(&track.id) {
                insert_at(
                    &mut scene.timeline.track_ids,
                    Some(slotted.index),
                    track.id.clone(),
                );
            }
        }
        doc.tracks.insert(track.id.clone(), track.clone());
    }
    for keyframe in keyframes {
        doc.keyframes.insert(keyframe.id.clone(), keyframe.clone());
    }
}

fn remove_object(doc: &mut Document, object_id: &str) -> bool {
    let Some(parent_id) = doc.object(object_id).and_then(|o| o.parent_id.clone()) else {
        return false;
    };

    if let Some(parent) = doc.objects.get_mut(&parent_id) {
        parent.children.retain(|child| child != object_id);
    }

    let removed: BTreeSet<String> = doc.subtree_ids(object_id).into_iter().collect();
    for id in &removed {
        doc.objects.remove(id);
    }

    let orphaned: Vec<String> = doc
        .tracks
        .values()
        .filter(|track| removed.contains(&track.object_id))
        .map(|track| track.id.clone())
        .collect();
    for track_id in orphaned {
        remove_track(doc, &track_id);
    }
    true
}

fn reparent(
    doc: &mut Document,
    object_id: &str,
    new_parent_id: &str,
    index: Option<usize>,
) -> bool {
    let (Some(object), Some(new_parent)) = (doc.object(object_id), doc.object(new_parent_id))
    else {
        return false;
    };
    let Some(old_parent_id) = object.parent_id.clone() else {
        return false;
    };
    if object.scene_id != new_parent.scene_id || doc.is_ancestor(object_id, new_parent_id) {
        return false;
    }

    if let Some(old_parent) = doc.objects.get_mut(&old_parent_id) {
        old_parent.children.retain(|child| child != object_id);
    }
    if let Some(new_parent) = doc.objects.get_mut(new_parent_id) {
        insert_at(&mut new_parent.children, index, object_id.to_string());
    }
    if let Some(object) = doc.objects.get_mut(object_id) {
        object.parent_id = Some(new_parent_id.to_string());
    }
    true
}

fn insert_scene(
    doc: &mut Document,
    scene: &Scene,
    index: Option<usize>,
    contents: &ObjectSubtree,
) -> bool {
    if doc.scenes.contains_key(&scene.id) {
        return false;
    }

    doc.scenes.insert(scene.id.clone(), scene.clone());
    insert_at(&mut doc.scene_order, index, scene.id.clone());

    for object in &contents.objects {
        doc.objects
            .entry(object.id.clone())
            .or_insert_with(|| object.clone());
    }
    if !doc.objects.contains_key(&scene.root_object_id) {
        doc.objects.insert(
            scene.root_object_id.clone(),
            SceneObject::group(scene.root_object_id.clone(), scene.id.clone()),
        );
    }
    restore_tracks(doc, &contents.tracks, &contents.keyframes);
    true
}

fn remove_scene(doc: &mut Document, scene_id: &str) -> bool {
    let Some(scene) = doc.scenes.remove(scene_id) else {
        return false;
    };
    doc.scene_order.retain(|id| id != scene_id);

    for id in doc.subtree_ids(&scene.root_object_id) {
        doc.objects.remove(&id);
    }
    for track_id in &scene.timeline.track_ids {
        if let Some(track) = doc.tracks.remove(track_id) {
            for keyframe_id in &track.keyframe_ids {
                doc.keyframes.remove(keyframe_id);
            }
        }
    }
    true
}

fn insert_track(
    doc: &mut Document,
    track: &Track,
    index: Option<usize>,
    keyframes: &[Keyframe],
) -> bool {
    if doc.tracks.contains_key(&track.id) || !doc.objects.contains_key(&track.object_id) {
        return false;
    }
    let Some(scene) = doc.scenes.get_mut(&track.scene_id) else {
        return false;
    };
    insert_at(&mut scene.timeline.track_ids, index, track.id.clone());

    let mut track = track.clone();
    for keyframe in keyframes {
        let mut keyframe = keyframe.clone();
        keyframe.track_id = track.id.clone();
        if !track.keyframe_ids.contains(&keyframe.id) {
            track.keyframe_ids.push(keyframe.id.clone());
        }
        doc.keyframes.insert(keyframe.id.clone(), keyframe);
    }
    let track_id = track.id.clone();
    doc.tracks.insert(track_id.clone(), track);
    sort_track(doc, &track_id);
    true
}

fn remove_track(doc: &mut Document, track_id: &str) -> bool {
    let Some(track) = doc.tracks.remove(track_id) else {
        return false;
    };
    if let Some(scene) = doc.scenes.get_mut(&track.scene_id) {
        scene.timeline.track_ids.retain(|id| id != track_id);
    }
    for keyframe_id in &track.keyframe_ids {
        doc.keyframes.remove(keyframe_id);
    }
    true
}

fn add_keyframe(doc: &mut Document, keyframe: &Keyframe) -> bool {
    if doc.keyframes.contains_key(&keyframe.id) || !doc.tracks.contains_key(&keyframe.track_id) {
        return false;
    }

    // Same frame already keyed: fold into an update of the existing key
    if let Some(existing_id) = doc
        .keyframe_at(&keyframe.track_id, keyframe.frame)
        .map(|existing| existing.id.clone())
    {
        if let Some(existing) = doc.keyframes.get_mut(&existing_id) {
            existing.value = keyframe.value.clone();
            existing.easing = keyframe.easing.clone();
        }
        return true;
    }

    doc.keyframes.insert(keyframe.id.clone(), keyframe.clone());
    if let Some(track) = doc.tracks.get_mut(&keyframe.track_id) {
        track.keyframe_ids.push(keyframe.id.clone());
    }
    sort_track(doc, &keyframe.track_id);
    true
}

fn remove_keyframe(doc: &mut Document, keyframe_id: &str) -> bool {
    let Some(keyframe) = doc.keyframes.remove(keyframe_id) else {
        return false;
    };
    if let Some(track) = doc.tracks.get_mut(&keyframe.track_id) {
        track.keyframe_ids.retain(|id| id != keyframe_id);
    }
    true
}

/// Stable sort of a track's key list by frame
fn sort_track(doc: &mut Document, track_id: &str) {
    let Document {
        tracks, keyframes, ..
    } = doc;
    if let Some(track) = tracks.get_mut(track_id) {
        track
            .keyframe_ids
            .sort_by_key(|id| keyframes.get(id).map_or(u32::MAX, |k| k.frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_model::{Easing, KeyframeValue, Shape, TransformPatch};

    fn op(kind: OpKind) -> Operation {
        Operation::new("op-1", 0, 1, kind)
    }

    fn keyframe(id: &str, frame: u32, value: f64) -> Keyframe {
        Keyframe {
            id: id.to_string(),
            track_id: "t1".to_string(),
            frame,
            value: KeyframeValue::Number(value),
            easing: Easing::Linear,
        }
    }

    fn doc() -> Document {
        let mut doc = Document::new("p1", "Demo");
        let root = doc.add_scene("s1", "Intro");
        doc.add_object(
            SceneObject::new("c1", "s1", Shape::Ellipse { rx: 1.0, ry: 1.0 }).with_parent(root),
        );
        doc.add_track(Track {
            id: "t1".to_string(),
            scene_id: "s1".to_string(),
            object_id: "c1".to_string(),
            property: "transform.x".to_string(),
            keyframe_ids: vec!["k0".to_string(), "k20".to_string()],
        });
        doc.keyframes.insert("k0".to_string(), keyframe("k0", 0, 0.0));
        doc.keyframes.insert("k20".to_string(), keyframe("k20", 20, 100.0));
        doc
    }

    #[test]
    fn test_transform_leaves_input_untouched() {
        let before = doc();
        let after = apply(
            &before,
            &op(OpKind::ObjectTransform {
                object_id: "c1".to_string(),
                transform: TransformPatch {
                    x: Some(5.0),
                    ..Default::default()
                },
                previous: None,
            }),
        );

        assert_eq!(before.objects["c1"].transform.x, 0.0);
        assert_eq!(after.objects["c1"].transform.x, 5.0);
        assert_eq!(after.tracks, before.tracks);
    }

    #[test]
    fn test_keyframe_add_keeps_frames_sorted() {
        let mut doc = doc();
        assert!(apply_in_place(
            &mut doc,
            &op(OpKind::KeyframeAdd {
                keyframe: keyframe("k10", 10, 50.0),
                replaced: None,
            }),
        ));
        assert_eq!(doc.track_frames("t1"), vec![0, 10, 20]);
    }

    #[test]
    fn test_keyframe_add_on_same_frame_folds() {
        let mut doc = doc();
        apply_in_place(
            &mut doc,
            &op(OpKind::KeyframeAdd {
                keyframe: keyframe("k20b", 20, 7.0),
                replaced: None,
            }),
        );
        assert_eq!(doc.track_frames("t1"), vec![0, 20]);
        assert!(doc.keyframe("k20b").is_none());
        assert_eq!(doc.keyframes["k20"].value, KeyframeValue::Number(7.0));
    }

    #[test]
    fn test_reparent_refuses_cycles() {
        let mut doc = doc();
        doc.add_object(SceneObject::group("g1", "s1").with_parent("c1"));
        let changed = apply_in_place(
            &mut doc,
            &op(OpKind::ObjectReparent {
                object_id: "c1".to_string(),
                new_parent_id: "g1".to_string(),
                index: None,
                previous: None,
            }),
        );
        assert!(!changed);
        assert_eq!(doc.objects["g1"].parent_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_delete_object_drops_its_tracks() {
        let mut doc = doc();
        apply_in_place(
            &mut doc,
            &op(OpKind::ObjectDelete {
                object_id: "c1".to_string(),
                previous: None,
            }),
        );
        assert!(doc.object("c1").is_none());
        assert!(doc.tracks.is_empty());
        assert!(doc.keyframes.is_empty());
        assert!(doc.scenes["s1"].timeline.track_ids.is_empty());
        assert!(doc.objects["s1-root"].children.is_empty());
    }

    #[test]
    fn test_scene_create_synthesizes_root() {
        let mut doc = doc();
        let scene = Scene {
            id: "s2".to_string(),
            name: "Outro".to_string(),
            background: "#000000".to_string(),
            root_object_id: "s2-root".to_string(),
            timeline: Default::default(),
        };
        apply_in_place(
            &mut doc,
            &op(OpKind::SceneCreate {
                scene,
                index: Some(0),
                contents: ObjectSubtree::default(),
            }),
        );
        assert_eq!(doc.scene_order, vec!["s2", "s1"]);
        assert!(doc.objects["s2-root"].is_scene_root());
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let mut doc = doc();
        let before = doc.clone();
        assert!(!apply_in_place(
            &mut doc,
            &op(OpKind::KeyframeDelete {
                keyframe_id: "nope".to_string(),
                previous: None,
            }),
        ));
        assert!(!apply_in_place(
            &mut doc,
            &op(OpKind::SceneDelete {
                scene_id: "nope".to_string(),
                previous: None,
            }),
        ));
        assert_eq!(doc, before);
    }
}
