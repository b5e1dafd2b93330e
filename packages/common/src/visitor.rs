use std::collections::BTreeSet;
use vectra_model::*;

/// Visitor pattern for traversing a document immutably
///
/// Default implementations walk scenes in order, then each scene's object
/// tree (pre-order) followed by its timeline tracks and their keyframes.
/// Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_scene(&mut self, doc: &Document, scene: &Scene) {
        walk_scene(self, doc, scene);
    }

    fn visit_object(&mut self, doc: &Document, object: &SceneObject) {
        walk_object(self, doc, object);
    }

    fn visit_track(&mut self, doc: &Document, track: &Track) {
        walk_track(self, doc, track);
    }

    fn visit_keyframe(&mut self, _keyframe: &Keyframe) {
        // Leaf node, no children to walk
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for scene in doc.scene_order.iter().filter_map(|id| doc.scenes.get(id)) {
        visitor.visit_scene(doc, scene);
    }
}

pub fn walk_scene<V: Visitor>(visitor: &mut V, doc: &Document, scene: &Scene) {
    if let Some(root) = doc.objects.get(&scene.root_object_id) {
        visitor.visit_object(doc, root);
    }
    for track in scene
        .timeline
        .track_ids
        .iter()
        .filter_map(|id| doc.tracks.get(id))
    {
        visitor.visit_track(doc, track);
    }
}

pub fn walk_object<V: Visitor>(visitor: &mut V, doc: &Document, object: &SceneObject) {
    for child in object.children.iter().filter_map(|id| doc.objects.get(id)) {
        visitor.visit_object(doc, child);
    }
}

pub fn walk_track<V: Visitor>(visitor: &mut V, doc: &Document, track: &Track) {
    for keyframe in track
        .keyframe_ids
        .iter()
        .filter_map(|id| doc.keyframes.get(id))
    {
        visitor.visit_keyframe(keyframe);
    }
}

/// Copies every record reachable from one object subtree or one scene:
/// objects in pre-order, the tracks animating those objects, and the
/// keyframes of those tracks.
#[derive(Debug, Default)]
pub struct SubtreeCollector {
    pub objects: Vec<SceneObject>,
    pub tracks: Vec<Track>,
    pub keyframes: Vec<Keyframe>,
}

impl SubtreeCollector {
    /// Collect the subtree rooted at `object_id`, with the tracks that animate it
    pub fn object(doc: &Document, object_id: &str) -> Option<Self> {
        let root = doc.objects.get(object_id)?;
        let mut collector = Self::default();
        collector.visit_object(doc, root);

        let members: BTreeSet<&str> = collector.objects.iter().map(|o| o.id.as_str()).collect();
        let tracks: Vec<&Track> = doc
            .scenes
            .get(&root.scene_id)
            .map(|scene| {
                scene
                    .timeline
                    .track_ids
                    .iter()
                    .filter_map(|id| doc.tracks.get(id))
                    .filter(|track| members.contains(track.object_id.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        for track in tracks {
            collector.visit_track(doc, track);
        }
        Some(collector)
    }

    /// Collect everything owned by a scene
    pub fn scene(doc: &Document, scene_id: &str) -> Option<Self> {
        let scene = doc.scenes.get(scene_id)?;
        let mut collector = Self::default();
        collector.visit_scene(doc, scene);
        Some(collector)
    }
}

impl Visitor for SubtreeCollector {
    fn visit_object(&mut self, doc: &Document, object: &SceneObject) {
        self.objects.push(object.clone());
        walk_object(self, doc, object);
    }

    fn visit_track(&mut self, doc: &Document, track: &Track) {
        self.tracks.push(track.clone());
        walk_track(self, doc, track);
    }

    fn visit_keyframe(&mut self, keyframe: &Keyframe) {
        self.keyframes.push(keyframe.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_animated_child() -> Document {
        let mut doc = Document::new("p1", "Demo");
        let root = doc.add_scene("s1", "Intro");
        doc.add_object(SceneObject::group("g1", "s1").with_parent(root.clone()));
        doc.add_object(
            SceneObject::new("e1", "s1", Shape::Ellipse { rx: 4.0, ry: 4.0 }).with_parent("g1"),
        );
        doc.add_object(SceneObject::group("g2", "s1").with_parent(root));
        doc.add_track(Track {
            id: "t1".to_string(),
            scene_id: "s1".to_string(),
            object_id: "e1".to_string(),
            property: "transform.x".to_string(),
            keyframe_ids: vec!["k1".to_string()],
        });
        doc.keyframes.insert(
            "k1".to_string(),
            Keyframe {
                id: "k1".to_string(),
                track_id: "t1".to_string(),
                frame: 0,
                value: KeyframeValue::Number(0.0),
                easing: Easing::Linear,
            },
        );
        doc
    }

    #[test]
    fn test_collect_object_subtree_with_tracks() {
        let doc = doc_with_animated_child();
        let collected = SubtreeCollector::object(&doc, "g1").unwrap();

        let ids: Vec<_> = collected.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "e1"]);
        assert_eq!(collected.tracks.len(), 1);
        assert_eq!(collected.keyframes.len(), 1);
    }

    #[test]
    fn test_collect_unrelated_subtree_has_no_tracks() {
        let doc = doc_with_animated_child();
        let collected = SubtreeCollector::object(&doc, "g2").unwrap();
        assert_eq!(collected.objects.len(), 1);
        assert!(collected.tracks.is_empty());
        assert!(SubtreeCollector::object(&doc, "nope").is_none());
    }

    #[test]
    fn test_collect_scene() {
        let doc = doc_with_animated_child();
        let collected = SubtreeCollector::scene(&doc, "s1").unwrap();
        assert_eq!(collected.objects.len(), 4);
        assert_eq!(collected.objects[0].id, "s1-root");
        assert_eq!(collected.tracks.len(), 1);
    }
}
