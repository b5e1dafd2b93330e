use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ProjectId = String;
pub type SceneId = String;
pub type ObjectId = String;
pub type TrackId = String;
pub type KeyframeId = String;

/// Root document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub project: Project,
    #[serde(default)]
    pub scenes: BTreeMap<SceneId, Scene>,
    #[serde(default)]
    pub scene_order: Vec<SceneId>,
    #[serde(default)]
    pub objects: BTreeMap<ObjectId, SceneObject>,
    #[serde(default)]
    pub tracks: BTreeMap<TrackId, Track>,
    #[serde(default)]
    pub keyframes: BTreeMap<KeyframeId, Keyframe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

/// A scene owns one root group and a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    #[serde(default = "default_background")]
    pub background: String,
    pub root_object_id: ObjectId,
    #[serde(default)]
    pub timeline: Timeline,
}

fn default_background() -> String {
    "#ffffff".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Length in frames
    pub duration: u32,
    pub frame_rate: f64,
    pub looping: bool,
    /// Owning collection of the scene's tracks
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            duration: 120,
            frame_rate: 24.0,
            looping: false,
            track_ids: Vec::new(),
        }
    }
}

/// Drawable node in a scene's object tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub scene_id: SceneId,
    /// `None` only for a scene's root group
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub children: Vec<ObjectId>,
    pub shape: Shape,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

impl SceneObject {
    /// Group node with identity transform and default style
    pub fn group(id: impl Into<String>, scene_id: impl Into<String>) -> Self {
        Self::new(id, scene_id, Shape::Group)
    }

    pub fn new(id: impl Into<String>, scene_id: impl Into<String>, shape: Shape) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            scene_id: scene_id.into(),
            parent_id: None,
            children: Vec::new(),
            shape,
            transform: Transform::default(),
            style: Style::default(),
            visible: true,
            locked: false,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_scene_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Geometry of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Group,
    Rectangle { width: f64, height: f64 },
    Ellipse { rx: f64, ry: f64 },
    Path { d: String },
    #[serde(rename_all = "camelCase")]
    Text { content: String, font_size: f64 },
    Image { src: String, width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor_x: 0.5,
            anchor_y: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// CSS color, or "none"
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub corner_radius: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: "#cccccc".to_string(),
            stroke: "none".to_string(),
            stroke_width: 0.0,
            opacity: 1.0,
            corner_radius: 0.0,
        }
    }
}

/// Animated property channel of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub scene_id: SceneId,
    pub object_id: ObjectId,
    /// Animated property path, e.g. "transform.x"
    pub property: String,
    /// Sorted ascending by keyframe frame
    #[serde(default)]
    pub keyframe_ids: Vec<KeyframeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub id: KeyframeId,
    pub track_id: TrackId,
    pub frame: u32,
    pub value: KeyframeValue,
    #[serde(default)]
    pub easing: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Number(f64),
    Point { x: f64, y: f64 },
    Color(String),
}

/// Easing toward the next keyframe. Stored verbatim; interpolation happens downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Step,
    CubicBezier([f64; 4]),
}

impl Document {
    /// Empty document with no scenes
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: Project {
                id: project_id.into(),
                name: name.into(),
            },
            scenes: BTreeMap::new(),
            scene_order: Vec::new(),
            objects: BTreeMap::new(),
            tracks: BTreeMap::new(),
            keyframes: BTreeMap::new(),
        }
    }

    /// Append a scene together with a fresh root group
    pub fn add_scene(&mut self, scene_id: &str, name: &str) -> ObjectId {
        let root_id = format!("{}-root", scene_id);
        self.scenes.insert(
            scene_id.to_string(),
            Scene {
                id: scene_id.to_string(),
                name: name.to_string(),
                background: default_background(),
                root_object_id: root_id.clone(),
                timeline: Timeline::default(),
            },
        );
        self.scene_order.push(scene_id.to_string());
        self.objects
            .insert(root_id.clone(), SceneObject::group(root_id.clone(), scene_id));
        root_id
    }

    /// Insert an object and append it to its parent's child list
    pub fn add_object(&mut self, object: SceneObject) {
        if let Some(parent) = object
            .parent_id
            .as_ref()
            .and_then(|parent_id| self.objects.get_mut(parent_id))
        {
            parent.children.push(object.id.clone());
        }
        self.objects.insert(object.id.clone(), object);
    }

    /// Add an empty track to its scene's timeline
    pub fn add_track(&mut self, track: Track) {
        if let Some(scene) = self.scenes.get_mut(&track.scene_id) {
            scene.timeline.track_ids.push(track.id.clone());
        }
        self.tracks.insert(track.id.clone(), track);
    }

    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn keyframe(&self, id: &str) -> Option<&Keyframe> {
        self.keyframes.get(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Ids of `root` and all of its descendants, pre-order
    pub fn subtree_ids(&self, root: &str) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get(&id) {
                stack.extend(object.children.iter().rev().cloned());
                ids.push(id);
            }
        }
        ids
    }

    /// Position of an object within its parent's child list
    pub fn child_index(&self, id: &str) -> Option<usize> {
        let parent_id = self.objects.get(id)?.parent_id.as_ref()?;
        self.objects
            .get(parent_id)?
            .children
            .iter()
            .position(|child| child == id)
    }

    /// True when `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: &str, node: &str) -> bool {
        let mut current = Some(node.to_string());
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.objects.get(&id).and_then(|o| o.parent_id.clone());
        }
        false
    }

    /// Keyframe of `track_id` sitting exactly on `frame`
    pub fn keyframe_at(&self, track_id: &str, frame: u32) -> Option<&Keyframe> {
        let track = self.tracks.get(track_id)?;
        track
            .keyframe_ids
            .iter()
            .filter_map(|id| self.keyframes.get(id))
            .find(|keyframe| keyframe.frame == frame)
    }

    /// Frames of a track in key-list order
    pub fn track_frames(&self, track_id: &str) -> Vec<u32> {
        self.tracks
            .get(track_id)
            .map(|track| {
                track
                    .keyframe_ids
                    .iter()
                    .filter_map(|id| self.keyframes.get(id))
                    .map(|keyframe| keyframe.frame)
                    .collect()
            })
            .unwrap_or_default()
    }
}
