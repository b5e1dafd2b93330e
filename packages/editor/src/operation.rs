//! # Operation Taxonomy
//!
//! The closed set of edits a client can make to a document.
//!
//! ## Shape of an operation
//!
//! Every operation carries identity metadata (`id`, `timestamp`,
//! `clientSequence`) and one [`OpKind`]. Each kind has:
//!
//! - a forward payload, enough to apply it
//! - an optional `previous` field, filled by [`crate::capture`] from the
//!   document just before the edit is applied
//! - an inverse source: create kinds invert from their own payload, every
//!   in-place mutation inverts from `previous`
//!
//! Adding a kind means adding a variant here plus one arm in each of
//! `capture`, `applier` and `inverse`. None of those matches has a wildcard
//! arm, so a missing case is a compile error.

use serde::{Deserialize, Serialize};
use vectra_model::{
    Keyframe, KeyframeId, KeyframePatch, ObjectId, Scene, SceneId, SceneObject, ScenePatch,
    StylePatch, TimelinePatch, Track, TrackId, TransformPatch,
};

pub type OperationId = String;

/// A typed, identified document mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: OperationId,
    /// Client wall clock at dispatch, milliseconds since epoch
    pub timestamp: i64,
    /// Local ordering only; the server assigns the authoritative sequence
    pub client_sequence: u64,
    #[serde(flatten)]
    pub kind: OpKind,
}

/// Where an inverse comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseSource {
    /// Derived from the forward payload (create kinds)
    Payload,
    /// Needs the captured `previous` state
    Previous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum OpKind {
    #[serde(rename = "object.transform", rename_all = "camelCase")]
    ObjectTransform {
        object_id: ObjectId,
        transform: TransformPatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<TransformPatch>,
    },

    #[serde(rename = "object.style", rename_all = "camelCase")]
    ObjectStyle {
        object_id: ObjectId,
        style: StylePatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<StylePatch>,
    },

    /// Insert an object (and any descendants it carries) under `parent_id`
    #[serde(rename = "object.create", rename_all = "camelCase")]
    ObjectCreate {
        parent_id: ObjectId,
        /// Position in the parent's child list; `None` appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        subtree: ObjectSubtree,
    },

    #[serde(rename = "object.delete", rename_all = "camelCase")]
    ObjectDelete {
        object_id: ObjectId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<DeletedObject>,
    },

    #[serde(rename = "object.reparent", rename_all = "camelCase")]
    ObjectReparent {
        object_id: ObjectId,
        new_parent_id: ObjectId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<ParentSlot>,
    },

    #[serde(rename = "object.visibility", rename_all = "camelCase")]
    ObjectVisibility {
        object_id: ObjectId,
        visible: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<bool>,
    },

    #[serde(rename = "object.lock", rename_all = "camelCase")]
    ObjectLock {
        object_id: ObjectId,
        locked: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<bool>,
    },

    #[serde(rename = "scene.update", rename_all = "camelCase")]
    SceneUpdate {
        scene_id: SceneId,
        changes: ScenePatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<ScenePatch>,
    },

    #[serde(rename = "scene.create", rename_all = "camelCase")]
    SceneCreate {
        scene: Scene,
        /// Position in the scene order; `None` appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        /// Objects, tracks and keyframes owned by the scene. A missing root
        /// group is synthesized on apply.
        #[serde(default)]
        contents: ObjectSubtree,
    },

    #[serde(rename = "scene.delete", rename_all = "camelCase")]
    SceneDelete {
        scene_id: SceneId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<DeletedScene>,
    },

    #[serde(rename = "timeline.update", rename_all = "camelCase")]
    TimelineUpdate {
        scene_id: SceneId,
        changes: TimelinePatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<TimelinePatch>,
    },

    #[serde(rename = "track.create", rename_all = "camelCase")]
    TrackCreate {
        track: Track,
        /// Position in the timeline's track list; `None` appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keyframes: Vec<Keyframe>,
    },

    #[serde(rename = "track.delete", rename_all = "camelCase")]
    TrackDelete {
        track_id: TrackId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<DeletedTrack>,
    },

    /// Insert a keyframe; lands on an existing keyframe at the same frame as
    /// an update of its value and easing
    #[serde(rename = "keyframe.add", rename_all = "camelCase")]
    KeyframeAdd {
        keyframe: Keyframe,
        /// The same-frame keyframe the add was folded into, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replaced: Option<Keyframe>,
    },

    #[serde(rename = "keyframe.update", rename_all = "camelCase")]
    KeyframeUpdate {
        keyframe_id: KeyframeId,
        changes: KeyframePatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<KeyframePatch>,
    },

    #[serde(rename = "keyframe.delete", rename_all = "camelCase")]
    KeyframeDelete {
        keyframe_id: KeyframeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<Keyframe>,
    },

    #[serde(rename = "project.rename", rename_all = "camelCase")]
    ProjectRename {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<String>,
    },
}

/// Objects in pre-order (root first) with the tracks and keyframes animating them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSubtree {
    pub objects: Vec<SceneObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<SlottedTrack>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
}

impl ObjectSubtree {
    /// A lone object with no descendants
    pub fn single(object: SceneObject) -> Self {
        Self {
            objects: vec![object],
            tracks: Vec::new(),
            keyframes: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&SceneObject> {
        self.objects.first()
    }
}

/// A track plus its position in the scene timeline's track list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlottedTrack {
    pub index: usize,
    pub track: Track,
}

/// Everything needed to put a deleted object back where it was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedObject {
    pub subtree: ObjectSubtree,
    pub parent_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Parent and sibling position of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSlot {
    pub parent_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedScene {
    pub scene: Scene,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub contents: ObjectSubtree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTrack {
    pub track: Track,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl OpKind {
    /// Wire name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::ObjectTransform { .. } => "object.transform",
            OpKind::ObjectStyle { .. } => "object.style",
            OpKind::ObjectCreate { .. } => "object.create",
            OpKind::ObjectDelete { .. } => "object.delete",
            OpKind::ObjectReparent { .. } => "object.reparent",
            OpKind::ObjectVisibility { .. } => "object.visibility",
            OpKind::ObjectLock { .. } => "object.lock",
            OpKind::SceneUpdate { .. } => "scene.update",
            OpKind::SceneCreate { .. } => "scene.create",
            OpKind::SceneDelete { .. } => "scene.delete",
            OpKind::TimelineUpdate { .. } => "timeline.update",
            OpKind::TrackCreate { .. } => "track.create",
            OpKind::TrackDelete { .. } => "track.delete",
            OpKind::KeyframeAdd { .. } => "keyframe.add",
            OpKind::KeyframeUpdate { .. } => "keyframe.update",
            OpKind::KeyframeDelete { .. } => "keyframe.delete",
            OpKind::ProjectRename { .. } => "project.rename",
        }
    }

    pub fn inverse_source(&self) -> InverseSource {
        match self {
            OpKind::ObjectCreate { .. }
            | OpKind::SceneCreate { .. }
            | OpKind::TrackCreate { .. }
            | OpKind::KeyframeAdd { .. } => InverseSource::Payload,

            OpKind::ObjectTransform { .. }
            | OpKind::ObjectStyle { .. }
            | OpKind::ObjectDelete { .. }
            | OpKind::ObjectReparent { .. }
            | OpKind::ObjectVisibility { .. }
            | OpKind::ObjectLock { .. }
            | OpKind::SceneUpdate { .. }
            | OpKind::SceneDelete { .. }
            | OpKind::TimelineUpdate { .. }
            | OpKind::TrackDelete { .. }
            | OpKind::KeyframeUpdate { .. }
            | OpKind::KeyframeDelete { .. }
            | OpKind::ProjectRename { .. } => InverseSource::Previous,
        }
    }

    /// True when `previous` has been captured
    pub fn has_previous(&self) -> bool {
        match self {
            OpKind::ObjectTransform { previous, .. } => previous.is_some(),
            OpKind::ObjectStyle { previous, .. } => previous.is_some(),
            OpKind::ObjectDelete { previous, .. } => previous.is_some(),
            OpKind::ObjectReparent { previous, .. } => previous.is_some(),
            OpKind::ObjectVisibility { previous, .. } => previous.is_some(),
            OpKind::ObjectLock { previous, .. } => previous.is_some(),
            OpKind::SceneUpdate { previous, .. } => previous.is_some(),
            OpKind::SceneDelete { previous, .. } => previous.is_some(),
            OpKind::TimelineUpdate { previous, .. } => previous.is_some(),
            OpKind::TrackDelete { previous, .. } => previous.is_some(),
            OpKind::KeyframeUpdate { previous, .. } => previous.is_some(),
            OpKind::KeyframeDelete { previous, .. } => previous.is_some(),
            OpKind::ProjectRename { previous, .. } => previous.is_some(),
            OpKind::KeyframeAdd { replaced, .. } => replaced.is_some(),
            OpKind::ObjectCreate { .. } | OpKind::SceneCreate { .. } | OpKind::TrackCreate { .. } => {
                false
            }
        }
    }

    /// True when an inverse can be built from what this kind carries
    pub fn is_invertible(&self) -> bool {
        match self.inverse_source() {
            InverseSource::Payload => true,
            InverseSource::Previous => self.has_previous(),
        }
    }

    /// Id of the entity this kind edits
    pub fn target_id(&self) -> &str {
        match self {
            OpKind::ObjectTransform { object_id, .. }
            | OpKind::ObjectStyle { object_id, .. }
            | OpKind::ObjectDelete { object_id, .. }
            | OpKind::ObjectReparent { object_id, .. }
            | OpKind::ObjectVisibility { object_id, .. }
            | OpKind::ObjectLock { object_id, .. } => object_id,
            OpKind::ObjectCreate { subtree, .. } => {
                subtree.root().map(|root| root.id.as_str()).unwrap_or("")
            }
            OpKind::SceneUpdate { scene_id, .. }
            | OpKind::SceneDelete { scene_id, .. }
            | OpKind::TimelineUpdate { scene_id, .. } => scene_id,
            OpKind::SceneCreate { scene, .. } => &scene.id,
            OpKind::TrackCreate { track, .. } => &track.id,
            OpKind::TrackDelete { track_id, .. } => track_id,
            OpKind::KeyframeAdd { keyframe, .. } => &keyframe.id,
            OpKind::KeyframeUpdate { keyframe_id, .. }
            | OpKind::KeyframeDelete { keyframe_id, .. } => keyframe_id,
            OpKind::ProjectRename { name, .. } => name,
        }
    }
}

impl Operation {
    pub fn new(id: impl Into<String>, timestamp: i64, client_sequence: u64, kind: OpKind) -> Self {
        Self {
            id: id.into(),
            timestamp,
            client_sequence,
            kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_invertible(&self) -> bool {
        self.kind.is_invertible()
    }

    /// Short label for logs and history menus, e.g. `object.transform rect-1`
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind.name(), self.kind.target_id())
    }
}
