//! # Vectra Document Model
//!
//! Plain data types for a vector/animation document: one project, an ordered
//! list of scenes, and normalized tables of objects, tracks and keyframes.
//!
//! ```text
//! Document
//!  ├─ project
//!  ├─ scenes ── Scene ── timeline.track_ids ──┐
//!  ├─ objects ── SceneObject (tree via parent_id / children)
//!  ├─ tracks ─── Track ── keyframe_ids (sorted by frame)
//!  └─ keyframes
//! ```
//!
//! The model knows nothing about editing history. Mutation semantics live in
//! `vectra-editor`.

mod document;
mod patch;

pub use document::*;
pub use patch::*;
