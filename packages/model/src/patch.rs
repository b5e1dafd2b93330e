//! Partial field updates.
//!
//! A patch names a subset of a target's fields. Applying it overwrites exactly
//! those fields; `snapshot_of` reads the same subset back from a target, which
//! is how an edit records the values it is about to overwrite.

use crate::{Easing, KeyframeValue, Keyframe, Scene, Style, Timeline, Transform};
use serde::{Deserialize, Serialize};

macro_rules! field_patch {
    (
        $(#[$meta:meta])*
        $name:ident => $target:ty { $($field:ident : $ty:ty),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $name {
            /// True when no field is set
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }

            /// Overwrite the set fields of `target`
            pub fn apply_to(&self, target: &mut $target) {
                $(
                    if let Some(value) = &self.$field {
                        target.$field = value.clone();
                    }
                )*
            }

            /// Current values in `target` of the fields this patch sets
            pub fn snapshot_of(&self, target: &$target) -> Self {
                Self {
                    $($field: self.$field.as_ref().map(|_| target.$field.clone()),)*
                }
            }
        }
    };
}

field_patch! {
    /// Partial update of an object's transform
    TransformPatch => Transform {
        x: f64,
        y: f64,
        rotation: f64,
        scale_x: f64,
        scale_y: f64,
        anchor_x: f64,
        anchor_y: f64,
    }
}

field_patch! {
    /// Partial update of an object's style
    StylePatch => Style {
        fill: String,
        stroke: String,
        stroke_width: f64,
        opacity: f64,
        corner_radius: f64,
    }
}

field_patch! {
    ScenePatch => Scene {
        name: String,
        background: String,
    }
}

field_patch! {
    /// Timeline settings; the track list is edited through track operations
    TimelinePatch => Timeline {
        duration: u32,
        frame_rate: f64,
        looping: bool,
    }
}

field_patch! {
    KeyframePatch => Keyframe {
        frame: u32,
        value: KeyframeValue,
        easing: Easing,
    }
}

impl KeyframePatch {
    /// True when applying this patch can reorder the owning track
    pub fn moves_frame(&self) -> bool {
        self.frame.is_some()
    }
}
