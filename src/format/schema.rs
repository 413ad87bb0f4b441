//! On-disk document records.
//!
//! These types mirror the JSON file format one-to-one and carry no editing
//! behavior. Field declaration order is the order keys are written in, so it
//! must stay fixed for saves to be byte-stable.
//!
//! ```json
//! {
//!   "animation": [{ "id": "walk", "duration": 24, "spriteLayers": [...], ... }],
//!   "atlas": [{ "id": "hero", "path": "img/hero.png", "sprites": [...] }],
//!   "event": [{ "id": "footstep", "hasLocation": true, "params": [...] }],
//!   "metadata": [{ "id": "speed", "type": "number", "default": 1 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete sprite animation file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    /// Animations defined in this file.
    #[serde(default)]
    pub animation: Vec<AnimationEntry>,

    /// Atlases referenced by the animations.
    #[serde(default)]
    pub atlas: Vec<AtlasEntry>,

    /// Events that animations may trigger.
    #[serde(default)]
    pub event: Vec<EventInfoEntry>,

    /// Properties that may appear in an animation's metadata timeline.
    #[serde(default)]
    pub metadata: Vec<MetaPropEntry>,
}

impl DocumentData {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of sprites across all atlases.
    pub fn total_sprites(&self) -> usize {
        self.atlas.iter().map(|a| a.sprites.len()).sum()
    }
}

/// A single animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationEntry {
    pub id: String,

    /// Length of the animation in frames.
    pub duration: i64,

    #[serde(default)]
    pub sprite_layers: Vec<SpriteLayerEntry>,

    #[serde(default)]
    pub rect_layers: Vec<RectLayerEntry>,

    /// Event timeline.
    #[serde(default)]
    pub events: Vec<EventEntry>,

    /// Metadata timeline.
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

impl AnimationEntry {
    /// Create an animation with no layers.
    pub fn new(id: impl Into<String>, duration: i64) -> Self {
        Self {
            id: id.into(),
            duration,
            sprite_layers: Vec::new(),
            rect_layers: Vec::new(),
            events: Vec::new(),
            metadata: Vec::new(),
        }
    }
}

/// A layer of sprite keyframes drawn from one atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteLayerEntry {
    pub atlas_id: String,
    pub frames: Vec<SpriteFrameEntry>,
}

/// One sprite keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteFrameEntry {
    pub time: i64,

    pub sprite_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
}

/// A layer of rectangle keyframes (hit boxes, anchors and similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectLayerEntry {
    pub id: i64,
    pub group_id: String,
    pub frames: Vec<RectFrameEntry>,
}

/// One rectangle keyframe. Absent coordinates keep the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectFrameEntry {
    pub time: i64,

    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

/// An event fired at a point in an animation's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    pub event_id: String,

    pub time: i64,

    pub params: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub x: i64,
    pub y: i64,
}

/// Metadata values that take effect at a point in an animation's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub time: i64,
    pub data: Map<String, Value>,
}

/// A named region of an atlas image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasEntry {
    pub id: String,

    /// Image path relative to the document's directory.
    pub path: String,

    #[serde(default)]
    pub sprites: Vec<SpriteEntry>,
}

impl AtlasEntry {
    /// Create an atlas with no sprites.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            sprites: Vec::new(),
        }
    }

    /// Add a sprite.
    pub fn with_sprite(mut self, sprite: SpriteEntry) -> Self {
        self.sprites.push(sprite);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl SpriteEntry {
    /// Create a sprite entry.
    pub fn new(id: impl Into<String>, x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// Declaration of an event animations may fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfoEntry {
    pub id: String,
    pub has_location: bool,
    pub params: Vec<ParamEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Declaration of a metadata property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaPropEntry {
    pub id: String,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Value type tag for event parameters and metadata properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Bool,
    BoolArray,
    BoolMap,
    Number,
    NumberArray,
    NumberMap,
    String,
    StringArray,
    StringMap,
}

impl ValueType {
    /// The tag string used in files.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::BoolArray => "bool-array",
            ValueType::BoolMap => "bool-map",
            ValueType::Number => "number",
            ValueType::NumberArray => "number-array",
            ValueType::NumberMap => "number-map",
            ValueType::String => "string",
            ValueType::StringArray => "string-array",
            ValueType::StringMap => "string-map",
        }
    }

    /// Get all value types.
    pub fn all() -> &'static [ValueType] {
        &[
            ValueType::Bool,
            ValueType::BoolArray,
            ValueType::BoolMap,
            ValueType::Number,
            ValueType::NumberArray,
            ValueType::NumberMap,
            ValueType::String,
            ValueType::StringArray,
            ValueType::StringMap,
        ]
    }
}
