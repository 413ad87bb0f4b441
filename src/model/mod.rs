//! The editable document model.
//!
//! A [`Document`] owns atlases and animations; atlases own sprites and
//! animations own tracks. Every entity is registered on its document's
//! change bus, so a mutation anywhere is reported to listeners on the entity
//! and on each of its ancestors, in that order.

mod animation;
mod atlas;
mod children;
mod document;
mod keyframes;
mod signal;

pub use animation::{
    Animation, RectKey, RectTrack, SpriteKey, SpriteRef, SpriteTrack, Track, TrackData, TrackKind,
    TrackRecord,
};
pub use atlas::{Atlas, ImageState, Sprite, SpriteRect};
pub use children::{Children, Entity, Records};
pub use document::{DanglingReference, Document, ImageLoadReport};
pub use keyframes::{InsertOutcome, Keyframe, Keyframes};
pub use signal::{EntityId, EntityKind, ListenerId, Modified, Node};
