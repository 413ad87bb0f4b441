//! Animations and their keyframe tracks.

use crate::error::{EditorError, Result};
use crate::format::schema::{
    AnimationEntry, EventEntry, MetadataEntry, RectFrameEntry, RectLayerEntry, SpriteFrameEntry,
    SpriteLayerEntry,
};
use crate::model::children::{Children, Entity, Records};
use crate::model::keyframes::{InsertOutcome, Keyframes};
use crate::model::signal::{EntityKind, Node};

/// Sprite keyframe payload. Position and scale are optional overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteKey {
    pub sprite_id: String,
    pub pos_x: Option<i64>,
    pub pos_y: Option<i64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

impl SpriteKey {
    /// Show `sprite_id` with no position or scale override.
    pub fn new(sprite_id: impl Into<String>) -> Self {
        Self {
            sprite_id: sprite_id.into(),
            pos_x: None,
            pos_y: None,
            scale_x: None,
            scale_y: None,
        }
    }

    /// Set the position override.
    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.pos_x = Some(x);
        self.pos_y = Some(y);
        self
    }

    /// Set the scale override. Only finite scales can be keyed.
    pub fn scaled(mut self, x: f64, y: f64) -> Self {
        self.scale_x = Some(x);
        self.scale_y = Some(y);
        self
    }
}

/// Rectangle keyframe payload. Absent coordinates keep their previous value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RectKey {
    pub active: bool,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// A sprite named by atlas id and sprite id. May not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub atlas_id: String,
    pub sprite_id: String,
}

/// Keyframes showing sprites from one atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTrack {
    atlas_id: String,
    keys: Keyframes<SpriteKey>,
}

impl SpriteTrack {
    pub fn atlas_id(&self) -> &str {
        &self.atlas_id
    }

    pub fn keys(&self) -> &Keyframes<SpriteKey> {
        &self.keys
    }

    /// The sprite keyed exactly at `frame`.
    pub fn reference_at(&self, frame: i64) -> Option<SpriteRef> {
        self.keys.get(frame).map(|key| SpriteRef {
            atlas_id: self.atlas_id.clone(),
            sprite_id: key.sprite_id.clone(),
        })
    }

    /// Every sprite this track references, in frame order.
    pub fn references(&self) -> impl Iterator<Item = (i64, SpriteRef)> + '_ {
        self.keys.iter().map(|k| {
            (
                k.frame,
                SpriteRef {
                    atlas_id: self.atlas_id.clone(),
                    sprite_id: k.value.sprite_id.clone(),
                },
            )
        })
    }
}

/// Keyframes of one rectangle layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RectTrack {
    id: i64,
    group_id: String,
    keys: Keyframes<RectKey>,
}

impl RectTrack {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn keys(&self) -> &Keyframes<RectKey> {
        &self.keys
    }
}

/// Payload of a track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    Sprite(SpriteTrack),
    Rect(RectTrack),
}

/// Kind of keyframes a track holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Sprite,
    Rect,
}

impl TrackKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            TrackKind::Sprite => "sprite",
            TrackKind::Rect => "rect",
        }
    }
}

fn mismatch(expected: TrackKind, found: TrackKind) -> EditorError {
    EditorError::TrackKind {
        expected: expected.name(),
        found: found.name(),
    }
}

/// On-disk form of a track: one sprite layer or one rect layer.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackRecord {
    Sprite(SpriteLayerEntry),
    Rect(RectLayerEntry),
}

/// A time-indexed sequence of keyframes within an animation.
#[derive(Debug)]
pub struct Track {
    node: Node,
    data: TrackData,
}

impl Track {
    pub fn data(&self) -> &TrackData {
        &self.data
    }

    pub fn kind(&self) -> TrackKind {
        match self.data {
            TrackData::Sprite(_) => TrackKind::Sprite,
            TrackData::Rect(_) => TrackKind::Rect,
        }
    }

    pub fn as_sprite(&self) -> Option<&SpriteTrack> {
        match &self.data {
            TrackData::Sprite(t) => Some(t),
            TrackData::Rect(_) => None,
        }
    }

    pub fn as_rect(&self) -> Option<&RectTrack> {
        match &self.data {
            TrackData::Rect(t) => Some(t),
            TrackData::Sprite(_) => None,
        }
    }

    /// Number of keyframes, whatever the kind.
    pub fn key_count(&self) -> usize {
        match &self.data {
            TrackData::Sprite(t) => t.keys.len(),
            TrackData::Rect(t) => t.keys.len(),
        }
    }

    /// Key a sprite at `frame`, replacing any key already there.
    ///
    /// NaN and infinite scales have no JSON form and are rejected.
    pub fn insert_sprite_key(&mut self, frame: i64, key: SpriteKey) -> Result<InsertOutcome> {
        let found = self.kind();
        let TrackData::Sprite(track) = &mut self.data else {
            return Err(mismatch(TrackKind::Sprite, found));
        };
        if let Some(scale) = [key.scale_x, key.scale_y]
            .into_iter()
            .flatten()
            .find(|s| !s.is_finite())
        {
            return Err(EditorError::invalid_argument(format!(
                "sprite '{}' at frame {frame}: scale {scale} is not finite",
                key.sprite_id
            )));
        }
        let outcome = track.keys.insert(frame, key);
        self.node.raise();
        Ok(outcome)
    }

    /// Key a rectangle at `frame`, replacing any key already there.
    pub fn insert_rect_key(&mut self, frame: i64, key: RectKey) -> Result<InsertOutcome> {
        let found = self.kind();
        let TrackData::Rect(track) = &mut self.data else {
            return Err(mismatch(TrackKind::Rect, found));
        };
        let outcome = track.keys.insert(frame, key);
        self.node.raise();
        Ok(outcome)
    }

    /// Remove the key at `frame`. Returns false if there was none.
    pub fn remove_key(&mut self, frame: i64) -> bool {
        let removed = match &mut self.data {
            TrackData::Sprite(t) => t.keys.remove(frame).is_some(),
            TrackData::Rect(t) => t.keys.remove(frame).is_some(),
        };
        if removed {
            self.node.raise();
        }
        removed
    }

    /// Remove every key.
    pub fn clear_keys(&mut self) {
        match &mut self.data {
            TrackData::Sprite(t) => t.keys.clear(),
            TrackData::Rect(t) => t.keys.clear(),
        }
        self.node.raise();
    }

    /// Point a sprite track at another atlas.
    pub fn set_atlas_id(&mut self, atlas_id: impl Into<String>) -> Result<()> {
        let found = self.kind();
        let TrackData::Sprite(track) = &mut self.data else {
            return Err(mismatch(TrackKind::Sprite, found));
        };
        self.node.assign(&mut track.atlas_id, atlas_id.into());
        Ok(())
    }

    pub fn set_group_id(&mut self, group_id: impl Into<String>) -> Result<()> {
        let found = self.kind();
        let TrackData::Rect(track) = &mut self.data else {
            return Err(mismatch(TrackKind::Rect, found));
        };
        self.node.assign(&mut track.group_id, group_id.into());
        Ok(())
    }

    pub fn set_layer_id(&mut self, id: i64) -> Result<()> {
        let found = self.kind();
        let TrackData::Rect(track) = &mut self.data else {
            return Err(mismatch(TrackKind::Rect, found));
        };
        self.node.assign(&mut track.id, id);
        Ok(())
    }
}

impl Entity for Track {
    type Record = TrackRecord;
    const KIND: EntityKind = EntityKind::Track;

    fn attach(node: Node, record: TrackRecord) -> Self {
        let data = match record {
            TrackRecord::Sprite(layer) => TrackData::Sprite(SpriteTrack {
                atlas_id: layer.atlas_id,
                keys: layer
                    .frames
                    .into_iter()
                    .map(|f| {
                        let key = SpriteKey {
                            sprite_id: f.sprite_id,
                            pos_x: f.pos_x,
                            pos_y: f.pos_y,
                            scale_x: f.scale_x,
                            scale_y: f.scale_y,
                        };
                        (f.time, key)
                    })
                    .collect(),
            }),
            TrackRecord::Rect(layer) => TrackData::Rect(RectTrack {
                id: layer.id,
                group_id: layer.group_id,
                keys: layer
                    .frames
                    .into_iter()
                    .map(|f| {
                        let key = RectKey {
                            active: f.active,
                            x: f.x,
                            y: f.y,
                            width: f.width,
                            height: f.height,
                        };
                        (f.time, key)
                    })
                    .collect(),
            }),
        };
        Self { node, data }
    }

    fn to_record(&self) -> TrackRecord {
        match &self.data {
            TrackData::Sprite(t) => TrackRecord::Sprite(SpriteLayerEntry {
                atlas_id: t.atlas_id.clone(),
                frames: t
                    .keys
                    .iter()
                    .map(|k| SpriteFrameEntry {
                        time: k.frame,
                        sprite_id: k.value.sprite_id.clone(),
                        pos_x: k.value.pos_x,
                        pos_y: k.value.pos_y,
                        scale_x: k.value.scale_x,
                        scale_y: k.value.scale_y,
                    })
                    .collect(),
            }),
            TrackData::Rect(t) => TrackRecord::Rect(RectLayerEntry {
                id: t.id,
                group_id: t.group_id.clone(),
                frames: t
                    .keys
                    .iter()
                    .map(|k| RectFrameEntry {
                        time: k.frame,
                        active: k.value.active,
                        x: k.value.x,
                        y: k.value.y,
                        width: k.value.width,
                        height: k.value.height,
                    })
                    .collect(),
            }),
        }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

/// A named animation: tracks plus event and metadata timelines.
#[derive(Debug)]
pub struct Animation {
    node: Node,
    id: String,
    duration: i64,
    tracks: Children<Track>,
    events: Records<EventEntry>,
    metadata: Records<MetadataEntry>,
}

impl Animation {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.node.assign(&mut self.id, id.into());
    }

    /// Length in frames.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.node.assign(&mut self.duration, duration);
    }

    /// Sprite tracks first, then rect tracks, each in file order.
    pub fn tracks(&self) -> &Children<Track> {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut Children<Track> {
        &mut self.tracks
    }

    /// Append an empty sprite track drawing from `atlas_id`.
    pub fn add_sprite_track(&mut self, atlas_id: impl Into<String>) -> &mut Track {
        self.tracks.push(TrackRecord::Sprite(SpriteLayerEntry {
            atlas_id: atlas_id.into(),
            frames: Vec::new(),
        }))
    }

    /// Append an empty rect track.
    pub fn add_rect_track(&mut self, id: i64, group_id: impl Into<String>) -> &mut Track {
        self.tracks.push(TrackRecord::Rect(RectLayerEntry {
            id,
            group_id: group_id.into(),
            frames: Vec::new(),
        }))
    }

    /// First sprite track drawing from `atlas_id`.
    pub fn sprite_track_for(&mut self, atlas_id: &str) -> Option<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.as_sprite().is_some_and(|s| s.atlas_id == atlas_id))
    }

    pub fn events(&self) -> &Records<EventEntry> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut Records<EventEntry> {
        &mut self.events
    }

    pub fn metadata(&self) -> &Records<MetadataEntry> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Records<MetadataEntry> {
        &mut self.metadata
    }
}

impl Entity for Animation {
    type Record = AnimationEntry;
    const KIND: EntityKind = EntityKind::Animation;

    fn attach(node: Node, record: AnimationEntry) -> Self {
        let signal = node.signal().clone();
        let tracks = record
            .sprite_layers
            .into_iter()
            .map(TrackRecord::Sprite)
            .chain(record.rect_layers.into_iter().map(TrackRecord::Rect));
        Self {
            id: record.id,
            duration: record.duration,
            tracks: Children::from_records(signal.clone(), tracks),
            events: Records::from_vec(signal.clone(), record.events),
            metadata: Records::from_vec(signal, record.metadata),
            node,
        }
    }

    fn to_record(&self) -> AnimationEntry {
        let mut entry = AnimationEntry::new(self.id.clone(), self.duration);
        for track in &self.tracks {
            match track.to_record() {
                TrackRecord::Sprite(layer) => entry.sprite_layers.push(layer),
                TrackRecord::Rect(layer) => entry.rect_layers.push(layer),
            }
        }
        entry.events = self.events.to_vec();
        entry.metadata = self.metadata.to_vec();
        entry
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::schema::LocationEntry;
    use crate::model::signal::Modified;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn walk() -> (Node, Animation) {
        let root = Node::root(EntityKind::Document);
        let mut entry = AnimationEntry::new("walk", 12);
        entry.sprite_layers.push(SpriteLayerEntry {
            atlas_id: "hero".into(),
            frames: vec![
                SpriteFrameEntry {
                    time: 6,
                    sprite_id: "b".into(),
                    pos_x: None,
                    pos_y: None,
                    scale_x: None,
                    scale_y: None,
                },
                SpriteFrameEntry {
                    time: 0,
                    sprite_id: "a".into(),
                    pos_x: Some(1),
                    pos_y: Some(-1),
                    scale_x: None,
                    scale_y: Some(2.0),
                },
            ],
        });
        entry.rect_layers.push(RectLayerEntry {
            id: 3,
            group_id: "hitbox".into(),
            frames: vec![RectFrameEntry {
                time: 2,
                active: true,
                x: Some(0),
                y: Some(0),
                width: Some(4),
                height: None,
            }],
        });
        entry.events.push(EventEntry {
            event_id: "step".into(),
            time: 3,
            params: vec![serde_json::json!(1)],
            location: Some(LocationEntry { x: 2, y: 5 }),
        });
        let anim = Animation::attach(root.spawn(EntityKind::Animation), entry);
        (root, anim)
    }

    fn log_on(node: &Node) -> Rc<RefCell<Vec<Modified>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        node.subscribe(move |m| sink.borrow_mut().push(*m));
        log
    }

    #[test]
    fn test_loading_sorts_keys() {
        let (_root, anim) = walk();
        let track = anim.tracks().first().unwrap().as_sprite().unwrap();
        let frames: Vec<i64> = track.keys().frames().collect();
        assert_eq!(frames, vec![0, 6]);
        assert_eq!(
            track.reference_at(6),
            Some(SpriteRef {
                atlas_id: "hero".into(),
                sprite_id: "b".into()
            })
        );
        assert_eq!(track.reference_at(3), None);
    }

    #[test]
    fn test_record_splits_tracks_by_kind() {
        let (_root, anim) = walk();
        let record = anim.to_record();
        assert_eq!(record.sprite_layers.len(), 1);
        assert_eq!(record.rect_layers.len(), 1);
        assert_eq!(record.sprite_layers[0].frames[0].time, 0);
        assert_eq!(record.sprite_layers[0].frames[0].scale_y, Some(2.0));
        assert_eq!(record.events.len(), 1);
        assert_eq!(record.duration, 12);
    }

    #[test]
    fn test_insert_key_raises_from_track() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let track = anim.tracks_mut().get_mut(0).unwrap();
        let outcome = track.insert_sprite_key(6, SpriteKey::new("c")).unwrap();

        assert_eq!(outcome, InsertOutcome::Replaced(1));
        assert_eq!(track.key_count(), 2);
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].origin_kind, EntityKind::Track);
    }

    #[test]
    fn test_payload_kind_mismatch() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let rect = anim.tracks_mut().get_mut(1).unwrap();
        let err = rect.insert_sprite_key(0, SpriteKey::new("a")).unwrap_err();
        assert!(matches!(
            err,
            EditorError::TrackKind {
                expected: "sprite",
                found: "rect"
            }
        ));
        assert!(rect.set_atlas_id("x").is_err());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_missing_key_does_not_raise() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let track = anim.tracks_mut().get_mut(0).unwrap();
        assert!(!track.remove_key(100));
        assert!(log.borrow().is_empty());
        assert!(track.remove_key(0));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_non_finite_scale_is_rejected() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let track = anim.tracks_mut().get_mut(0).unwrap();

        let err = track
            .insert_sprite_key(3, SpriteKey::new("a").scaled(f64::NAN, 1.0))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidArgument(_)));
        assert!(track
            .insert_sprite_key(3, SpriteKey::new("a").scaled(1.0, f64::INFINITY))
            .is_err());
        assert_eq!(track.key_count(), 2);
        assert!(log.borrow().is_empty());

        track
            .insert_sprite_key(3, SpriteKey::new("a").scaled(-0.5, 2.0))
            .unwrap();
        assert_eq!(track.key_count(), 3);
    }

    #[test]
    fn test_rect_layer_setters_raise_once_on_change() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let rect = anim.tracks_mut().get_mut(1).unwrap();

        rect.set_group_id("hurtbox").unwrap();
        rect.set_group_id("hurtbox").unwrap();
        rect.set_layer_id(7).unwrap();
        rect.set_layer_id(7).unwrap();
        assert_eq!(log.borrow().len(), 2);

        let layer = rect.as_rect().unwrap();
        assert_eq!(layer.group_id(), "hurtbox");
        assert_eq!(layer.id(), 7);

        let sprite = anim.tracks_mut().get_mut(0).unwrap();
        assert!(sprite.set_group_id("x").is_err());
        assert!(sprite.set_layer_id(1).is_err());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_clear_keys_raises_once() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        let track = anim.tracks_mut().get_mut(0).unwrap();
        track.clear_keys();

        assert_eq!(track.key_count(), 0);
        assert_eq!(log.borrow().len(), 1);
        let record = anim.to_record();
        assert!(record.sprite_layers[0].frames.is_empty());
    }

    #[test]
    fn test_add_tracks() {
        let (_root, mut anim) = walk();
        anim.add_rect_track(9, "anchor")
            .insert_rect_key(-4, RectKey::default())
            .unwrap();
        anim.add_sprite_track("enemy");
        assert_eq!(anim.tracks().len(), 4);
        assert!(anim.sprite_track_for("enemy").is_some());
        assert!(anim.sprite_track_for("missing").is_none());

        let record = anim.to_record();
        assert_eq!(record.sprite_layers[1].atlas_id, "enemy");
        assert_eq!(record.rect_layers[1].frames[0].time, -4);
    }

    #[test]
    fn test_timeline_records_raise_on_animation() {
        let (root, mut anim) = walk();
        let log = log_on(&root);
        anim.metadata_mut().push(MetadataEntry {
            time: 0,
            data: serde_json::Map::new(),
        });
        anim.events_mut().remove(0);
        anim.events_mut().insert(
            5,
            EventEntry {
                event_id: "land".into(),
                time: 9,
                params: Vec::new(),
                location: None,
            },
        );
        assert_eq!(anim.events().len(), 1);
        assert_eq!(anim.to_record().events[0].event_id, "land");
        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|m| m.origin_kind == EntityKind::Animation));
    }
}
