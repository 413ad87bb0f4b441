//! The document root.

use std::fmt;
use std::path::Path;

use crate::error::{EditorError, Result};
use crate::format::schema::{DocumentData, EventInfoEntry, MetaPropEntry};
use crate::host::FileIo;
use crate::model::animation::{Animation, SpriteRef};
use crate::model::atlas::{Atlas, Sprite};
use crate::model::children::{Children, Records};
use crate::model::signal::{EntityId, EntityKind, ListenerId, Modified, Node};
use crate::pixels::DecoderRegistry;

/// Outcome of decoding every atlas image after a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLoadReport {
    /// Number of atlases whose image decoded.
    pub loaded: usize,
    /// Atlas id and diagnostic for every atlas left without an image.
    pub failed: Vec<(String, String)>,
}

impl ImageLoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for ImageLoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} loaded, {} failed", self.loaded, self.failed.len())
    }
}

/// A sprite keyframe whose atlas or sprite does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub animation: String,
    pub frame: i64,
    pub reference: SpriteRef,
}

/// An editable sprite animation document.
///
/// Any change anywhere in the document is reported to listeners registered
/// with [`Document::subscribe`].
#[derive(Debug)]
pub struct Document {
    node: Node,
    animations: Children<Animation>,
    atlases: Children<Atlas>,
    events: Records<EventInfoEntry>,
    metadata: Records<MetaPropEntry>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::from_data(DocumentData::new())
    }

    /// Build a document from parsed records. Does not decode images.
    pub fn from_data(data: DocumentData) -> Self {
        let node = Node::root(EntityKind::Document);
        let signal = node.signal().clone();
        Self {
            animations: Children::from_records(signal.clone(), data.animation),
            atlases: Children::from_records(signal.clone(), data.atlas),
            events: Records::from_vec(signal.clone(), data.event),
            metadata: Records::from_vec(signal, data.metadata),
            node,
        }
    }

    /// Flatten to records, dropping decoded images and listeners.
    pub fn to_data(&self) -> DocumentData {
        DocumentData {
            animation: self.animations.to_records(),
            atlas: self.atlases.to_records(),
            event: self.events.to_vec(),
            metadata: self.metadata.to_vec(),
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.node.id()
    }

    /// Listen for modifications anywhere in the document.
    pub fn subscribe(&self, listener: impl Fn(&Modified) + 'static) -> ListenerId {
        self.node.subscribe(listener)
    }

    pub fn unsubscribe(&self, listener: ListenerId) -> bool {
        self.node.unsubscribe(listener)
    }

    pub fn animations(&self) -> &Children<Animation> {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut Children<Animation> {
        &mut self.animations
    }

    pub fn atlases(&self) -> &Children<Atlas> {
        &self.atlases
    }

    pub fn atlases_mut(&mut self) -> &mut Children<Atlas> {
        &mut self.atlases
    }

    pub fn event_definitions(&self) -> &Records<EventInfoEntry> {
        &self.events
    }

    pub fn event_definitions_mut(&mut self) -> &mut Records<EventInfoEntry> {
        &mut self.events
    }

    pub fn metadata_definitions(&self) -> &Records<MetaPropEntry> {
        &self.metadata
    }

    pub fn metadata_definitions_mut(&mut self) -> &mut Records<MetaPropEntry> {
        &mut self.metadata
    }

    /// First atlas with the given id. Ids are not required to be unique.
    pub fn atlas_by_id(&self, id: &str) -> Option<&Atlas> {
        self.atlases.iter().find(|a| a.id() == id)
    }

    pub fn atlas_by_id_mut(&mut self, id: &str) -> Option<&mut Atlas> {
        self.atlases.iter_mut().find(|a| a.id() == id)
    }

    /// First animation with the given id.
    pub fn animation_by_id(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id() == id)
    }

    pub fn animation_by_id_mut(&mut self, id: &str) -> Option<&mut Animation> {
        self.animations.iter_mut().find(|a| a.id() == id)
    }

    /// Grid-slice the atlas with the given identity.
    pub fn grid_slice(&mut self, atlas: EntityId, rows: u32, cols: u32) -> Result<()> {
        self.atlases
            .find_mut(atlas)
            .ok_or_else(|| EditorError::not_found("atlas", atlas.to_string()))?
            .grid_slice(rows, cols)
    }

    /// Try to decode every atlas image. Failures are collected, not returned.
    pub fn load_images<F: FileIo + ?Sized>(
        &mut self,
        io: &F,
        root: &Path,
        decoders: &DecoderRegistry,
    ) -> ImageLoadReport {
        let mut report = ImageLoadReport::default();
        for atlas in self.atlases.iter_mut() {
            match atlas.load_image(io, root, decoders).map(|_| ()) {
                Ok(()) => report.loaded += 1,
                Err(e) => report.failed.push((atlas.id().to_string(), e.to_string())),
            }
        }
        if !report.is_complete() {
            log::warn!("Atlas images: {}", report);
        }
        report
    }

    /// Look up the sprite a keyframe points at.
    pub fn resolve_sprite(&self, reference: &SpriteRef) -> Option<&Sprite> {
        self.atlas_by_id(&reference.atlas_id)?
            .sprite_by_id(&reference.sprite_id)
    }

    /// Every sprite keyframe that does not resolve.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for animation in &self.animations {
            for track in animation.tracks() {
                let Some(sprites) = track.as_sprite() else {
                    continue;
                };
                for (frame, reference) in sprites.references() {
                    if self.resolve_sprite(&reference).is_none() {
                        dangling.push(DanglingReference {
                            animation: animation.id().to_string(),
                            frame,
                            reference,
                        });
                    }
                }
            }
        }
        dangling
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents compare by their on-disk content.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.to_data() == other.to_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::schema::{AnimationEntry, AtlasEntry, SpriteEntry};
    use crate::model::animation::SpriteKey;
    use crate::model::children::Entity;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample() -> Document {
        let mut data = DocumentData::new();
        data.atlas.push(
            AtlasEntry::new("hero", "hero.png").with_sprite(SpriteEntry::new("idle", 0, 0, 16, 16)),
        );
        data.animation.push(AnimationEntry::new("walk", 8));
        Document::from_data(data)
    }

    #[test]
    fn test_sprite_x_bubbles_sprite_atlas_document() {
        let mut doc = sample();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        doc.subscribe(move |m| sink.borrow_mut().push(m.at_kind));
        let atlas = doc.atlases_mut().get_mut(0).unwrap();
        let sink = Rc::clone(&seen);
        atlas.subscribe(move |m| sink.borrow_mut().push(m.at_kind));
        let sprite = atlas.sprites_mut().get_mut(0).unwrap();
        let sink = Rc::clone(&seen);
        sprite.subscribe(move |m| sink.borrow_mut().push(m.at_kind));

        sprite.set_x(4);

        assert_eq!(
            *seen.borrow(),
            vec![EntityKind::Sprite, EntityKind::Atlas, EntityKind::Document]
        );
    }

    #[test]
    fn test_construction_does_not_raise() {
        let doc = Document::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        doc.subscribe(move |_| *c.borrow_mut() += 1);
        let _ = doc.to_data();
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_remove_by_identity_with_duplicate_ids() {
        let mut doc = sample();
        doc.atlases_mut().push(AtlasEntry::new("hero", "other.png"));
        let second = doc.atlases().get(1).unwrap().entity_id();

        let removed = doc.atlases_mut().remove(second).unwrap();
        assert_eq!(removed.path, "other.png");
        assert_eq!(doc.atlases().len(), 1);
        assert_eq!(doc.atlases().first().unwrap().path(), "hero.png");
    }

    #[test]
    fn test_removed_entity_stops_bubbling() {
        let mut doc = sample();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        doc.subscribe(move |_| *c.borrow_mut() += 1);

        let id = doc.atlases().get(0).unwrap().entity_id();
        doc.atlases_mut().remove(id);
        assert_eq!(*count.borrow(), 1);
        assert!(doc.atlases_mut().remove(id).is_none());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_grid_slice_unknown_atlas() {
        let mut doc = sample();
        let anim = doc.animations().get(0).unwrap().entity_id();
        assert!(matches!(
            doc.grid_slice(anim, 1, 1),
            Err(EditorError::NotFound { what: "atlas", .. })
        ));
    }

    #[test]
    fn test_dangling_references_are_tolerated_and_listed() {
        let mut doc = sample();
        let anim = doc.animation_by_id_mut("walk").unwrap();
        let track = anim.add_sprite_track("hero");
        track.insert_sprite_key(0, SpriteKey::new("idle")).unwrap();
        track.insert_sprite_key(4, SpriteKey::new("jump")).unwrap();
        anim.add_sprite_track("ghost")
            .insert_sprite_key(2, SpriteKey::new("idle"))
            .unwrap();

        let dangling = doc.dangling_references();
        let frames: Vec<i64> = dangling.iter().map(|d| d.frame).collect();
        assert_eq!(frames, vec![4, 2]);
        assert_eq!(dangling[1].reference.atlas_id, "ghost");
    }

    #[test]
    fn test_documents_compare_by_content() {
        let a = sample();
        let b = sample();
        assert_ne!(a.entity_id().get(), 0);
        assert_eq!(a, b);
    }
}
