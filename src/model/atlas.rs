//! Atlases and the sprites cut from them.

use std::path::Path;

use crate::error::{EditorError, Result};
use crate::format::schema::{AtlasEntry, SpriteEntry};
use crate::host::FileIo;
use crate::model::children::{Children, Entity};
use crate::model::signal::{EntityKind, Node};
use crate::paths;
use crate::pixels::{DecoderRegistry, Pixmap};

/// Integer rectangle in atlas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// A named region of an atlas image. Bounds are not checked against the image.
#[derive(Debug)]
pub struct Sprite {
    node: Node,
    id: String,
    rect: SpriteRect,
}

impl Sprite {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.node.assign(&mut self.id, id.into());
    }

    pub fn x(&self) -> i64 {
        self.rect.x
    }

    pub fn set_x(&mut self, x: i64) {
        self.node.assign(&mut self.rect.x, x);
    }

    pub fn y(&self) -> i64 {
        self.rect.y
    }

    pub fn set_y(&mut self, y: i64) {
        self.node.assign(&mut self.rect.y, y);
    }

    pub fn width(&self) -> i64 {
        self.rect.width
    }

    pub fn set_width(&mut self, width: i64) {
        self.node.assign(&mut self.rect.width, width);
    }

    pub fn height(&self) -> i64 {
        self.rect.height
    }

    pub fn set_height(&mut self, height: i64) {
        self.node.assign(&mut self.rect.height, height);
    }

    pub fn rect(&self) -> SpriteRect {
        self.rect
    }

    /// Set all four coordinates with a single modification.
    pub fn set_rect(&mut self, rect: SpriteRect) {
        self.node.assign(&mut self.rect, rect);
    }
}

impl Entity for Sprite {
    type Record = SpriteEntry;
    const KIND: EntityKind = EntityKind::Sprite;

    fn attach(node: Node, record: SpriteEntry) -> Self {
        Self {
            node,
            id: record.id,
            rect: SpriteRect {
                x: record.x,
                y: record.y,
                width: record.width,
                height: record.height,
            },
        }
    }

    fn to_record(&self) -> SpriteEntry {
        SpriteEntry::new(
            self.id.clone(),
            self.rect.x,
            self.rect.y,
            self.rect.width,
            self.rect.height,
        )
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

/// Decoded-image cache of an atlas. Never written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageState {
    /// No decode attempted since the atlas was created or its path changed.
    #[default]
    NotLoaded,
    /// The image decoded successfully.
    Loaded(Pixmap),
    /// Reading or decoding failed; the atlas has no preview.
    Failed(String),
}

impl ImageState {
    pub fn pixmap(&self) -> Option<&Pixmap> {
        match self {
            ImageState::Loaded(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageState::Loaded(_))
    }
}

/// An image plus the sprites defined on it.
#[derive(Debug)]
pub struct Atlas {
    node: Node,
    id: String,
    path: String,
    sprites: Children<Sprite>,
    image: ImageState,
}

impl Atlas {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.node.assign(&mut self.id, id.into());
    }

    /// Image path, relative to the document's directory, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Change the image path. Drops the decoded image if the path changed.
    pub fn set_path(&mut self, path: impl Into<String>) {
        if self.node.assign(&mut self.path, path.into()) {
            self.image = ImageState::NotLoaded;
        }
    }

    pub fn sprites(&self) -> &Children<Sprite> {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut Children<Sprite> {
        &mut self.sprites
    }

    /// First sprite with the given id.
    pub fn sprite_by_id(&self, id: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id() == id)
    }

    pub fn image(&self) -> &ImageState {
        &self.image
    }

    /// Read and decode the atlas image, resolving the path against `root`.
    ///
    /// The outcome is cached either way. A failure is also returned so the
    /// caller can report it, but leaves the atlas otherwise usable.
    pub fn load_image<F: FileIo + ?Sized>(
        &mut self,
        io: &F,
        root: &Path,
        decoders: &DecoderRegistry,
    ) -> Result<&Pixmap> {
        let full = paths::resolve(root, &self.path);
        let decoded = io
            .read_file(&full)
            .map_err(|e| EditorError::io(&full, e))
            .and_then(|bytes| {
                decoders
                    .decode(&bytes, Some(self.path.as_str()))
                    .map_err(EditorError::from)
            });

        match decoded {
            Ok(pixmap) => {
                log::debug!(
                    "Atlas '{}': decoded {}x{} image",
                    self.id,
                    pixmap.width(),
                    pixmap.height()
                );
                self.image = ImageState::Loaded(pixmap);
            }
            Err(e) => {
                log::warn!("Atlas '{}': image unavailable: {}", self.id, e);
                self.image = ImageState::Failed(e.to_string());
                return Err(e);
            }
        }

        self.image.pixmap().ok_or_else(|| EditorError::ImageUnavailable {
            atlas: self.id.clone(),
        })
    }

    /// Install an already decoded image.
    pub fn set_image(&mut self, pixmap: Pixmap) {
        self.image = ImageState::Loaded(pixmap);
    }

    /// Release the decoded image.
    pub fn unload_image(&mut self) {
        self.image = ImageState::NotLoaded;
    }

    /// Replace every sprite with a `rows` x `cols` grid over the decoded image.
    ///
    /// Cells are `floor(width / cols)` by `floor(height / rows)` pixels and
    /// named `<atlas>_<row>_<col>` in row-major order.
    pub fn grid_slice(&mut self, rows: u32, cols: u32) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(EditorError::invalid_argument(format!(
                "grid needs at least one row and column, got {rows}x{cols}"
            )));
        }
        let Some(pixmap) = self.image.pixmap() else {
            return Err(EditorError::ImageUnavailable {
                atlas: self.id.clone(),
            });
        };

        let cell_width = i64::from(pixmap.width() / cols);
        let cell_height = i64::from(pixmap.height() / rows);
        if cell_width == 0 || cell_height == 0 {
            return Err(EditorError::invalid_argument(format!(
                "{}x{} image is too small for a {rows}x{cols} grid",
                pixmap.width(),
                pixmap.height()
            )));
        }

        let mut records = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                records.push(SpriteEntry::new(
                    format!("{}_{}_{}", self.id, row, col),
                    i64::from(col) * cell_width,
                    i64::from(row) * cell_height,
                    cell_width,
                    cell_height,
                ));
            }
        }

        log::info!(
            "Atlas '{}': sliced into {}x{} cells of {}x{}",
            self.id,
            rows,
            cols,
            cell_width,
            cell_height
        );
        self.sprites.replace_all(records);
        Ok(())
    }
}

impl Entity for Atlas {
    type Record = AtlasEntry;
    const KIND: EntityKind = EntityKind::Atlas;

    fn attach(node: Node, record: AtlasEntry) -> Self {
        let sprites = Children::from_records(node.signal().clone(), record.sprites);
        Self {
            node,
            id: record.id,
            path: record.path,
            sprites,
            image: ImageState::NotLoaded,
        }
    }

    fn to_record(&self) -> AtlasEntry {
        AtlasEntry {
            id: self.id.clone(),
            path: self.path.clone(),
            sprites: self.sprites.to_records(),
        }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}
