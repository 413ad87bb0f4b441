//! Host-facing editing session.
//!
//! [`EditorSession`] holds the open document, where it lives on disk and
//! whether it has unsaved changes. Every workflow that needs the user goes
//! through a [`Host`]; a declined prompt cancels the workflow before it
//! changes anything.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{EditorError, Result};
use crate::format::{bridge, schema::AtlasEntry, texture_packer};
use crate::host::{FileFilter, Host};
use crate::model::{Document, Entity, EntityId, ImageLoadReport};
use crate::paths;
use crate::pixels::DecoderRegistry;

/// Application name shown in the window title.
pub const APP_NAME: &str = "animatlas";

const UNTITLED: &str = "Untitled Document";

/// The open document and its on-disk state.
pub struct EditorSession {
    document: Document,
    path: Option<PathBuf>,
    unsaved: Rc<Cell<bool>>,
    decoders: DecoderRegistry,
    default_document_name: String,
}

impl EditorSession {
    /// Start with an empty, unmodified document.
    pub fn new() -> Self {
        let document = Document::new();
        let unsaved = watch(&document, false);
        Self {
            document,
            path: None,
            unsaved,
            decoders: DecoderRegistry::new(),
            default_document_name: "New Sprite File.json".to_string(),
        }
    }

    /// Replace the decoder registry used for atlas images.
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    /// File name suggested when a document is saved for the first time.
    pub fn set_default_document_name(&mut self, name: impl Into<String>) {
        self.default_document_name = name.into();
    }

    fn install(&mut self, document: Document, path: Option<PathBuf>, unsaved: bool) {
        // The old document's listener goes away with its bus.
        self.unsaved = watch(&document, unsaved);
        self.document = document;
        self.path = path;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access. Any change marks the session unsaved.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_unsaved(&self) -> bool {
        self.unsaved.get()
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }

    /// Directory stored atlas paths are relative to.
    pub fn document_root(&self) -> Option<PathBuf> {
        self.path.as_deref().map(paths::parent_dir)
    }

    /// `"animatlas - <path>"`, with a trailing `*` while unsaved.
    pub fn window_title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| UNTITLED.to_string());
        if self.is_unsaved() {
            format!("{APP_NAME} - {name} *")
        } else {
            format!("{APP_NAME} - {name}")
        }
    }

    /// Discard the current document and start an empty, unsaved one.
    pub fn new_document(&mut self) {
        log::info!("New document");
        self.install(Document::new(), None, true);
    }

    /// Ask for a document and open it. Returns `None` if the user cancelled.
    pub fn open_document<H: Host + ?Sized>(&mut self, host: &H) -> Result<Option<ImageLoadReport>> {
        let Some(path) = host.request_open_path(FileFilter::Document) else {
            return Ok(None);
        };
        self.open_document_at(host, &path).map(Some)
    }

    /// Open the document at `path`. On failure the current document is kept.
    pub fn open_document_at<H: Host + ?Sized>(
        &mut self,
        host: &H,
        path: &Path,
    ) -> Result<ImageLoadReport> {
        let (document, report) = bridge::load_document(host, path, &self.decoders)?;
        self.install(document, Some(path.to_path_buf()), false);
        Ok(report)
    }

    /// Save to the current path, or ask for one. Returns false if cancelled.
    pub fn save_document<H: Host + ?Sized>(&mut self, host: &H) -> Result<bool> {
        match self.path.clone() {
            Some(path) => self.save_document_to(host, &path).map(|()| true),
            None => self.save_document_as(host),
        }
    }

    /// Ask for a path and save there. Returns false if cancelled.
    pub fn save_document_as<H: Host + ?Sized>(&mut self, host: &H) -> Result<bool> {
        let Some(path) = host.request_save_path(&self.default_document_name) else {
            return Ok(false);
        };
        self.save_document_to(host, &path)?;
        Ok(true)
    }

    /// Save to `path` and make it the document's location.
    pub fn save_document_to<H: Host + ?Sized>(&mut self, host: &H, path: &Path) -> Result<()> {
        bridge::save_document(host, &self.document, path)?;
        self.path = Some(path.to_path_buf());
        self.unsaved.set(false);
        Ok(())
    }

    /// Directory of the saved document, saving it first if the user agrees.
    fn require_saved<H: Host + ?Sized>(&mut self, host: &H) -> Result<PathBuf> {
        if let Some(root) = self.document_root() {
            return Ok(root);
        }
        let agreed =
            host.request_confirmation("Save Document", "Document must be saved in order to continue");
        if !agreed {
            return Err(EditorError::DocumentPathRequired);
        }
        if !self.save_document_as(host)? {
            return Err(EditorError::DocumentPathRequired);
        }
        self.document_root()
            .ok_or(EditorError::DocumentPathRequired)
    }

    /// Ask for an image and add it as a new atlas.
    pub fn new_atlas<H: Host + ?Sized>(&mut self, host: &H) -> Result<Option<EntityId>> {
        self.require_saved(host)?;
        let Some(image) = host.request_open_path(FileFilter::Image) else {
            return Ok(None);
        };
        self.new_atlas_from_image(host, &image).map(Some)
    }

    /// Add `image` as a new atlas named after its file stem.
    ///
    /// An image that fails to decode still gets an atlas, just without a
    /// preview.
    pub fn new_atlas_from_image<H: Host + ?Sized>(
        &mut self,
        host: &H,
        image: &Path,
    ) -> Result<EntityId> {
        let root = self.require_saved(host)?;
        let id = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stored = paths::to_portable(&paths::relative_to(image, &root));

        log::info!("Adding atlas '{}' from {:?}", id, image);
        Ok(self.commit_atlas(host, AtlasEntry::new(id, stored), &root))
    }

    /// Ask for a TexturePacker manifest and import it as a new atlas.
    pub fn import_manifest<H: Host + ?Sized>(&mut self, host: &H) -> Result<Option<EntityId>> {
        self.require_saved(host)?;
        let Some(manifest) = host.request_open_path(FileFilter::Manifest) else {
            return Ok(None);
        };
        self.import_manifest_at(host, &manifest).map(Some)
    }

    /// Import the manifest at `path`. The document is untouched on failure.
    pub fn import_manifest_at<H: Host + ?Sized>(&mut self, host: &H, path: &Path) -> Result<EntityId> {
        let root = self.require_saved(host)?;
        let entry = texture_packer::import_manifest(host, path, &root)?;
        Ok(self.commit_atlas(host, entry, &root))
    }

    fn commit_atlas<H: Host + ?Sized>(&mut self, host: &H, entry: AtlasEntry, root: &Path) -> EntityId {
        let decoders = &self.decoders;
        let atlas = self.document.atlases_mut().push(entry);
        if let Some(e) = atlas.load_image(host, root, decoders).err() {
            log::debug!("New atlas '{}' has no preview: {}", atlas.id(), e);
        }
        atlas.entity_id()
    }

    /// Remove an atlas after confirmation. Returns false if declined.
    pub fn delete_atlas<H: Host + ?Sized>(&mut self, host: &H, atlas: EntityId) -> Result<bool> {
        let id = self
            .document
            .atlases()
            .find(atlas)
            .map(|a| a.id().to_string())
            .ok_or_else(|| EditorError::not_found("atlas", atlas.to_string()))?;

        if !host.request_confirmation("Confirm Deletion", &format!("Delete atlas '{id}'?")) {
            return Ok(false);
        }
        self.document.atlases_mut().remove(atlas);
        log::info!("Deleted atlas '{}'", id);
        Ok(true)
    }

    /// Grid-slice an atlas of the open document.
    pub fn grid_slice(&mut self, atlas: EntityId, rows: u32, cols: u32) -> Result<()> {
        self.document.grid_slice(atlas, rows, cols)
    }

    /// Whether the session may be closed, asking if there are unsaved changes.
    pub fn confirm_close<H: Host + ?Sized>(&self, host: &H) -> bool {
        !self.is_unsaved()
            || host.request_confirmation(
                "Confirm Quit",
                "Document has unsaved changes. Are you sure you want to quit?",
            )
    }
}

/// Track modifications of `document` in a shared flag.
fn watch(document: &Document, unsaved: bool) -> Rc<Cell<bool>> {
    let flag = Rc::new(Cell::new(unsaved));
    let sink = Rc::clone(&flag);
    document.subscribe(move |_| sink.set(true));
    flag
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
