//! TexturePacker JSON manifest import.
//!
//! Both export flavours are accepted:
//!
//! - **JSON (Hash)**: `frames` is an object keyed by sprite name. Sprites are
//!   imported in the order the keys appear in the file.
//! - **JSON (Array)**: `frames` is an array whose entries carry a `filename`.
//!   File order is kept.
//!
//! ```json
//! {
//!   "frames": {
//!     "idle_0": { "frame": { "x": 0, "y": 0, "w": 32, "h": 32 }, "rotated": false, "trimmed": false }
//!   },
//!   "meta": { "image": "hero.png", "size": { "w": 256, "h": 256 } }
//! }
//! ```
//!
//! Rotated or trimmed sprites cannot be represented and fail the import.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{EditorError, Result, UnsupportedFeature};
use crate::format::schema::{AtlasEntry, SpriteEntry};
use crate::host::FileIo;
use crate::paths;

#[derive(Debug, Deserialize)]
struct Manifest {
    frames: Frames,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Frames {
    Hash(Map<String, Value>),
    Array(Vec<NamedFrame>),
}

#[derive(Debug, Deserialize)]
struct NamedFrame {
    filename: String,
    #[serde(flatten)]
    frame: Frame,
}

#[derive(Debug, Deserialize)]
struct Frame {
    frame: FrameRect,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    trimmed: bool,
}

#[derive(Debug, Deserialize)]
struct FrameRect {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

#[derive(Debug, Deserialize)]
struct Meta {
    image: String,
    #[serde(default)]
    app: Option<String>,
}

impl Frames {
    fn into_named(self) -> Result<Vec<(String, Frame)>> {
        match self {
            Frames::Hash(map) => map
                .into_iter()
                .map(|(name, value)| {
                    serde_json::from_value(value)
                        .map(|frame| (name, frame))
                        .map_err(EditorError::MalformedManifest)
                })
                .collect(),
            Frames::Array(list) => Ok(list.into_iter().map(|f| (f.filename, f.frame)).collect()),
        }
    }
}

/// Build an atlas record from manifest bytes.
///
/// `manifest_path` locates the manifest (its directory anchors `meta.image`
/// and its file stem becomes the atlas id). The stored image path is made
/// relative to `document_root`. Nothing is returned unless every sprite
/// imports.
pub fn import_sheet(bytes: &[u8], manifest_path: &Path, document_root: &Path) -> Result<AtlasEntry> {
    let manifest: Manifest =
        serde_json::from_slice(bytes).map_err(EditorError::MalformedManifest)?;

    if let Some(app) = &manifest.meta.app {
        log::debug!("Manifest written by {}", app);
    }

    let mut sprites = Vec::new();
    for (name, frame) in manifest.frames.into_named()? {
        if frame.rotated {
            return Err(EditorError::unsupported(name, UnsupportedFeature::Rotated));
        }
        if frame.trimmed {
            return Err(EditorError::unsupported(name, UnsupportedFeature::Trimmed));
        }
        let r = frame.frame;
        sprites.push(SpriteEntry::new(name, r.x, r.y, r.w, r.h));
    }

    let image = paths::resolve(&paths::parent_dir(manifest_path), &manifest.meta.image);
    let path = paths::to_portable(&paths::relative_to(&image, document_root));

    let id = manifest_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    log::info!(
        "Imported {} sprites from {:?} as atlas '{}'",
        sprites.len(),
        manifest_path,
        id
    );

    Ok(AtlasEntry { id, path, sprites })
}

/// Read a manifest through `io` and build an atlas record from it.
pub fn import_manifest<F: FileIo + ?Sized>(
    io: &F,
    manifest_path: &Path,
    document_root: &Path,
) -> Result<AtlasEntry> {
    let bytes = io
        .read_file(manifest_path)
        .map_err(|e| EditorError::io(manifest_path, e))?;
    import_sheet(&bytes, manifest_path, document_root)
}
