//! On-disk formats.
//!
//! - [`schema`]: the document file records
//! - [`bridge`]: document model to and from JSON text
//! - [`texture_packer`]: TexturePacker manifest import
//!
//! ## Usage
//!
//! ```rust,ignore
//! use animatlas::format::{load_document, save_document};
//!
//! let (mut doc, report) = load_document(&StdFs, path, &DecoderRegistry::new())?;
//! doc.grid_slice(atlas, 4, 4)?;
//! save_document(&StdFs, &doc, path)?;
//! ```

pub mod bridge;
pub mod schema;
pub mod texture_packer;

#[cfg(test)]
mod tests;

pub use bridge::{
    data_to_json, document_to_json, load_document, parse_document, save_document,
};
pub use schema::{
    AnimationEntry, AtlasEntry, DocumentData, EventEntry, EventInfoEntry, LocationEntry,
    MetaPropEntry, MetadataEntry, ParamEntry, RectFrameEntry, RectLayerEntry, SpriteEntry,
    SpriteFrameEntry, SpriteLayerEntry, ValueType,
};
pub use texture_packer::{import_manifest, import_sheet};
