//! animatlas - sprite atlas animation documents
//!
//! An editable in-memory model of sprite animation files: atlases (an image
//! plus named rectangles), animations built from keyframe tracks that point
//! at those rectangles, and the event and metadata declarations they use.
//!
//! - [`model`]: the document graph and its modification notices
//! - [`format`]: JSON load/save and TexturePacker import
//! - [`pixels`]: atlas image decoding (QOI and common raster formats)
//! - [`session`]: open/save/import workflows driven through a [`host::Host`]
//!
//! ```rust,ignore
//! use animatlas::{format, host::StdFs, pixels::DecoderRegistry};
//!
//! let (mut doc, _report) = format::load_document(&StdFs, path, &DecoderRegistry::new())?;
//! doc.subscribe(|m| println!("{} modified", m.origin));
//! let atlas = doc.atlas_by_id("hero").map(|a| a.entity_id());
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod model;
pub mod paths;
pub mod pixels;
pub mod session;

pub use error::{EditorError, Result};
pub use model::Document;
pub use session::EditorSession;
