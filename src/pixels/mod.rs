//! Decoding atlas images into RGBA pixel buffers.
//!
//! This module provides:
//! - `Pixmap`: a decoded image as top-down, row-major RGBA8 bytes
//! - `DecoderRegistry`: picks a decoder by magic bytes, then by extension
//! - Built-in decoders for QOI and the common raster formats
//!
//! ## Adding New Formats
//!
//! Implement `ImageDecoder` in `decoders/` and register it in
//! `DecoderRegistry::new()`.
//!
//! ```rust,ignore
//! use animatlas::pixels::DecoderRegistry;
//!
//! let registry = DecoderRegistry::new();
//! let pixmap = registry.decode(&bytes, Some("hero.qoi"))?;
//! ```

mod decoder;
pub mod decoders;

pub use decoder::{DecodeError, DecoderRegistry, ImageDecoder, Pixmap, expand_rgb};
