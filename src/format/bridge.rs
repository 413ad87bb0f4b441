//! Document model to and from JSON text.
//!
//! Loading goes bytes -> [`DocumentData`] -> [`Document`], then decodes each
//! atlas image. Saving flattens back to [`DocumentData`] and pretty-prints it
//! with a trailing newline. Key order comes from the record types, so an
//! unmodified document saves to the same bytes every time.

use std::path::Path;

use crate::error::{EditorError, Result};
use crate::format::schema::DocumentData;
use crate::host::FileIo;
use crate::model::{Document, ImageLoadReport};
use crate::paths;
use crate::pixels::DecoderRegistry;

/// Parse document bytes into records.
///
/// A leading UTF-8 byte order mark is ignored.
pub fn parse_document(bytes: &[u8]) -> Result<DocumentData> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EditorError::MalformedText(format!("not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(EditorError::MalformedDocument)
}

/// Serialize records as pretty-printed JSON.
pub fn data_to_json(data: &DocumentData) -> Result<String> {
    let mut json = serde_json::to_string_pretty(data).map_err(EditorError::MalformedDocument)?;
    json.push('\n');
    Ok(json)
}

/// Serialize a document, dropping edit-only state.
pub fn document_to_json(doc: &Document) -> Result<String> {
    data_to_json(&doc.to_data())
}

/// Read, parse and wrap a document, then try to decode its atlas images.
///
/// Image failures are reported, not returned: the document is still usable.
pub fn load_document<F: FileIo + ?Sized>(
    io: &F,
    path: &Path,
    decoders: &DecoderRegistry,
) -> Result<(Document, ImageLoadReport)> {
    log::info!("Loading document from {:?}", path);

    let bytes = io.read_file(path).map_err(|e| EditorError::io(path, e))?;
    let data = parse_document(&bytes)?;

    log::debug!(
        "Parsed {} animations, {} atlases, {} sprites",
        data.animation.len(),
        data.atlas.len(),
        data.total_sprites()
    );

    let mut doc = Document::from_data(data);
    let report = doc.load_images(io, &paths::parent_dir(path), decoders);

    log::info!("Loaded document: {} atlases, images {}", doc.atlases().len(), report);
    Ok((doc, report))
}

/// Write a document to `path`.
pub fn save_document<F: FileIo + ?Sized>(io: &F, doc: &Document, path: &Path) -> Result<()> {
    log::info!("Saving document to {:?}", path);

    let json = document_to_json(doc)?;
    io.write_file(path, json.as_bytes())
        .map_err(|e| EditorError::io(path, e))?;

    log::debug!("Wrote {} bytes", json.len());
    Ok(())
}
