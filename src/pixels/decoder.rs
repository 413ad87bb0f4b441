//! Decoder trait, registry and the decoded pixel buffer.

use thiserror::Error;

/// A decoded image, top-down and row-major, four bytes per pixel (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Wrap an RGBA buffer. Returns `None` if the buffer length does not
    /// match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The RGBA value at `(x, y)`, or `None` outside the image.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Expand tightly packed RGB triples to RGBA with full opacity.
///
/// Trailing bytes that do not form a whole triple are ignored.
pub fn expand_rgb(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    rgba
}

/// Image data that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{decoder}] {message}")]
pub struct DecodeError {
    /// Decoder that produced the diagnostic.
    pub decoder: &'static str,
    /// Human-readable diagnostic.
    pub message: String,
}

impl DecodeError {
    /// Create a new decode error.
    pub fn new(decoder: &'static str, message: impl Into<String>) -> Self {
        Self {
            decoder,
            message: message.into(),
        }
    }
}

/// Trait for image format decoders.
pub trait ImageDecoder {
    /// Unique identifier for this decoder (e.g., "qoi", "raster").
    fn id(&self) -> &'static str;

    /// Human-readable name for file filters.
    fn display_name(&self) -> &'static str;

    /// File extensions this decoder handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str];

    /// Check magic bytes. Returns `true` if the data looks like this format.
    fn can_decode(&self, data: &[u8]) -> bool;

    /// Decode raw file bytes.
    fn decode(&self, data: &[u8]) -> Result<Pixmap, DecodeError>;

    /// Decode bytes that were matched by file extension rather than magic.
    ///
    /// Formats without a signature need the extension to pick their reader.
    fn decode_with_extension(&self, data: &[u8], _ext: &str) -> Result<Pixmap, DecodeError> {
        self.decode(data)
    }

    /// Priority for format detection (higher = checked first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of available image decoders.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry with all built-in decoders.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(super::decoders::QoiDecoder));
        registry.register(Box::new(super::decoders::RasterDecoder));
        registry
    }

    /// Create a registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Register a decoder.
    pub fn register(&mut self, decoder: Box<dyn ImageDecoder>) {
        self.decoders.push(decoder);
        // Stable sort keeps registration order among equal priorities.
        self.decoders
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// All registered decoders, highest priority first.
    pub fn decoders(&self) -> &[Box<dyn ImageDecoder>] {
        &self.decoders
    }

    /// Get all supported file extensions (for file filtering).
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .decoders
            .iter()
            .flat_map(|d| d.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Check if a file name has a supported extension.
    pub fn is_supported_file(&self, name: &str) -> bool {
        extension_of(name).is_some_and(|ext| self.for_extension(&ext).is_some())
    }

    fn detect(&self, data: &[u8]) -> Option<&dyn ImageDecoder> {
        self.decoders
            .iter()
            .find(|d| d.can_decode(data))
            .map(|d| d.as_ref())
    }

    fn for_extension(&self, ext: &str) -> Option<&dyn ImageDecoder> {
        self.decoders
            .iter()
            .find(|d| d.extensions().contains(&ext))
            .map(|d| d.as_ref())
    }

    /// Decode image bytes.
    ///
    /// The decoder is chosen by magic bytes first, then by the extension of
    /// `name_hint`. The chosen decoder's error is returned as is.
    pub fn decode(&self, data: &[u8], name_hint: Option<&str>) -> Result<Pixmap, DecodeError> {
        let ext = name_hint.and_then(extension_of);
        let chosen = self.detect(data).map(|d| (d, None)).or_else(|| {
            let ext = ext.as_deref()?;
            self.for_extension(ext).map(|d| (d, Some(ext)))
        });

        let Some((decoder, by_extension)) = chosen else {
            return Err(DecodeError::new(
                "registry",
                format!(
                    "unrecognised image format{}",
                    name_hint.map(|n| format!(" ({n})")).unwrap_or_default()
                ),
            ));
        };

        let pixmap = match by_extension {
            Some(ext) => {
                log::debug!("Decoding with {} decoder (by extension .{})", decoder.id(), ext);
                decoder.decode_with_extension(data, ext)?
            }
            None => {
                log::debug!("Decoding with {} decoder (by detection)", decoder.id());
                decoder.decode(data)?
            }
        };
        log::trace!("Decoded {}x{} image", pixmap.width(), pixmap.height());
        Ok(pixmap)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
