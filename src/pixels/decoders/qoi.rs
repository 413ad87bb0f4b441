//! Decoder for the Quite OK Image format.

use image::{DynamicImage, ImageFormat};

use crate::pixels::decoder::{DecodeError, ImageDecoder, Pixmap, expand_rgb};

/// QOI decoder. Three-channel images are expanded to opaque RGBA.
pub struct QoiDecoder;

const MAGIC: &[u8; 4] = b"qoif";

impl ImageDecoder for QoiDecoder {
    fn id(&self) -> &'static str {
        "qoi"
    }

    fn display_name(&self) -> &'static str {
        "Quite OK Image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["qoi"]
    }

    fn can_decode(&self, data: &[u8]) -> bool {
        data.starts_with(MAGIC)
    }

    fn decode(&self, data: &[u8]) -> Result<Pixmap, DecodeError> {
        let img = image::load_from_memory_with_format(data, ImageFormat::Qoi)
            .map_err(|e| DecodeError::new(self.id(), e.to_string()))?;

        let (width, height) = (img.width(), img.height());
        let pixels = match img {
            DynamicImage::ImageRgb8(buf) => expand_rgb(buf.as_raw()),
            DynamicImage::ImageRgba8(buf) => buf.into_raw(),
            other => other.to_rgba8().into_raw(),
        };

        Pixmap::from_rgba(width, height, pixels)
            .ok_or_else(|| DecodeError::new(self.id(), "pixel buffer size mismatch"))
    }

    fn priority(&self) -> i32 {
        10
    }
}
