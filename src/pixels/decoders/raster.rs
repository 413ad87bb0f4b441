//! Decoder for standard raster formats (PNG, JPEG, BMP, GIF, TGA, TIFF, WebP).

use image::ImageFormat;

use crate::pixels::decoder::{DecodeError, ImageDecoder, Pixmap};

/// Generic decoder backed by the `image` crate.
///
/// Whatever the source layout, the result is converted to RGBA8.
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn id(&self) -> &'static str {
        "raster"
    }

    fn display_name(&self) -> &'static str {
        "Raster Image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "gif", "tga", "tiff", "tif", "webp"]
    }

    fn can_decode(&self, data: &[u8]) -> bool {
        // TGA has no magic and is only picked up by extension.
        image::guess_format(data).is_ok_and(|f| f != ImageFormat::Qoi)
    }

    fn decode(&self, data: &[u8]) -> Result<Pixmap, DecodeError> {
        let img = image::load_from_memory(data)
            .map_err(|e| DecodeError::new(self.id(), e.to_string()))?;
        self.to_pixmap(img)
    }

    fn decode_with_extension(&self, data: &[u8], ext: &str) -> Result<Pixmap, DecodeError> {
        let Some(format) = ImageFormat::from_extension(ext) else {
            return self.decode(data);
        };
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| DecodeError::new(self.id(), e.to_string()))?;
        self.to_pixmap(img)
    }
}

impl RasterDecoder {
    fn to_pixmap(&self, img: image::DynamicImage) -> Result<Pixmap, DecodeError> {
        let img = img.to_rgba8();
        let (width, height) = img.dimensions();
        Pixmap::from_rgba(width, height, img.into_raw())
            .ok_or_else(|| DecodeError::new(self.id(), "pixel buffer size mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::DecoderRegistry;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([40, 50, 60]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_png_rgb_becomes_opaque_rgba() {
        let bytes = png_bytes();
        assert!(RasterDecoder.can_decode(&bytes));

        let pixmap = RasterDecoder.decode(&bytes).unwrap();
        assert_eq!(pixmap.pixels(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_tga_is_decoded_by_extension() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        img.put_pixel(1, 0, Rgba([5, 6, 7, 8]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Tga)
            .unwrap();
        assert!(!RasterDecoder.can_decode(&bytes));

        let pixmap = DecoderRegistry::new()
            .decode(&bytes, Some("sheets/hero.TGA"))
            .unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (2, 1));
        assert_eq!(pixmap.pixels(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_tga_without_name_is_unrecognised() {
        let img = RgbaImage::new(1, 1);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Tga)
            .unwrap();
        let err = DecoderRegistry::new().decode(&bytes, None).unwrap_err();
        assert_eq!(err.decoder, "registry");
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = RasterDecoder.decode(b"\x89PNG\r\n\x1a\nbroken").unwrap_err();
        assert_eq!(err.decoder, "raster");
    }

    #[test]
    fn test_does_not_claim_qoi() {
        assert!(!RasterDecoder.can_decode(b"qoif\0\0\0\x01\0\0\0\x01\x04\0"));
    }
}
