//! Tests for the document bridge and the manifest importer.

mod bridge_tests;

/// Hand-assemble a QOI stream of opaque RGB pixels.
pub(super) fn qoi_rgb(width: u32, height: u32, pixels: &[[u8; 3]]) -> Vec<u8> {
    let mut bytes = b"qoif".to_vec();
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[3, 0]);
    for [r, g, b] in pixels {
        bytes.extend_from_slice(&[0xFE, *r, *g, *b]);
    }
    bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    bytes
}
