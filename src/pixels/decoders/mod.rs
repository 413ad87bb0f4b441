//! Built-in image decoders.

mod qoi;
mod raster;

pub use qoi::QoiDecoder;
pub use raster::RasterDecoder;
