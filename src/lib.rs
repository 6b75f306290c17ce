//! Palette-indexed run-length codec for pixel-art trait layers.
//!
//! Layers are encoded to compact hex strings against a palette shared by a whole
//! collection ([`encode::encode_image`]), and rebuilt as scaled rectangles
//! ([`render::build_vector`]) that can be written as SVG or rasterized to PNG.

pub mod batch;
pub mod bounds;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod image;
pub mod palette;
pub mod persist;
pub mod pixel;
pub mod raster;
pub mod render;
pub mod svg;

pub use bounds::Bounds;
pub use decode::{decode_image, DecodedImage};
pub use encode::{encode_image, EncodedImage, Run};
pub use error::CodecError;
pub use palette::Palette;
pub use persist::{Trait, TraitCollection};
pub use pixel::{Pixel, PixelSource};
pub use render::{build_vector, remove_background, Primitive, VectorImage};
