// Nearest-neighbor rasterizer for vector images.
use crate::{
    image::RgbaImage,
    pixel::Pixel,
    render::{Primitive, VectorImage},
};

/// First output pixel whose center lies at or past canvas coordinate `u`.
fn edge(u: u32, canvas: u32, size: u32) -> u32 {
    ((2 * u as u64 * size as u64 + canvas as u64 - 1) / (2 * canvas as u64)) as u32
}

/// Paint `image` onto a transparent `size` x `size` RGBA buffer.
///
/// A pixel takes the color of the last primitive covering its center, which keeps
/// edges crisp at any output size.
pub fn rasterize(image: &VectorImage, size: u32) -> RgbaImage {
    let mut out = RgbaImage::new(size, size);
    if image.size == 0 {
        return out;
    }
    for p in &image.primitives {
        match *p {
            Primitive::Background { color } => {
                out.fill_rect(0, 0, size, size, Pixel::from_rgb(color));
            }
            Primitive::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                out.fill_rect(
                    edge(x, image.size, size),
                    edge(y, image.size, size),
                    edge(x + width, image.size, size),
                    edge(y + height, image.size, size),
                    Pixel::from_rgb(color),
                );
            }
        }
    }
    out
}
