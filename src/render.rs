//! Rebuilds rectangle primitives from encoded layers.
//!
//! Every source pixel becomes a `SCALE` x `SCALE` square on a fixed
//! `CANVAS_SIZE` x `CANVAS_SIZE` canvas. Runs are drawn left to right starting at
//! the top-left corner of the layer's bounds; a run that reaches the right bound
//! continues at the left bound of the next row, so it is split into one rectangle
//! per row it touches.

use crate::{
    decode::{decode_image, DecodedImage},
    encode::EncodedImage,
    error::{CodecError, Result},
    palette::{parse_hex_color, ColorIdx, Palette},
    pixel::ColorRgb,
};

pub const SCALE: u32 = 10;
pub const CANVAS_SIZE: u32 = 320;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// Solid fill of the whole canvas.
    Background { color: ColorRgb },
    /// Filled rectangle in canvas units.
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: ColorRgb,
    },
}

/// Vector form of one or more composited layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorImage {
    pub size: u32,
    pub crisp_edges: bool,
    pub primitives: Vec<Primitive>,
}

impl VectorImage {
    fn with_background(color: ColorRgb) -> Self {
        VectorImage {
            size: CANVAS_SIZE,
            crisp_edges: true,
            primitives: vec![Primitive::Background { color }],
        }
    }

    /// Rectangles only, skipping any background fill.
    pub fn rects(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
    }
}

fn palette_rgb(palette: &Palette, idx: ColorIdx) -> Result<ColorRgb> {
    palette
        .color(idx)
        .and_then(parse_hex_color)
        .ok_or(CodecError::DataIntegrity {
            index: idx,
            palette_len: palette.len(),
        })
}

/// Append the rectangles of one decoded layer to `out`.
pub fn push_layer_rects(
    image: &DecodedImage,
    palette: &Palette,
    out: &mut Vec<Primitive>,
) -> Result<()> {
    let bounds = image.bounds;
    let (left, right) = (bounds.left as u32, bounds.right as u32);
    let mut x = left;
    let mut y = bounds.top as u32;

    for run in &image.runs {
        let color = match run.color_idx {
            0 => None,
            idx => Some(palette_rgb(palette, idx)?),
        };
        let mut remaining = run.length as u32;
        while remaining > 0 {
            let draw_length = remaining.min(right.saturating_sub(x));
            if draw_length == 0 || y > bounds.bottom as u32 {
                return Err(CodecError::MalformedEncoding(
                    "runs extend past the layer bounds".to_string(),
                ));
            }
            if let Some(color) = color {
                out.push(Primitive::Rect {
                    x: x * SCALE,
                    y: y * SCALE,
                    width: draw_length * SCALE,
                    height: SCALE,
                    color,
                });
            }
            x += draw_length;
            if x == right {
                x = left;
                y += 1;
            }
            remaining -= draw_length;
        }
    }
    Ok(())
}

/// Composite `parts` in order over a solid background.
///
/// All parts must have been encoded against `palette`.
pub fn build_vector<'a>(
    parts: impl IntoIterator<Item = &'a EncodedImage>,
    palette: &Palette,
    background: ColorRgb,
) -> Result<VectorImage> {
    let mut image = VectorImage::with_background(background);
    for part in parts {
        let decoded = decode_image(part)?;
        push_layer_rects(&decoded, palette, &mut image.primitives)?;
    }
    Ok(image)
}

/// Drop the leading full-canvas fill, if there is one.
///
/// Only the first primitive is considered; anything else is returned unchanged.
pub fn remove_background(mut image: VectorImage) -> VectorImage {
    if let Some(Primitive::Background { .. }) = image.primitives.first() {
        image.primitives.remove(0);
    }
    image
}

/// A single layer on a transparent canvas.
pub fn isolated_layer(part: &EncodedImage, palette: &Palette) -> Result<VectorImage> {
    let image = build_vector([part], palette, 0xffffff)?;
    Ok(remove_background(image))
}
