//! Raster → hex run-length encoding.
//!
//! An encoded layer is a hex string:
//!
//! ```text
//! 0x 00 TT RR BB LL (NN CC)*
//!    |  |            |  |
//!    |  |            |  +- palette index of the run (0 = transparent)
//!    |  |            +---- run length (1-255)
//!    |  +----------------- top, right (exclusive), bottom, left
//!    +-------------------- reserved, always 00
//! ```
//!
//! Runs cover the bounding box row by row and may wrap from one row to the next.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bounds::{calc_bounds, Bounds},
    error::Result,
    palette::{ColorIdx, Palette},
    pixel::PixelSource,
};

pub const MAX_RUN_LENGTH: u8 = 255;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub length: u8,
    pub color_idx: ColorIdx,
}

/// Hex encoding of one layer, as persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_parts(bounds: Bounds, runs: &[Run]) -> Self {
        let mut s = String::with_capacity(12 + runs.len() * 4);
        s.push_str("0x00");
        for b in [bounds.top, bounds.right, bounds.bottom, bounds.left] {
            s.push_str(&format!("{:02x}", b));
        }
        for run in runs {
            s.push_str(&format!("{:02x}{:02x}", run.length, run.color_idx));
        }
        EncodedImage(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EncodedImage {
    fn from(s: String) -> Self {
        EncodedImage(s)
    }
}

impl From<&str> for EncodedImage {
    fn from(s: &str) -> Self {
        EncodedImage(s.to_owned())
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse repeated indices into runs of at most [`MAX_RUN_LENGTH`].
pub fn run_length_encode(indices: &[ColorIdx]) -> Vec<Run> {
    let mut runs = vec![];
    for (color_idx, group) in &indices.iter().chunk_by(|&&c| c) {
        let mut remaining = group.count();
        while remaining > 0 {
            let length = remaining.min(MAX_RUN_LENGTH as usize);
            runs.push(Run {
                length: length as u8,
                color_idx,
            });
            remaining -= length;
        }
    }
    runs
}

/// Palette indices of the pixels inside `bounds`, row-major.
fn index_pixels(
    img: &impl PixelSource,
    bounds: Bounds,
    palette: &mut Palette,
) -> Result<Vec<ColorIdx>> {
    let mut indices = Vec::with_capacity(bounds.area() as usize);
    for y in bounds.top as u32..=bounds.bottom as u32 {
        for x in bounds.left as u32..bounds.right as u32 {
            let pixel = img.pixel_at(x, y);
            if pixel.is_transparent() {
                indices.push(0);
            } else {
                indices.push(palette.index_for(pixel.rgb())?);
            }
        }
    }
    Ok(indices)
}

/// Encode a layer, adding any new colors to `palette`.
///
/// The palette is only modified when the whole image encodes successfully, so a
/// failed encode leaves a batch palette as it was.
pub fn encode_image(img: &impl PixelSource, palette: &mut Palette) -> Result<EncodedImage> {
    let bounds = calc_bounds(img)?;
    if bounds.is_empty() {
        return Ok(EncodedImage::from_parts(bounds, &[]));
    }
    let mut staged = palette.clone();
    let indices = index_pixels(img, bounds, &mut staged)?;
    let runs = run_length_encode(&indices);
    *palette = staged;
    Ok(EncodedImage::from_parts(bounds, &runs))
}
