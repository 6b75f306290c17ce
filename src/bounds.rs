use crate::{
    error::{CodecError, Result},
    pixel::PixelSource,
};

/// Smallest box holding every non-transparent pixel of a layer.
///
/// `top`, `bottom` and `left` are inclusive, `right` is exclusive. Each bound is a
/// single byte in the encoding, which caps a layer at 255 units per axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub top: u8,
    pub right: u8,
    pub bottom: u8,
    pub left: u8,
}

impl Bounds {
    /// Bounds of a layer with no visible pixels.
    pub const EMPTY: Bounds = Bounds {
        top: 0,
        right: 0,
        bottom: 0,
        left: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom < self.top
    }

    pub fn width(&self) -> u32 {
        (self.right as u32).saturating_sub(self.left as u32)
    }

    pub fn height(&self) -> u32 {
        if self.bottom < self.top {
            0
        } else {
            self.bottom as u32 - self.top as u32 + 1
        }
    }

    /// Number of pixels covered, which is also the sum of the run lengths.
    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left as u32
            && x < self.right as u32
            && y >= self.top as u32
            && y <= self.bottom as u32
    }
}

fn bound_byte(what: &'static str, value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| CodecError::LimitExceeded {
        what,
        value: value as usize,
        max: u8::MAX as usize,
    })
}

fn row_is_transparent(img: &impl PixelSource, y: u32) -> bool {
    (0..img.width()).all(|x| img.pixel_at(x, y).is_transparent())
}

fn column_is_transparent(img: &impl PixelSource, x: u32) -> bool {
    (0..img.height()).all(|y| img.pixel_at(x, y).is_transparent())
}

/// Find the bounding box of all pixels with non-zero alpha.
///
/// A fully transparent image yields [`Bounds::EMPTY`].
pub fn calc_bounds(img: &impl PixelSource) -> Result<Bounds> {
    let (width, height) = (img.width(), img.height());

    let mut top = 0;
    while top < height && row_is_transparent(img, top) {
        top += 1;
    }
    if top == height {
        return Ok(Bounds::EMPTY);
    }

    // Some row is visible, so these scans stop before crossing `top`/`left`.
    let mut bottom = height - 1;
    while bottom > top && row_is_transparent(img, bottom) {
        bottom -= 1;
    }

    let mut left = 0;
    while left < width && column_is_transparent(img, left) {
        left += 1;
    }

    let mut right = width - 1;
    while right > left && column_is_transparent(img, right) {
        right -= 1;
    }

    Ok(Bounds {
        top: bound_byte("top bound", top)?,
        right: bound_byte("right bound", right + 1)?,
        bottom: bound_byte("bottom bound", bottom)?,
        left: bound_byte("left bound", left)?,
    })
}
