pub type ColorValue = u8; // Channel value (0-255)
pub type ColorRgb = u32; // Packed 24-bit RGB (0xRRGGBB)

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: ColorValue,
    pub g: ColorValue,
    pub b: ColorValue,
    pub a: ColorValue,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub fn opaque(r: ColorValue, g: ColorValue, b: ColorValue) -> Self {
        Pixel { r, g, b, a: 255 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn rgb(&self) -> ColorRgb {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn from_rgb(rgb: ColorRgb) -> Self {
        Pixel::opaque((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

/// Read access to a raster image.
///
/// This is the only thing the encoder needs from an image backend; coordinates
/// passed to `pixel_at` are always within `width() x height()`.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel_at(&self, x: u32, y: u32) -> Pixel;
}
