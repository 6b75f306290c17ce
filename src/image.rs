// In-memory RGBA raster, plus PNG import/export for it.
use std::{
    fs::{self, File},
    io::{BufWriter, Cursor},
    path::Path,
};

use anyhow::{bail, ensure, Context, Result};
use log::{debug, info};
use png::{BitDepth, ColorType};

use crate::pixel::{Pixel, PixelSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>, // Row-major, 4 bytes per pixel
}

impl RgbaImage {
    /// Fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        RgbaImage {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            data.len() == width as usize * height as usize * 4,
            "RGBA buffer has {} bytes, expected {} for {}x{}",
            data.len(),
            width as usize * height as usize * 4,
            width,
            height
        );
        Ok(RgbaImage {
            width,
            height,
            data,
        })
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Pixel) -> Self {
        let mut img = RgbaImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.set_pixel(x, y, f(x, y));
            }
        }
        img
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, p: Pixel) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&[p.r, p.g, p.b, p.a]);
    }

    /// Fill the half-open rectangle [x0, x1) x [y0, y1), clipped to the image.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, p: Pixel) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, p);
            }
        }
    }
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_at(&self, x: u32, y: u32) -> Pixel {
        let i = self.offset(x, y);
        Pixel {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }
}

/// Decode PNG bytes of any 8/16-bit color type into RGBA8.
pub fn decode_png(png_bytes: &[u8]) -> Result<RgbaImage> {
    let mut decoder = png::Decoder::new(Cursor::new(png_bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().context("reading PNG header")?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).context("decoding PNG frame")?;
    let bytes = &buf[..info.buffer_size()];
    debug!(
        "PNG {}x{} {:?}/{:?}",
        info.width, info.height, info.color_type, info.bit_depth
    );

    let mut rgba = Vec::with_capacity(info.width as usize * info.height as usize * 4);
    match (info.color_type, info.bit_depth) {
        (ColorType::Rgba, BitDepth::Eight) => rgba.extend_from_slice(bytes),
        (ColorType::Rgb, BitDepth::Eight) => {
            for c in bytes.chunks_exact(3) {
                rgba.extend_from_slice(&[c[0], c[1], c[2], 255]);
            }
        }
        (ColorType::Grayscale, BitDepth::Eight) => {
            for &g in bytes {
                rgba.extend_from_slice(&[g, g, g, 255]);
            }
        }
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => {
            for c in bytes.chunks_exact(2) {
                rgba.extend_from_slice(&[c[0], c[0], c[0], c[1]]);
            }
        }
        (ct, bd) => bail!("Unsupported PNG output format: {:?} {:?}", ct, bd),
    }
    RgbaImage::from_raw(info.width, info.height, rgba)
}

pub fn load_png(path: &Path) -> Result<RgbaImage> {
    info!("Loading {}", path.display());
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_png(&bytes).with_context(|| format!("decoding {}", path.display()))
}

pub fn save_png(path: &Path, img: &RgbaImage) -> Result<()> {
    info!("Saving {}", path.display());
    fs::create_dir_all(path.parent().context("invalid parent directory")?)?;
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), img.width, img.height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(png::Compression::Best);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&img.data)?;
    writer.finish()?;
    Ok(())
}
