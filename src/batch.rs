// Batch drivers: encode a directory of PNGs, export a collection back to PNGs.
//
// A single bad item is logged and skipped; it never aborts the rest of the batch.
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use log::{error, info, warn};

use crate::{
    encode::{encode_image, EncodedImage},
    image::{load_png, save_png},
    palette::{parse_hex_color, Palette},
    persist::{Trait, TraitCollection},
    pixel::ColorRgb,
    raster::rasterize,
    render::{build_vector, isolated_layer, VectorImage},
};

#[derive(Debug, Default)]
pub struct EncodeReport {
    pub traits: Vec<Trait>,
    pub new_colors: Vec<String>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: usize,
    pub skipped: usize,
}

fn png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(dir.is_dir(), "{} is not a directory", dir.display());
    let pattern = format!("{}/*.png", glob::Pattern::escape(&dir.display().to_string()));
    let mut paths = vec![];
    for entry in glob::glob(&pattern)? {
        paths.push(entry?);
    }
    Ok(paths.into_iter().sorted().collect())
}

fn encode_file(path: &Path, palette: &mut Palette) -> Result<Trait> {
    let filename = path
        .file_stem()
        .context("file has no name")?
        .to_string_lossy()
        .into_owned();
    let img = load_png(path)?;
    let data = encode_image(&img, palette)?;
    Ok(Trait { filename, data })
}

/// Encode every `*.png` in `dir`, in filename order, against one shared palette.
pub fn encode_directory(dir: &Path, palette: &mut Palette) -> Result<EncodeReport> {
    let colors_before = palette.len();
    let mut report = EncodeReport::default();
    for path in png_files(dir)? {
        match encode_file(&path, palette) {
            Ok(t) => {
                info!("Encoded {}", t.filename);
                report.traits.push(t);
            }
            Err(e) => {
                error!("Skipping {}: {:#}", path.display(), e);
                report.skipped.push(path);
            }
        }
    }
    report.new_colors = palette.colors()[colors_before..].to_vec();
    info!(
        "Encoded {} images ({} skipped), palette size {} ({} new)",
        report.traits.len(),
        report.skipped.len(),
        palette.len(),
        report.new_colors.len()
    );
    Ok(report)
}

/// Compose the named traits, in order, over `background`.
pub fn render_traits(
    collection: &TraitCollection,
    selection: &[(String, String)],
    background: ColorRgb,
) -> Result<VectorImage> {
    let mut parts: Vec<&EncodedImage> = vec![];
    for (category, filename) in selection {
        let t = collection
            .find_trait(category, filename)
            .with_context(|| format!("trait {}/{} not found", category, filename))?;
        parts.push(&t.data);
    }
    Ok(build_vector(parts, &collection.palette, background)?)
}

fn export_one(image: &VectorImage, size: u32, path: &Path) -> Result<()> {
    save_png(path, &rasterize(image, size))
}

/// Write every background and every isolated trait as a `size` x `size` PNG.
///
/// Backgrounds go to `backgrounds/bg-<color>.png`, traits to
/// `<category>/<filename>.png`. When `only` is non-empty, only traits with those
/// filenames are exported (backgrounds are then skipped).
pub fn export_collection(
    collection: &TraitCollection,
    out_dir: &Path,
    size: u32,
    only: &[String],
) -> Result<ExportReport> {
    ensure!(size > 0, "export size must be positive");
    let mut report = ExportReport::default();

    if only.is_empty() {
        info!("Exporting backgrounds...");
        for color in &collection.bgcolors {
            let Some(rgb) = parse_hex_color(color) else {
                warn!("Skipping invalid background color {:?}", color);
                report.skipped += 1;
                continue;
            };
            let path = out_dir.join("backgrounds").join(format!("bg-{}.png", color));
            let result = build_vector(std::iter::empty::<&EncodedImage>(), &collection.palette, rgb)
                .map_err(anyhow::Error::from)
                .and_then(|image| export_one(&image, size, &path));
            match result {
                Ok(()) => report.written += 1,
                Err(e) => {
                    error!("Failed to export {}: {:#}", path.display(), e);
                    report.skipped += 1;
                }
            }
        }
    }

    for (category, traits) in collection.images.iter() {
        info!("Exporting {}...", category);
        for t in traits {
            if !only.is_empty() && !only.contains(&t.filename) {
                continue;
            }
            let path = out_dir.join(category).join(format!("{}.png", t.filename));
            let result = isolated_layer(&t.data, &collection.palette)
                .map_err(anyhow::Error::from)
                .and_then(|image| export_one(&image, size, &path));
            match result {
                Ok(()) => report.written += 1,
                Err(e) => {
                    error!("Failed to export {}: {:#}", path.display(), e);
                    report.skipped += 1;
                }
            }
        }
    }

    info!(
        "Exported {} PNGs to {} ({} skipped)",
        report.written,
        out_dir.display(),
        report.skipped
    );
    Ok(report)
}
