use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use traitcodec::{
    batch::{encode_directory, export_collection, render_traits},
    config::{load_config, Config},
    decode_image,
    palette::parse_hex_color,
    persist::{load_collection, save_collection},
    raster::rasterize,
    remove_background,
    svg::to_svg,
    TraitCollection,
};

#[derive(Parser, Debug)]
#[command(version, about = "Encode trait PNGs as run-length hex and render them back")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trait collection JSON (overrides the config)
    #[arg(long, global = true)]
    collection: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode every PNG in a directory against the collection palette
    Encode {
        dir: PathBuf,

        /// Store the result under this category and save the collection
        #[arg(long)]
        category: Option<String>,
    },
    /// Export backgrounds and isolated traits as PNGs
    Export {
        #[arg(long)]
        size: Option<u32>,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Only export traits with these filenames
        #[arg(long)]
        only: Vec<String>,
    },
    /// Compose traits (given as category/filename) into an SVG or PNG
    Render {
        #[arg(required = true)]
        traits: Vec<String>,

        #[arg(long)]
        output: PathBuf,

        #[arg(long)]
        background: Option<String>,

        /// Leave out the background fill
        #[arg(long)]
        transparent: bool,

        /// Pixel size for PNG output
        #[arg(long)]
        size: Option<u32>,
    },
    /// Print the bounds and runs of an encoded layer
    Inspect { data: String },
}

fn open_collection(config: &Config) -> Result<TraitCollection> {
    if config.collection_path.exists() {
        load_collection(&config.collection_path)
    } else {
        warn!(
            "{} not found, starting from an empty palette",
            config.collection_path.display()
        );
        Ok(TraitCollection::default())
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = args.collection {
        config.collection_path = path;
    }

    match args.command {
        Command::Encode { dir, category } => {
            let mut collection = open_collection(&config)?;
            let report = encode_directory(&dir, &mut collection.palette)?;
            for color in &report.new_colors {
                info!("New palette color: {}", color);
            }
            match category {
                Some(category) => {
                    collection.merge_traits(&category, report.traits);
                    save_collection(&config.collection_path, &collection)?;
                }
                None => {
                    println!("{}", serde_json::to_string_pretty(&report.traits)?);
                    println!("{}", serde_json::to_string_pretty(&collection.palette)?);
                }
            }
            if !report.skipped.is_empty() {
                warn!("{} file(s) could not be encoded", report.skipped.len());
            }
        }
        Command::Export { size, output, only } => {
            let collection = load_collection(&config.collection_path)?;
            let size = size.unwrap_or(config.export_size);
            let out_dir = output.unwrap_or(config.output_dir);
            export_collection(&collection, &out_dir, size, &only)?;
        }
        Command::Render {
            traits,
            output,
            background,
            transparent,
            size,
        } => {
            let collection = load_collection(&config.collection_path)?;
            let mut selection = vec![];
            for t in &traits {
                let (category, filename) = t
                    .split_once('/')
                    .with_context(|| format!("expected category/filename, got {}", t))?;
                selection.push((category.to_string(), filename.to_string()));
            }
            let background = background.unwrap_or(config.background);
            let Some(bg) = parse_hex_color(&background) else {
                bail!("invalid background color: {}", background);
            };
            let mut image = render_traits(&collection, &selection, bg)?;
            if transparent {
                image = remove_background(image);
            }
            match output.extension().and_then(|e| e.to_str()) {
                Some("svg") => {
                    info!("Saving {}", output.display());
                    fs::write(&output, to_svg(&image))?;
                }
                Some("png") => {
                    let size = size.unwrap_or(config.export_size);
                    traitcodec::image::save_png(&output, &rasterize(&image, size))?;
                }
                _ => bail!("output must end in .svg or .png: {}", output.display()),
            }
        }
        Command::Inspect { data } => {
            let decoded = decode_image(&data)?;
            let b = decoded.bounds;
            println!(
                "bounds: top={} right={} bottom={} left={} ({}x{})",
                b.top,
                b.right,
                b.bottom,
                b.left,
                b.width(),
                b.height()
            );
            for run in &decoded.runs {
                println!("{:3} x {}", run.length, run.color_idx);
            }
        }
    }
    Ok(())
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Args::parse())
}
