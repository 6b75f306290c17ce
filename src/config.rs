use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::persist::load_json;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub collection_path: PathBuf,
    pub output_dir: PathBuf,
    pub export_size: u32, // Output PNG width/height in pixels
    pub background: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            collection_path: PathBuf::from("data/traits.json"),
            output_dir: PathBuf::from("output"),
            export_size: 2000,
            background: "ffffff".to_string(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "traitcodec")
        .context("Unable to open global config directory.")?;
    Ok(project_dirs.config_dir().join("config.json"))
}

/// Load the config at `path` (or the platform default location).
///
/// A missing file is not an error and gives the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_owned(),
        None => get_config_path()?,
    };
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    load_json(&path)
}
