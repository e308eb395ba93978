use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use log::debug;
use serde::Deserialize;

use crate::flavor::{Flavor, CIRCUIT_TRACKS};

const CONFIG_FILE: &str = "circuit-pack.toml";

/// Settings for a SysEx to pack conversion
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Pack name written to the index
    pub name: String,
    /// Pack color written to the index
    pub color: String,
    /// Target flavor, e.g. "circuit-tracks"
    pub flavor: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            name: "pack".to_string(),
            color: String::new(),
            flavor: "circuit-tracks".to_string(),
        }
    }
}

impl ConvertConfig {
    /// The configured flavor, if it names a known one
    pub fn target_flavor(&self) -> Option<&'static Flavor> {
        Flavor::from_name(&self.flavor)
    }

    pub fn default_flavor() -> &'static Flavor {
        &CIRCUIT_TRACKS
    }
}

pub fn get_config_path() -> PathBuf {
    // A config next to the working directory wins over the user one
    let local_path = PathBuf::from(CONFIG_FILE);
    if local_path.exists() {
        return local_path;
    }

    let base = config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("circuit-pack").join("config.toml")
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConvertConfig, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    debug!("Loading config from {}", path.display());

    let text = fs::read_to_string(path)?;
    let config: ConvertConfig = toml::from_str(&text)?;

    if config.target_flavor().is_none() {
        return Err(format!("unknown flavor in {}: {}", path.display(), config.flavor).into());
    }

    Ok(config)
}
