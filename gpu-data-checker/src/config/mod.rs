//! Configuration du contrôle

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};
use gpu_check::CheckConfig;

/// Presets embarqués
pub const PRESETS: [&str; 2] = ["gpu", "strict"];

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Seuils du contrôle
    #[serde(flatten)]
    pub check: CheckConfig,

    /// Attribut portant l'identifiant des features
    #[serde(default = "default_fid_field")]
    pub fid_field: String,
}

fn default_fid_field() -> String {
    "gid".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check: CheckConfig::default(),
            fid_field: default_fid_field(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.check.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "gpu" => Self::load_embedded(include_str!("presets/gpu.json")),
            "strict" => Self::load_embedded(include_str!("presets/strict.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if PRESETS.contains(&name_or_path) {
            Self::from_preset(name_or_path)
        } else {
            Self::load(Path::new(name_or_path))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}
