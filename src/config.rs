/// User-tunable settings, persisted as JSON next to the working directory.
///
/// Unknown or missing fields fall back to defaults so older config files
/// keep loading across releases.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::baseline::AlsParams;

pub const CONFIG_FILE: &str = "raman-studio.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// X-distance (cm⁻¹) between discretized baseline control points.
    pub discretize_step: f64,
    /// Marker radius for control points, in plot pixels.
    pub control_point_radius: f32,
    /// Pointer pick radius for grabbing a control point, in plot pixels.
    pub pick_radius: f32,
    /// Baseline estimator parameters.
    pub als: AlsParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discretize_step: 50.0,
            control_point_radius: 5.0,
            pick_radius: 12.0,
            als: AlsParams::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Load the config, falling back to defaults (with a logged warning)
    /// when the file is absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Invalid config {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("does-not-exist.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "discretize_step": 25.0 }"#).unwrap();
        assert_eq!(config.discretize_step, 25.0);
        assert_eq!(config.pick_radius, Config::default().pick_radius);
        assert_eq!(config.als.lambda, 1e5);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut config = Config::default();
        config.discretize_step = 33.0;
        let path = std::env::temp_dir().join("raman_studio_config_test.json");
        config.save(&path).unwrap();
        let loaded = Config::load_or_default(&path);
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
