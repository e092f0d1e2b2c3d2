use crate::species::RosterSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to reproduce a run: the roster, the speed, and
/// (optionally) the placement seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bumped if the on-disk layout ever changes
    pub version: u32,
    /// Species roster: colors, populations, attraction matrix
    pub roster: RosterSpec,
    /// Ticks per frame (app-level)
    pub ticks_per_frame: usize,
    /// RNG seed for reproducible particle placement
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Write the config as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, json).map_err(|e| format!("Failed to write config file: {}", e))?;
        Ok(())
    }

    /// Read a config written by `save_to_file`
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            roster: RosterSpec { species: Vec::new() },
            ticks_per_frame: 1,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use crate::species::SpeciesSpec;
    use tempfile::NamedTempFile;

    fn sample_config() -> AppConfig {
        AppConfig {
            version: 1,
            roster: RosterSpec {
                species: vec![
                    SpeciesSpec {
                        color: PALETTE[0],
                        population: 200,
                        attractions: vec![0.25, -0.5],
                    },
                    SpeciesSpec {
                        color: PALETTE[1],
                        population: 350,
                        attractions: vec![1.0, 0.0],
                    },
                ],
            },
            ticks_per_frame: 3,
            seed: Some(1234),
        }
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = sample_config();

        let json = serde_json::to_string_pretty(&config).unwrap();

        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.version, config.version);
        assert_eq!(parsed.ticks_per_frame, config.ticks_per_frame);
        assert_eq!(parsed.seed, config.seed);
        assert_eq!(parsed.roster.species.len(), 2);
        assert_eq!(parsed.roster.species[0].color, PALETTE[0]);
        assert_eq!(parsed.roster.species[0].population, 200);
        assert_eq!(parsed.roster.species[0].attractions, vec![0.25, -0.5]);
        assert_eq!(parsed.roster.species[1].attractions, vec![1.0, 0.0]);
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = sample_config();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.roster.species.len(), config.roster.species.len());
        assert_eq!(loaded.seed, Some(1234));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(result.is_err());
    }
}
