use crate::color::PALETTE;
use crate::species::{RosterSpec, SpeciesSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// A named species configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub roster: RosterSpec,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, roster: RosterSpec) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            roster,
        }
    }
}

/// Build a roster spec from populations and a square attraction matrix,
/// assigning palette colors in order
fn roster(populations: &[usize], matrix: &[&[f32]]) -> RosterSpec {
    RosterSpec {
        species: populations
            .iter()
            .enumerate()
            .map(|(i, &population)| SpeciesSpec {
                color: PALETTE[i],
                population,
                attractions: matrix[i].to_vec(),
            })
            .collect(),
    }
}

/// Built-in configurations plus whatever the user has saved to disk
pub struct PresetManager {
    /// Ships with the binary; bound to the number keys
    pub builtin: Vec<Preset>,
    /// Loaded from the config directory at startup
    pub user: Vec<Preset>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    pub fn new() -> Self {
        let mut manager = Self {
            builtin: Vec::new(),
            user: Vec::new(),
        };
        manager.load_builtin_presets();
        manager.load_user_presets();
        manager
    }

    /// Hand-tuned configurations known to produce distinct behaviors
    fn load_builtin_presets(&mut self) {
        self.builtin = vec![
            Preset::new(
                "Trio",
                "Three species with mixed pull and push",
                roster(
                    &[200, 200, 200],
                    &[
                        &[0.3, -0.4, 0.6],
                        &[0.5, 0.1, -0.3],
                        &[-0.2, 0.8, 0.2],
                    ],
                ),
            ),
            Preset::new(
                "Chasers",
                "Red pursues yellow, yellow flees",
                roster(
                    &[150, 150],
                    &[
                        &[0.1, -0.9], // yellow: cohere, avoid red
                        &[1.0, 0.0],  // red: chase yellow
                    ],
                ),
            ),
            Preset::new(
                "Orbits",
                "Mutual attraction with self-repulsion keeps pairs circling",
                roster(
                    &[120, 120],
                    &[
                        &[-0.3, 0.7],
                        &[0.7, -0.3],
                    ],
                ),
            ),
            Preset::new(
                "Cells",
                "Self-cohesion and cross-repulsion form separate blobs",
                roster(
                    &[150, 150, 150, 150],
                    &[
                        &[0.6, -0.2, -0.2, -0.2],
                        &[-0.2, 0.6, -0.2, -0.2],
                        &[-0.2, -0.2, 0.6, -0.2],
                        &[-0.2, -0.2, -0.2, 0.6],
                    ],
                ),
            ),
            Preset::new(
                "Membranes",
                "One species coats the clusters of another",
                roster(
                    &[250, 100],
                    &[
                        &[0.4, 0.3],
                        &[-0.5, 0.5],
                    ],
                ),
            ),
            Preset::new(
                "Soup",
                "Five species, gentle asymmetric couplings",
                roster(
                    &[120, 120, 120, 120, 120],
                    &[
                        &[0.2, 0.4, -0.1, 0.0, -0.3],
                        &[-0.4, 0.2, 0.4, -0.1, 0.0],
                        &[0.0, -0.4, 0.2, 0.4, -0.1],
                        &[-0.1, 0.0, -0.4, 0.2, 0.4],
                        &[0.4, -0.1, 0.0, -0.4, 0.2],
                    ],
                ),
            ),
            Preset::new(
                "Lattice",
                "Uniform repulsion spreads particles evenly",
                roster(
                    &[300, 300],
                    &[
                        &[-0.4, -0.4],
                        &[-0.4, -0.4],
                    ],
                ),
            ),
        ];
    }

    /// Where user presets live on this platform
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atom-life").join("presets"))
    }

    /// Pick up saved presets; unreadable or malformed files are skipped
    fn load_user_presets(&mut self) {
        if let Some(dir) = Self::presets_dir() {
            if dir.exists() {
                if let Ok(entries) = fs::read_dir(&dir) {
                    for entry in entries.flatten() {
                        if entry.path().extension().is_some_and(|e| e == "json") {
                            if let Ok(content) = fs::read_to_string(entry.path()) {
                                if let Ok(preset) = serde_json::from_str::<Preset>(&content) {
                                    self.user.push(preset);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Write a preset to the user presets directory
    pub fn save_preset(&mut self, preset: Preset) -> Result<(), String> {
        let dir = Self::presets_dir().ok_or("Could not determine config directory")?;

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create presets directory: {}", e))?;

        let path = dir.join(format!("{}.json", sanitize(&preset.name)));

        let json = serde_json::to_string_pretty(&preset)
            .map_err(|e| format!("Failed to serialize preset: {}", e))?;

        fs::write(&path, json).map_err(|e| format!("Failed to write preset file: {}", e))?;

        // One in-memory entry per name; the file was already overwritten
        if !self.user.iter().any(|p| p.name == preset.name) {
            self.user.push(preset);
        }

        Ok(())
    }

    /// Remove a user preset from disk and from the in-memory list
    #[allow(dead_code)]
    pub fn delete_preset(&mut self, name: &str) -> Result<(), String> {
        let dir = Self::presets_dir().ok_or("Could not determine config directory")?;

        if let Some(pos) = self.user.iter().position(|p| p.name == name) {
            self.user.remove(pos);
        }

        let path = dir.join(format!("{}.json", sanitize(name)));
        if path.exists() {
            fs::remove_file(&path).map_err(|e| format!("Failed to delete preset file: {}", e))?;
        }

        Ok(())
    }

    /// Built-ins first, then user presets
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Look up a preset by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Names in display order, for error messages and listings
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{SpeciesRoster, MAX_POPULATION, MIN_POPULATION};

    #[test]
    fn test_builtin_presets_are_well_formed() {
        let mut manager = PresetManager {
            builtin: Vec::new(),
            user: Vec::new(),
        };
        manager.load_builtin_presets();
        assert!(!manager.builtin.is_empty());

        for preset in &manager.builtin {
            let n = preset.roster.species.len();
            assert!(n > 0, "{} has no species", preset.name);
            for species in &preset.roster.species {
                assert_eq!(
                    species.attractions.len(),
                    n,
                    "{} has a non-square matrix",
                    preset.name
                );
                assert!((MIN_POPULATION..=MAX_POPULATION).contains(&species.population));
                for &g in &species.attractions {
                    assert!((-1.0..=1.0).contains(&g), "{} coefficient out of range", preset.name);
                }
            }
        }
    }

    #[test]
    fn test_builtin_presets_build_consistent_rosters() {
        let mut manager = PresetManager {
            builtin: Vec::new(),
            user: Vec::new(),
        };
        manager.load_builtin_presets();

        for preset in &manager.builtin {
            let built = SpeciesRoster::from_spec(&preset.roster);
            assert_eq!(built.len(), preset.roster.species.len());
            // Every pair is resolvable, self-pairs included
            for s1 in built.species() {
                for s2 in built.species() {
                    let _ = built.attraction(s1.id, s2.id);
                }
            }
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let mut manager = PresetManager {
            builtin: Vec::new(),
            user: Vec::new(),
        };
        manager.load_builtin_presets();
        assert!(manager.find("trio").is_some());
        assert!(manager.find("TRIO").is_some());
        assert!(manager.find("nope").is_none());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize("My Preset/2"), "My_Preset_2");
        assert_eq!(sanitize("ok-name_1"), "ok-name_1");
    }
}
