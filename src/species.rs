use crate::color::{palette_color, SpeciesColor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Population bounds enforced by the configuration layer (CLI and UI).
/// The engine itself accepts any count and simply generates that many.
pub const MIN_POPULATION: usize = 10;
pub const MAX_POPULATION: usize = 1000;

/// Default population for a newly added species
pub const DEFAULT_POPULATION: usize = 200;

/// Opaque species identity, allocated by the roster.
///
/// Deliberately independent of the display color so that recoloring a
/// species never merges two species or orphans attraction entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(u32);

/// One configured particle category
#[derive(Debug, Clone)]
pub struct Species {
    pub id: SpeciesId,
    pub color: SpeciesColor,
    pub population: usize,
    /// Signed coefficient in [-1, 1] toward every registered species,
    /// including self. Missing entries read as 0.0.
    attractions: HashMap<SpeciesId, f32>,
}

impl Species {
    /// Coefficient toward `other`, defaulting to no force
    pub fn attraction(&self, other: SpeciesId) -> f32 {
        self.attractions.get(&other).copied().unwrap_or(0.0)
    }
}

/// The full species configuration: an ordered list of species whose
/// attraction maps are kept mutually consistent on every add/remove.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRoster {
    species: Vec<Species>,
    next_id: u32,
}

impl SpeciesRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    /// Species at a roster position (UI selection is positional)
    pub fn at(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    /// Sum of configured populations across all species
    pub fn total_population(&self) -> usize {
        self.species.iter().map(|s| s.population).sum()
    }

    /// Register a new species and return its id.
    ///
    /// Keeps the attraction maps consistent: the new species gets a
    /// zero-filled row (every existing id plus itself), and every existing
    /// species gets a zero entry for the new id.
    pub fn add(&mut self, color: SpeciesColor, population: usize) -> SpeciesId {
        let id = SpeciesId(self.next_id);
        self.next_id += 1;

        let mut attractions = HashMap::with_capacity(self.species.len() + 1);
        attractions.insert(id, 0.0);
        for existing in &mut self.species {
            attractions.insert(existing.id, 0.0);
            existing.attractions.insert(id, 0.0);
        }

        self.species.push(Species {
            id,
            color,
            population,
            attractions,
        });
        id
    }

    /// Add a species with the next palette color and default population
    pub fn add_default(&mut self) -> SpeciesId {
        let color = palette_color(self.next_id as usize);
        self.add(color, DEFAULT_POPULATION)
    }

    /// Remove a species, purging its attraction entries from every
    /// remaining species. Returns false if the id is unknown.
    pub fn remove(&mut self, id: SpeciesId) -> bool {
        let Some(pos) = self.species.iter().position(|s| s.id == id) else {
            return false;
        };
        self.species.remove(pos);
        for remaining in &mut self.species {
            remaining.attractions.remove(&id);
        }
        true
    }

    /// Coefficient applied to `from`'s members for each `to` member in range
    pub fn attraction(&self, from: SpeciesId, to: SpeciesId) -> f32 {
        self.get(from).map(|s| s.attraction(to)).unwrap_or(0.0)
    }

    /// Set a coefficient, clamped to [-1, 1]. Unknown ids are ignored;
    /// an unknown id here is a caller defect, not a runtime fault.
    pub fn set_attraction(&mut self, from: SpeciesId, to: SpeciesId, value: f32) {
        if self.get(to).is_none() {
            return;
        }
        if let Some(species) = self.species.iter_mut().find(|s| s.id == from) {
            species.attractions.insert(to, value.clamp(-1.0, 1.0));
        }
    }

    pub fn set_population(&mut self, id: SpeciesId, population: usize) {
        if let Some(species) = self.species.iter_mut().find(|s| s.id == id) {
            species.population = population;
        }
    }

    pub fn set_color(&mut self, id: SpeciesId, color: SpeciesColor) {
        if let Some(species) = self.species.iter_mut().find(|s| s.id == id) {
            species.color = color;
        }
    }

    /// Fill every coefficient with a uniform draw from [-1, 1]
    pub fn randomize_attractions(&mut self, rng: &mut impl Rng) {
        let ids: Vec<SpeciesId> = self.species.iter().map(|s| s.id).collect();
        for species in &mut self.species {
            for &id in &ids {
                species.attractions.insert(id, rng.gen_range(-1.0..=1.0));
            }
        }
    }

    /// Build the serializable form (attraction rows indexed by roster order)
    pub fn to_spec(&self) -> RosterSpec {
        let ids: Vec<SpeciesId> = self.species.iter().map(|s| s.id).collect();
        RosterSpec {
            species: self
                .species
                .iter()
                .map(|s| SpeciesSpec {
                    color: s.color,
                    population: s.population,
                    attractions: ids.iter().map(|&id| s.attraction(id)).collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a roster from its serialized form. Ids are freshly
    /// allocated; short rows read as 0.0 and values are clamped.
    pub fn from_spec(spec: &RosterSpec) -> Self {
        let mut roster = Self::new();
        let ids: Vec<SpeciesId> = spec
            .species
            .iter()
            .map(|s| roster.add(s.color, s.population.clamp(MIN_POPULATION, MAX_POPULATION)))
            .collect();
        for (row, species) in spec.species.iter().enumerate() {
            for (col, &value) in species.attractions.iter().enumerate() {
                if col < ids.len() {
                    roster.set_attraction(ids[row], ids[col], value);
                }
            }
        }
        roster
    }
}

/// Serializable roster: display color, population, and an attraction row
/// per species, indexed by position so the JSON stays human-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSpec {
    pub species: Vec<SpeciesSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub color: SpeciesColor,
    pub population: usize,
    pub attractions: Vec<f32>,
}
