use crate::braille;
use crate::color::{palette_color, PALETTE};
use crate::config::AppConfig;
use crate::presets::{Preset, PresetManager};
use crate::simulation::World;
use crate::species::{SpeciesRoster, DEFAULT_POPULATION, MAX_POPULATION, MIN_POPULATION};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Bounds for ticks per frame; every tick is a full O(n^2) pass
pub const MIN_SPEED: usize = 1;
pub const MAX_SPEED: usize = 10;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Species,
    Population,
    Target,
    Attraction,
    Speed,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Species,
            Focus::Species => Focus::Population,
            Focus::Population => Focus::Target,
            Focus::Target => Focus::Attraction,
            Focus::Attraction => Focus::Speed,
            Focus::Speed => Focus::Species, // Loop back
        }
    }

    /// Shift+Tab cycles in reverse
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Speed,
            Focus::Species => Focus::Speed, // Loop back
            Focus::Population => Focus::Species,
            Focus::Target => Focus::Population,
            Focus::Attraction => Focus::Target,
            Focus::Speed => Focus::Attraction,
        }
    }

    /// Line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Species => 0,
            Focus::Population => 1,
            Focus::Target => 2,
            Focus::Attraction => 3,
            Focus::Speed => 4,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state: owns the world, the species configuration,
/// and the UI bookkeeping around them
pub struct App {
    pub world: World,
    pub roster: SpeciesRoster,
    pub presets: PresetManager,
    pub focus: Focus,
    /// Roster index of the species being edited
    pub selected: usize,
    /// Roster index of the attraction target for the selected species
    pub target: usize,
    pub ticks_per_frame: usize,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    seed: Option<u64>,
    rng: StdRng,
}

impl App {
    /// Default starting state: three species with a random attraction
    /// matrix, arena sized to the canvas
    pub fn new(canvas_width: u16, canvas_height: u16, seed: Option<u64>) -> Self {
        let (arena_width, arena_height) = braille::calculate_arena_size(canvas_width, canvas_height);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut app = Self {
            world: World::new(arena_width, arena_height, seed),
            roster: SpeciesRoster::new(),
            presets: PresetManager::new(),
            focus: Focus::Controls,
            selected: 0,
            target: 0,
            ticks_per_frame: 1,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            seed,
            rng,
        };
        for i in 0..3 {
            app.roster.add(palette_color(i), DEFAULT_POPULATION);
        }
        app.roster.randomize_attractions(&mut app.rng);
        app.world.populate(&app.roster);
        app
    }

    /// Run simulation ticks for the current frame
    pub fn tick(&mut self) {
        for _ in 0..self.ticks_per_frame {
            self.world.tick(&self.roster);
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.world.toggle_pause();
    }

    /// Regenerate random positions under the current configuration
    pub fn reset(&mut self) {
        self.world.reset(&self.roster);
    }

    /// Rebuild the particle set after a configuration change
    pub fn reconfigure(&mut self) {
        self.world.reconfigure(&self.roster);
        self.clamp_selection();
    }

    /// Add a species with the next palette color and rebuild
    pub fn add_species(&mut self) {
        self.roster.add_default();
        self.selected = self.roster.len() - 1;
        self.reconfigure();
    }

    /// Remove the selected species and rebuild
    pub fn remove_selected(&mut self) {
        if let Some(species) = self.roster.at(self.selected) {
            let id = species.id;
            self.roster.remove(id);
            self.reconfigure();
        }
    }

    /// Cycle the selected species' display color through the palette.
    /// Identity is untouched, so attraction entries are unaffected.
    pub fn cycle_selected_color(&mut self) {
        if let Some(species) = self.roster.at(self.selected) {
            let id = species.id;
            let next = PALETTE
                .iter()
                .position(|&c| c == species.color)
                .map_or(0, |i| i + 1);
            self.roster.set_color(id, palette_color(next));
        }
    }

    /// Redraw every attraction coefficient uniformly from [-1, 1]
    pub fn randomize_matrix(&mut self) {
        self.roster.randomize_attractions(&mut self.rng);
    }

    /// Adjust the selected species' population and rebuild
    pub fn adjust_population(&mut self, delta: i32) {
        if let Some(species) = self.roster.at(self.selected) {
            let id = species.id;
            let population = (species.population as i32 + delta)
                .clamp(MIN_POPULATION as i32, MAX_POPULATION as i32) as usize;
            self.roster.set_population(id, population);
            self.reconfigure();
        }
    }

    /// Adjust the selected->target coefficient. Takes effect live; the
    /// world re-reads coefficients every tick, so no rebuild here.
    pub fn adjust_attraction(&mut self, delta: f32) {
        if let (Some(from), Some(to)) = (self.roster.at(self.selected), self.roster.at(self.target)) {
            let (from, to) = (from.id, to.id);
            let value = self.roster.attraction(from, to) + delta;
            self.roster.set_attraction(from, to, value);
        }
    }

    pub fn select_next_species(&mut self) {
        if !self.roster.is_empty() {
            self.selected = (self.selected + 1) % self.roster.len();
        }
    }

    pub fn select_prev_species(&mut self) {
        if !self.roster.is_empty() {
            self.selected = (self.selected + self.roster.len() - 1) % self.roster.len();
        }
    }

    pub fn select_next_target(&mut self) {
        if !self.roster.is_empty() {
            self.target = (self.target + 1) % self.roster.len();
        }
    }

    pub fn select_prev_target(&mut self) {
        if !self.roster.is_empty() {
            self.target = (self.target + self.roster.len() - 1) % self.roster.len();
        }
    }

    /// Replace the whole configuration with a built-in preset (0-based)
    pub fn apply_preset(&mut self, index: usize) {
        if let Some(preset) = self.presets.builtin.get(index) {
            self.roster = SpeciesRoster::from_spec(&preset.roster);
            self.selected = 0;
            self.target = 0;
            self.reconfigure();
        }
    }

    /// Replace the whole configuration from an imported config
    pub fn apply_config(&mut self, config: &AppConfig) {
        self.roster = SpeciesRoster::from_spec(&config.roster);
        self.ticks_per_frame = config.ticks_per_frame.clamp(MIN_SPEED, MAX_SPEED);
        self.selected = 0;
        self.target = 0;
        self.reconfigure();
    }

    /// Persist the current roster as a user preset
    pub fn save_custom_preset(&mut self) -> Result<(), String> {
        let preset = Preset::new("Custom", "Saved from a running session", self.roster.to_spec());
        self.presets.save_preset(preset)
    }

    /// Snapshot the current configuration for export
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            version: 1,
            roster: self.roster.to_spec(),
            ticks_per_frame: self.ticks_per_frame,
            seed: self.seed,
        }
    }

    /// Resize the arena to match a new canvas size
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        let (arena_width, arena_height) = braille::calculate_arena_size(canvas_width, canvas_height);
        self.world.resize(arena_width, arena_height, &self.roster);
    }

    pub fn increase_speed(&mut self) {
        self.ticks_per_frame = (self.ticks_per_frame + 1).min(MAX_SPEED);
    }

    pub fn decrease_speed(&mut self) {
        self.ticks_per_frame = self.ticks_per_frame.saturating_sub(1).max(MIN_SPEED);
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Species => self.select_next_species(),
            Focus::Population => self.adjust_population(10),
            Focus::Target => self.select_next_target(),
            Focus::Attraction => self.adjust_attraction(0.05),
            Focus::Speed => self.increase_speed(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Species => self.select_prev_species(),
            Focus::Population => self.adjust_population(-10),
            Focus::Target => self.select_prev_target(),
            Focus::Attraction => self.adjust_attraction(-0.05),
            Focus::Speed => self.decrease_speed(),
        }
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    fn clamp_selection(&mut self) {
        let last = self.roster.len().saturating_sub(1);
        self.selected = self.selected.min(last);
        self.target = self.target.min(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(40, 20, Some(11))
    }

    #[test]
    fn test_new_app_is_populated_and_running() {
        let app = test_app();
        assert_eq!(app.roster.len(), 3);
        assert_eq!(app.world.particles().len(), app.roster.total_population());
        assert!(app.world.running);
    }

    #[test]
    fn test_pause_blocks_tick() {
        let mut app = test_app();
        app.toggle_pause();
        let before: Vec<(f32, f32)> = app.world.particles().iter().map(|p| (p.x, p.y)).collect();
        app.tick();
        let after: Vec<(f32, f32)> = app.world.particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_and_remove_species_rebuild_world() {
        let mut app = test_app();
        app.add_species();
        assert_eq!(app.roster.len(), 4);
        assert_eq!(app.selected, 3);
        assert_eq!(app.world.particles().len(), app.roster.total_population());

        app.remove_selected();
        assert_eq!(app.roster.len(), 3);
        assert!(app.selected < app.roster.len());
        assert_eq!(app.world.particles().len(), app.roster.total_population());
    }

    #[test]
    fn test_population_adjust_clamps_and_rebuilds() {
        let mut app = test_app();
        app.adjust_population(100_000);
        assert_eq!(app.roster.species()[0].population, MAX_POPULATION);
        assert_eq!(app.world.particles().len(), app.roster.total_population());

        app.adjust_population(-100_000);
        assert_eq!(app.roster.species()[0].population, MIN_POPULATION);
    }

    #[test]
    fn test_attraction_adjust_is_live() {
        let mut app = test_app();
        let from = app.roster.species()[0].id;
        let to = app.roster.species()[1].id;
        app.selected = 0;
        app.target = 1;
        let count_before = app.world.particles().len();
        let before = app.roster.attraction(from, to);

        app.adjust_attraction(0.05);
        let after = app.roster.attraction(from, to);
        assert!((after - (before + 0.05).clamp(-1.0, 1.0)).abs() < 1e-6);
        // No rebuild on a coefficient edit
        assert_eq!(app.world.particles().len(), count_before);
    }

    #[test]
    fn test_apply_preset_replaces_roster() {
        let mut app = test_app();
        app.selected = 2;
        app.apply_preset(0);
        let preset_len = app.presets.builtin[0].roster.species.len();
        assert_eq!(app.roster.len(), preset_len);
        assert_eq!(app.selected, 0);
        assert_eq!(app.world.particles().len(), app.roster.total_population());
    }

    #[test]
    fn test_config_roundtrip_through_app() {
        let mut app = test_app();
        app.ticks_per_frame = 4;
        let config = app.to_config();

        let mut other = App::new(40, 20, Some(99));
        other.apply_config(&config);
        assert_eq!(other.roster.len(), app.roster.len());
        assert_eq!(other.ticks_per_frame, 4);

        let a = app.roster.species();
        let b = other.roster.species();
        for (s1, s2) in a.iter().zip(b) {
            assert_eq!(s1.population, s2.population);
            assert_eq!(s1.color, s2.color);
        }
    }

    #[test]
    fn test_speed_bounds() {
        let mut app = test_app();
        for _ in 0..50 {
            app.increase_speed();
        }
        assert_eq!(app.ticks_per_frame, MAX_SPEED);
        for _ in 0..50 {
            app.decrease_speed();
        }
        assert_eq!(app.ticks_per_frame, MIN_SPEED);
    }

    #[test]
    fn test_focus_cycle_covers_all_params() {
        let mut focus = Focus::Controls;
        let mut seen = Vec::new();
        for _ in 0..5 {
            focus = focus.next();
            seen.push(focus);
        }
        assert!(seen.contains(&Focus::Species));
        assert!(seen.contains(&Focus::Attraction));
        assert!(seen.contains(&Focus::Speed));
        assert_eq!(focus.next(), Focus::Species);
        assert_eq!(Focus::Species.prev(), Focus::Speed);
    }

    #[test]
    fn test_recolor_keeps_identity() {
        let mut app = test_app();
        let id = app.roster.species()[0].id;
        let before = app.roster.species()[0].color;
        app.selected = 0;
        app.cycle_selected_color();
        assert_ne!(app.roster.species()[0].color, before);
        assert_eq!(app.roster.species()[0].id, id);
        assert_eq!(app.roster.len(), 3);
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = test_app();
        app.selected = app.roster.len() - 1;
        app.select_next_species();
        assert_eq!(app.selected, 0);
        app.select_prev_species();
        assert_eq!(app.selected, app.roster.len() - 1);
    }
}
