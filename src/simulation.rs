use crate::species::{SpeciesId, SpeciesRoster};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Distance beyond which two particles exert no force on each other
pub const INTERACTION_RADIUS: f32 = 80.0;

/// Velocity retention applied on every integration of a particle
pub const DAMPING: f32 = 0.5;

/// A single simulated atom. The species reference is fixed at creation;
/// particles live from one (re)population to the next and are never
/// destroyed individually.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub species: SpeciesId,
}

/// Force contribution on a particle at `(ax, ay)` from one at `(bx, by)`
/// with coefficient `g`.
///
/// Zero at coincident positions and outside the interaction radius;
/// otherwise magnitude `g / d`, pulling toward the other particle when
/// `g` is positive and pushing away when negative.
pub fn pair_force(ax: f32, ay: f32, bx: f32, by: f32, g: f32) -> (f32, f32) {
    let dx = ax - bx;
    let dy = ay - by;
    let d = (dx * dx + dy * dy).sqrt();
    if d > 0.0 && d < INTERACTION_RADIUS {
        let f = g / d;
        (-f * dx, -f * dy)
    } else {
        (0.0, 0.0)
    }
}

/// The live simulation state: a fixed arena and the full particle set,
/// owned exclusively here. Species configuration stays with the caller
/// and is read by reference on every tick, so live coefficient edits
/// take effect without a reset.
pub struct World {
    width: f32,
    height: f32,
    particles: Vec<Particle>,
    pub running: bool,
    rng: StdRng,
}

impl World {
    /// Create an empty, running world. A seed makes particle placement
    /// reproducible across resets.
    pub fn new(width: f32, height: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            width,
            height,
            particles: Vec::new(),
            running: true,
            rng,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Read-only view for the renderer
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Regenerate the whole particle set from the roster: `population`
    /// particles per species at uniformly random positions, zero
    /// velocity. Always a full rebuild; populations and species counts
    /// can never drift out of sync with the configuration.
    pub fn populate(&mut self, roster: &SpeciesRoster) {
        self.particles.clear();
        self.particles.reserve(roster.total_population());
        for species in roster.species() {
            for _ in 0..species.population {
                self.particles.push(Particle {
                    x: self.rng.gen_range(0.0..self.width),
                    y: self.rng.gen_range(0.0..self.height),
                    vx: 0.0,
                    vy: 0.0,
                    species: species.id,
                });
            }
        }
    }

    /// Apply a changed species configuration. Whole-world rebuild by
    /// contract; partial in-place edits are not performed.
    pub fn reconfigure(&mut self, roster: &SpeciesRoster) {
        self.populate(roster);
    }

    /// Fresh random positions and zero velocities under the current
    /// configuration
    pub fn reset(&mut self, roster: &SpeciesRoster) {
        self.populate(roster);
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn toggle_pause(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Change the arena dimensions (terminal resize) and repopulate
    pub fn resize(&mut self, width: f32, height: f32, roster: &SpeciesRoster) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.populate(roster);
        }
    }

    /// Advance the simulation by one frame: one pass per ordered species
    /// pair, self-pairs included. No-op while paused or empty.
    ///
    /// Each particle is integrated once per pair it leads, i.e. once per
    /// species in the roster. The compounding velocity updates (and the
    /// extra damping they imply per additional species) are part of the
    /// observable dynamics; collapsing this into a single
    /// accumulate-then-integrate pass changes the motion.
    pub fn tick(&mut self, roster: &SpeciesRoster) {
        if !self.running {
            return;
        }
        for s1 in roster.species() {
            for s2 in roster.species() {
                let g = roster.attraction(s1.id, s2.id);
                self.step_pair(s1.id, s2.id, g);
            }
        }
    }

    /// One force-and-integrate pass for the pair (source, target): every
    /// source particle accumulates contributions from every target
    /// particle at current positions, then is immediately integrated and
    /// reflected before the next source particle is visited.
    fn step_pair(&mut self, source: SpeciesId, target: SpeciesId, g: f32) {
        for i in 0..self.particles.len() {
            if self.particles[i].species != source {
                continue;
            }
            let (px, py) = (self.particles[i].x, self.particles[i].y);
            let mut fx = 0.0;
            let mut fy = 0.0;
            for q in &self.particles {
                if q.species != target {
                    continue;
                }
                let (cx, cy) = pair_force(px, py, q.x, q.y, g);
                fx += cx;
                fy += cy;
            }

            let p = &mut self.particles[i];
            p.vx = (p.vx + fx) * DAMPING;
            p.vy = (p.vy + fy) * DAMPING;
            p.x += p.vx;
            p.y += p.vy;
            reflect(p, self.width, self.height);
        }
    }
}

/// Boundary reflection: negate the velocity component at or past either
/// wall. A sign flip only; the position is not clamped back inside, so a
/// particle may overshoot briefly before the next step pulls it back.
fn reflect(p: &mut Particle, width: f32, height: f32) {
    if p.x <= 0.0 || p.x >= width {
        p.vx = -p.vx;
    }
    if p.y <= 0.0 || p.y >= height {
        p.vy = -p.vy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette_color;

    fn roster_of(populations: &[usize]) -> SpeciesRoster {
        let mut roster = SpeciesRoster::new();
        for (i, &population) in populations.iter().enumerate() {
            roster.add(palette_color(i), population);
        }
        roster
    }

    #[test]
    fn test_force_zero_outside_radius() {
        assert_eq!(pair_force(0.0, 0.0, 80.0, 0.0, 1.0), (0.0, 0.0));
        assert_eq!(pair_force(0.0, 0.0, 200.0, 0.0, -1.0), (0.0, 0.0));
        assert_eq!(pair_force(0.0, 0.0, 60.0, 60.0, 1.0), (0.0, 0.0)); // d ~ 84.85
    }

    #[test]
    fn test_force_zero_at_coincident_positions() {
        let (fx, fy) = pair_force(5.0, 5.0, 5.0, 5.0, 1.0);
        assert_eq!((fx, fy), (0.0, 0.0));
        assert!(fx.is_finite() && fy.is_finite());
    }

    #[test]
    fn test_force_sign_convention() {
        // b lies to the right of a: positive g pulls a toward b (+x)
        let (fx, fy) = pair_force(0.0, 0.0, 40.0, 0.0, 1.0);
        assert!(fx > 0.0);
        assert_eq!(fy, 0.0);
        // negative g pushes a away from b (-x)
        let (fx, _) = pair_force(0.0, 0.0, 40.0, 0.0, -1.0);
        assert!(fx < 0.0);
    }

    #[test]
    fn test_force_magnitude() {
        // |(-F*dx, -F*dy)| = (g/d) * d = g: the contribution magnitude is
        // |g| anywhere inside the radius
        let (fx, fy) = pair_force(0.0, 0.0, 40.0, 0.0, 1.0);
        assert!((fx - 1.0).abs() < 1e-6);
        assert_eq!(fy, 0.0);

        // Off-axis, at a different distance, same magnitude
        let (fx, fy) = pair_force(0.0, 0.0, 30.0, 40.0, 0.5);
        assert!((fx.hypot(fy) - 0.5).abs() < 1e-6);
        assert!(fx > 0.0 && fy > 0.0);
    }

    #[test]
    fn test_populate_counts_and_species() {
        let roster = roster_of(&[30, 50, 20]);
        let mut world = World::new(500.0, 500.0, Some(1));
        world.populate(&roster);

        assert_eq!(world.particles().len(), 100);
        for p in world.particles() {
            assert!(roster.get(p.species).is_some());
            assert!((0.0..500.0).contains(&p.x));
            assert!((0.0..500.0).contains(&p.y));
            assert_eq!((p.vx, p.vy), (0.0, 0.0));
        }
        let first_count = world
            .particles()
            .iter()
            .filter(|p| p.species == roster.species()[0].id)
            .count();
        assert_eq!(first_count, 30);
    }

    #[test]
    fn test_seeded_placement_is_reproducible() {
        let roster = roster_of(&[40]);
        let mut a = World::new(300.0, 300.0, Some(42));
        let mut b = World::new(300.0, 300.0, Some(42));
        a.populate(&roster);
        b.populate(&roster);
        for (p, q) in a.particles().iter().zip(b.particles()) {
            assert_eq!((p.x, p.y), (q.x, q.y));
        }
    }

    #[test]
    fn test_isolated_particle_stays_put() {
        let mut roster = roster_of(&[1]);
        let a = roster.species()[0].id;
        roster.set_attraction(a, a, 1.0);

        let mut world = World::new(500.0, 500.0, Some(3));
        world.populate(&roster);
        let before = world.particles()[0];

        world.tick(&roster);
        let after = world.particles()[0];
        // No neighbor within range: (0 + 0) * 0.5 = 0
        assert_eq!((after.vx, after.vy), (0.0, 0.0));
        assert_eq!((after.x, after.y), (before.x, before.y));
    }

    #[test]
    fn test_reflection_flips_velocity_without_clamping() {
        let species = roster_of(&[1]).species()[0].id;
        let mut p = Particle {
            x: 500.0,
            y: 250.0,
            vx: 2.0,
            vy: 0.5,
            species,
        };
        reflect(&mut p, 500.0, 500.0);
        assert_eq!(p.vx, -2.0);
        assert_eq!(p.vy, 0.5);
        assert_eq!(p.x, 500.0); // not pushed back inside

        p.x = -1.5;
        p.vx = -3.0;
        reflect(&mut p, 500.0, 500.0);
        assert_eq!(p.vx, 3.0);
        assert_eq!(p.x, -1.5);
    }

    #[test]
    fn test_attraction_pulls_toward_target() {
        // A (pop 1, A->B = 1.0) and B (pop 1, all else 0) 40 units apart
        let mut roster = roster_of(&[1, 1]);
        let a = roster.species()[0].id;
        let b = roster.species()[1].id;
        roster.set_attraction(a, b, 1.0);

        let mut world = World::new(500.0, 500.0, Some(0));
        world.populate(&roster);
        world.particles[0] = Particle {
            x: 200.0,
            y: 250.0,
            vx: 0.0,
            vy: 0.0,
            species: a,
        };
        world.particles[1] = Particle {
            x: 240.0,
            y: 250.0,
            vx: 0.0,
            vy: 0.0,
            species: b,
        };

        world.tick(&roster);
        let pa = world.particles()[0];
        let pb = world.particles()[1];
        // A moves toward B (B is in +x direction); B feels nothing
        assert!(pa.vx > 0.0);
        assert_eq!(pa.vy, 0.0);
        assert_eq!((pb.vx, pb.vy), (0.0, 0.0));
        assert_eq!(pb.x, 240.0);
    }

    #[test]
    fn test_repulsion_pushes_away() {
        let mut roster = roster_of(&[1, 1]);
        let a = roster.species()[0].id;
        let b = roster.species()[1].id;
        roster.set_attraction(a, b, -1.0);

        let mut world = World::new(500.0, 500.0, Some(0));
        world.populate(&roster);
        world.particles[0].x = 200.0;
        world.particles[0].y = 250.0;
        world.particles[1].x = 240.0;
        world.particles[1].y = 250.0;

        world.tick(&roster);
        assert!(world.particles()[0].vx < 0.0);
    }

    #[test]
    fn test_particle_integrated_once_per_species() {
        // With two species, each particle leads two pairs and is damped
        // twice per frame: an initial velocity v with no forces becomes
        // v * 0.5 * 0.5.
        let roster = roster_of(&[1, 1]);
        let a = roster.species()[0].id;

        let mut world = World::new(500.0, 500.0, Some(0));
        world.populate(&roster);
        // Keep the two particles out of interaction range
        world.particles[0] = Particle {
            x: 100.0,
            y: 100.0,
            vx: 8.0,
            vy: 0.0,
            species: a,
        };
        world.particles[1].x = 400.0;
        world.particles[1].y = 400.0;

        world.tick(&roster);
        assert_eq!(world.particles()[0].vx, 2.0); // 8 * 0.5 * 0.5
        // Position advanced by each intermediate velocity: 100 + 4 + 2
        assert_eq!(world.particles()[0].x, 106.0);
    }

    #[test]
    fn test_paused_world_does_not_move() {
        let mut roster = roster_of(&[2]);
        let a = roster.species()[0].id;
        roster.set_attraction(a, a, 1.0);

        let mut world = World::new(200.0, 200.0, Some(5));
        world.populate(&roster);
        let before: Vec<Particle> = world.particles().to_vec();

        world.pause();
        world.tick(&roster);
        for (p, q) in world.particles().iter().zip(&before) {
            assert_eq!((p.x, p.y, p.vx, p.vy), (q.x, q.y, q.vx, q.vy));
        }

        world.resume();
        assert!(world.running);
    }

    #[test]
    fn test_tick_on_empty_world_is_noop() {
        let roster = SpeciesRoster::new();
        let mut world = World::new(100.0, 100.0, Some(0));
        world.populate(&roster);
        world.tick(&roster);
        assert!(world.particles().is_empty());
    }

    #[test]
    fn test_reconfigure_after_removal() {
        let mut roster = roster_of(&[30, 40]);
        let removed = roster.species()[1].id;
        let mut world = World::new(500.0, 500.0, Some(9));
        world.populate(&roster);
        assert_eq!(world.particles().len(), 70);

        roster.remove(removed);
        world.reconfigure(&roster);
        assert_eq!(world.particles().len(), 30);
        assert!(world.particles().iter().all(|p| p.species != removed));
    }

    #[test]
    fn test_resize_repopulates_in_new_bounds() {
        let roster = roster_of(&[50]);
        let mut world = World::new(400.0, 400.0, Some(2));
        world.populate(&roster);
        world.resize(100.0, 80.0, &roster);

        assert_eq!(world.width(), 100.0);
        assert_eq!(world.height(), 80.0);
        assert_eq!(world.particles().len(), 50);
        for p in world.particles() {
            assert!((0.0..100.0).contains(&p.x));
            assert!((0.0..80.0).contains(&p.y));
        }
    }
}
