use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::SwarmConfig,
    error::Result,
    geometry::ShapeClass,
    neighbor_buffer::NeighborBuffer,
    particles::{ParticleSample, ParticleStore},
    phases::{self, TickReport},
    types::{PARTICLE_COUNT, RoleColor},
};

/// One unit's particle cloud.
///
/// A [`Swarm`] owns its particles outright and only changes them through
/// [`Swarm::tick`]. It has no timer of its own; see
/// [`crate::scheduler::SwarmScheduler`] for the threaded driver.
///
/// ### Fields
/// - `shape` - Silhouette the particles are confined to.
/// - `role` - Side the unit belongs to; only used for colouring.
/// - `cfg` - Validated simulation constants.
/// - `store` - The [`PARTICLE_COUNT`] particles.
/// - `acc` - Neighbor scratch buffer reused between ticks.
/// - `rng` - Jitter source.
/// - `ticks` - Completed ticks; drives the simulated clock.
#[derive(Debug)]
pub struct Swarm {
    shape: ShapeClass,
    role: RoleColor,
    cfg: SwarmConfig,
    store: ParticleStore,
    acc: NeighborBuffer,
    rng: StdRng,
    ticks: u64,
}

impl Swarm {
    /// Creates a swarm seeded from the operating system's entropy source.
    ///
    /// ### Errors
    /// Returns [`crate::SwarmError::InvalidConfig`] if `cfg` fails
    /// [`SwarmConfig::validate`].
    pub fn new(shape: ShapeClass, role: RoleColor, cfg: SwarmConfig) -> Result<Self> {
        Self::from_rng(shape, role, cfg, StdRng::from_os_rng())
    }

    /// Creates a swarm whose spawn state and jitter are reproducible.
    pub fn with_seed(shape: ShapeClass, role: RoleColor, cfg: SwarmConfig, seed: u64) -> Result<Self> {
        Self::from_rng(shape, role, cfg, StdRng::seed_from_u64(seed))
    }

    fn from_rng(shape: ShapeClass, role: RoleColor, cfg: SwarmConfig, mut rng: StdRng) -> Result<Self> {
        cfg.validate()?;
        let store = ParticleStore::spawn(PARTICLE_COUNT, &cfg, &mut rng);
        debug!("spawned {shape:?}/{role:?} swarm with {PARTICLE_COUNT} particles");

        Ok(Self {
            shape,
            role,
            cfg,
            store,
            acc: NeighborBuffer::with_len(PARTICLE_COUNT),
            rng,
            ticks: 0,
        })
    }

    /// Advances the swarm by one fixed step.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let elapsed_ms = self.elapsed_ms();
        phases::step(
            &mut self.store,
            self.shape,
            &self.cfg,
            &mut self.acc,
            &mut self.rng,
            elapsed_ms,
        )
    }

    /// Copies out every particle's position, opacity and scale.
    pub fn snapshot(&self) -> Vec<ParticleSample> {
        self.store.snapshot()
    }

    /// Simulated time: completed ticks times the tick period.
    pub fn elapsed_ms(&self) -> f64 {
        self.ticks as f64 * self.cfg.tick_period_ms as f64
    }

    pub fn shape(&self) -> ShapeClass {
        self.shape
    }

    pub fn role(&self) -> RoleColor {
        self.role
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.cfg
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SwarmError, types::CENTER};
    use glam::Vec2;

    fn seeded(shape: ShapeClass, cfg: SwarmConfig) -> Swarm {
        Swarm::with_seed(shape, RoleColor::Friendly, cfg, 42).unwrap()
    }

    #[test]
    fn new_swarm_has_fixed_particle_count() {
        let swarm = Swarm::new(ShapeClass::Round, RoleColor::Hostile, SwarmConfig::default()).unwrap();
        assert_eq!(swarm.snapshot().len(), PARTICLE_COUNT);
        assert_eq!(swarm.ticks(), 0);
        assert_eq!(swarm.role(), RoleColor::Hostile);
    }

    #[test]
    fn invalid_config_fails_at_creation() {
        let cfg = SwarmConfig {
            damping: 2.0,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            Swarm::new(ShapeClass::Square, RoleColor::Friendly, cfg),
            Err(SwarmError::InvalidConfig { field: "damping", .. })
        ));
    }

    #[test]
    fn containment_holds_after_every_tick_for_every_shape() {
        for shape in ShapeClass::ALL {
            let mut swarm = seeded(shape, SwarmConfig::default());
            for t in 0..500 {
                swarm.tick();
                let snap = swarm.snapshot();
                assert_eq!(snap.len(), PARTICLE_COUNT);
                for (id, p) in snap.iter().enumerate() {
                    assert!(shape.is_inside(p.pos), "{shape:?} tick {t} particle {id} at {:?}", p.pos);
                }
            }
        }
    }

    #[test]
    fn opacity_and_scale_stay_in_range() {
        let mut swarm = seeded(ShapeClass::Triangular, SwarmConfig::default());
        let initial_scale: Vec<f32> = swarm.particles().scale.clone();

        for _ in 0..300 {
            swarm.tick();
            for p in swarm.snapshot() {
                assert!(p.opacity >= 0.5 - 1e-5 && p.opacity <= 0.9 + 1e-5, "opacity {}", p.opacity);
                assert!((0.8..=1.2).contains(&p.scale));
            }
        }

        assert_eq!(swarm.particles().scale, initial_scale);
    }

    #[test]
    fn round_particle_outside_is_pulled_back_in_one_tick() {
        let mut swarm = seeded(ShapeClass::Round, SwarmConfig::default());
        swarm.store.pos[0] = Vec2::new(30.0, 16.0);
        swarm.store.vel[0] = Vec2::ZERO;

        swarm.tick();

        let dist = (swarm.store.pos[0] - CENTER).length();
        assert!(dist <= 11.0 + 1e-4, "distance {dist}");
    }

    #[test]
    fn velocity_decays_without_forces() {
        let mut swarm = seeded(ShapeClass::Round, SwarmConfig::inert());
        swarm.store.pos.fill(CENTER);
        swarm.store.vel.fill(Vec2::ZERO);
        swarm.store.vel[0] = Vec2::new(0.05, 0.02);

        let mut last = swarm.store.vel[0].length();
        for _ in 0..100 {
            swarm.tick();
            let now = swarm.store.vel[0].length();
            assert!(now < last, "speed went from {last} to {now}");
            last = now;
        }
    }

    #[test]
    fn centering_alone_converges_to_center() {
        let mut swarm = seeded(
            ShapeClass::Round,
            SwarmConfig {
                centering_gain: 0.008,
                ..SwarmConfig::inert()
            },
        );
        swarm.store.pos.fill(Vec2::new(20.0, 16.0));
        swarm.store.vel.fill(Vec2::ZERO);

        let start = (swarm.store.pos[0] - CENTER).length();
        for _ in 0..3000 {
            swarm.tick();
        }
        let end = (swarm.store.pos[0] - CENTER).length();

        assert!(end < start * 0.05, "distance {start} -> {end}");
        assert!(swarm.store.vel[0].length() < 0.01);
    }

    #[test]
    fn seeded_swarms_are_deterministic() {
        let mut a = seeded(ShapeClass::Square, SwarmConfig::default());
        let mut b = seeded(ShapeClass::Square, SwarmConfig::default());
        for _ in 0..50 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn elapsed_time_follows_tick_period() {
        let mut swarm = seeded(
            ShapeClass::Round,
            SwarmConfig {
                tick_period_ms: 16,
                ..SwarmConfig::default()
            },
        );
        for _ in 0..10 {
            swarm.tick();
        }
        assert_eq!(swarm.ticks(), 10);
        assert_eq!(swarm.elapsed_ms(), 160.0);
    }
}
