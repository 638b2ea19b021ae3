//! Per-tick phases of the swarm integrator.
//!
//! One tick runs, in order:
//! 1. [`neighbor_phase`] — every particle reads all others' start-of-tick
//!    positions and accumulates cohesion offsets and separation pushes in a
//!    [`NeighborBuffer`].
//! 2. [`force_phase`] — centering, cohesion, separation and jitter are
//!    added to each velocity.
//! 3. [`advance_phase`] — positions move by their velocity.
//! 4. [`boundary_phase`] — particles that left the silhouette are projected
//!    back with a soft reflection, then every position is projected once
//!    more.
//! 5. [`damping_phase`] — velocities decay.
//! 6. [`shimmer_phase`] — opacity follows a sine of simulated time.
//!
//! [`step`] chains all of them.

use glam::Vec2;
use rand::Rng;

use crate::{
    config::SwarmConfig, geometry::ShapeClass, neighbor_buffer::NeighborBuffer,
    particles::ParticleStore, types::CENTER,
};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Particles that left the silhouette and were reflected back in.
    pub contacts: usize,
}

/// Accumulates neighbor offsets and separation pushes for every particle.
///
/// For each ordered pair `(p, q)` with `p != q` and distance `d`:
///
/// 1. If `d < cfg.neighbor_radius`, the offset `q - p` is added to `p`'s
///    cohesion sum via [`NeighborBuffer::add_neighbor`].
/// 2. If additionally `0 < d < cfg.separation_radius`, the push
///    `-(q - p) / d * cfg.separation_gain` is added via
///    [`NeighborBuffer::add_separation`]. Coincident particles have no
///    direction to push along and are skipped.
///
/// The buffer is resized (and cleared) to `store.len()` first.
///
/// ### Parameters
/// - `store` - Particle state; only positions are read.
/// - `cfg` - Radii and separation gain.
/// - `acc` - Scratch buffer receiving the contributions.
pub fn neighbor_phase(store: &ParticleStore, cfg: &SwarmConfig, acc: &mut NeighborBuffer) {
    let r2 = cfg.neighbor_radius * cfg.neighbor_radius;
    let n = store.len();

    acc.ensure_len(n);

    for p in 0..n {
        let here = store.pos[p];
        for q in (0..n).filter(|&q| q != p) {
            let delta = store.pos[q] - here;
            let d2 = delta.length_squared();
            if d2 >= r2 {
                continue;
            }

            acc.add_neighbor(p, delta);

            let d = d2.sqrt();
            if d > 0.0 && d < cfg.separation_radius {
                acc.add_separation(p, -(delta / d) * cfg.separation_gain);
            }
        }
    }
}

/// Adds the net force and jitter to every particle's velocity.
///
/// The force on particle `p` is:
///
/// - centering: `(CENTER - p) * cfg.centering_gain`
/// - cohesion: [`NeighborBuffer::avg_offset`] ` * cfg.cohesion_gain`
/// - separation: [`NeighborBuffer::separation`]
///
/// followed by independent uniform noise in `±cfg.jitter` per axis.
///
/// ### Parameters
/// - `store` - Particle state; velocities are updated.
/// - `cfg` - Gains and jitter amplitude.
/// - `acc` - Contributions from [`neighbor_phase`].
/// - `rng` - Source of the jitter.
pub fn force_phase(
    store: &mut ParticleStore,
    cfg: &SwarmConfig,
    acc: &NeighborBuffer,
    rng: &mut impl Rng,
) {
    let j = cfg.jitter;
    for id in 0..store.len() {
        let centering = (CENTER - store.pos[id]) * cfg.centering_gain;
        let cohesion = acc.avg_offset(id) * cfg.cohesion_gain;
        let force = centering + cohesion + acc.separation(id);

        let jitter = Vec2::new(rng.random_range(-j..=j), rng.random_range(-j..=j));
        store.vel[id] += force + jitter;
    }
}

/// Moves every particle by its velocity.
pub fn advance_phase(store: &mut ParticleStore) {
    for (pos, vel) in store.pos.iter_mut().zip(&store.vel) {
        *pos += *vel;
    }
}

/// Puts every particle back inside `shape`.
///
/// A particle outside the silhouette is projected onto it and its velocity
/// becomes `v * -cfg.reflection_restitution + (CENTER - projected) *
/// cfg.reflection_bias`. Afterwards every position goes through
/// [`ShapeClass::project`] a second time; for a point already inside that
/// is a no-op.
///
/// ### Returns
/// The number of particles that had to be reflected.
pub fn boundary_phase(store: &mut ParticleStore, shape: ShapeClass, cfg: &SwarmConfig) -> usize {
    let mut contacts = 0;
    for id in 0..store.len() {
        let mut pos = store.pos[id];

        if !shape.is_inside(pos) {
            pos = shape.project(pos);
            let bias = (CENTER - pos) * cfg.reflection_bias;
            store.vel[id] = store.vel[id] * -cfg.reflection_restitution + bias;
            contacts += 1;
        }

        store.pos[id] = shape.project(pos);
    }
    contacts
}

/// Multiplies every velocity by `cfg.damping`.
pub fn damping_phase(store: &mut ParticleStore, cfg: &SwarmConfig) {
    for vel in &mut store.vel {
        *vel *= cfg.damping;
    }
}

/// Sets each particle's opacity from simulated time.
///
/// `opacity = shimmer_base + sin(elapsed_ms * shimmer_rate + id) * shimmer_amplitude`,
/// clamped to `[0, 1]`. The phase is computed in `f64` so long-running
/// swarms keep a smooth oscillation.
pub fn shimmer_phase(store: &mut ParticleStore, cfg: &SwarmConfig, elapsed_ms: f64) {
    let base = elapsed_ms * f64::from(cfg.shimmer_rate);
    for (id, opacity) in store.opacity.iter_mut().enumerate() {
        let wave = (base + id as f64).sin() as f32;
        *opacity = (cfg.shimmer_base + wave * cfg.shimmer_amplitude).clamp(0.0, 1.0);
    }
}

/// Advances a particle set by exactly one tick.
///
/// ### Parameters
/// - `store` - Particle state to advance.
/// - `shape` - Silhouette the particles are confined to.
/// - `cfg` - Simulation constants.
/// - `acc` - Scratch buffer, reused between ticks.
/// - `rng` - Source of the jitter.
/// - `elapsed_ms` - Simulated time at the end of this tick.
pub fn step(
    store: &mut ParticleStore,
    shape: ShapeClass,
    cfg: &SwarmConfig,
    acc: &mut NeighborBuffer,
    rng: &mut impl Rng,
    elapsed_ms: f64,
) -> TickReport {
    neighbor_phase(store, cfg, acc);
    force_phase(store, cfg, acc, rng);
    advance_phase(store);
    let contacts = boundary_phase(store, shape, cfg);
    damping_phase(store, cfg);
    shimmer_phase(store, cfg, elapsed_ms);

    TickReport { contacts }
}
