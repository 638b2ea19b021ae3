use glam::Vec2;
use rand::Rng;

use crate::{
    config::SwarmConfig,
    types::{CENTER, ParticleId},
};

/// Read-only view of one particle, as handed to a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSample {
    pub pos: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

/// Flat per-particle arrays for one swarm.
///
/// Index `i` in every array belongs to particle `i`. The store does no
/// validation of its own; the integrator phases keep positions inside the
/// swarm's silhouette and opacity inside its band.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    pub pos: Vec<Vec2>,
    pub vel: Vec<Vec2>,
    pub opacity: Vec<f32>,
    pub scale: Vec<f32>,
}

impl ParticleStore {
    /// Spawns `count` particles scattered around [`CENTER`].
    ///
    /// Each axis is drawn uniformly from:
    /// - position: `CENTER ± cfg.spawn_spread`
    /// - velocity: `± cfg.spawn_speed`
    ///
    /// and opacity and scale from `cfg.spawn_opacity` / `cfg.spawn_scale`.
    /// Positions are not projected here; the first tick pulls any stray
    /// particle into the silhouette.
    pub fn spawn(count: usize, cfg: &SwarmConfig, rng: &mut impl Rng) -> Self {
        let mut store = Self::with_len(count);
        let spread = cfg.spawn_spread;
        let speed = cfg.spawn_speed;

        for i in 0..count {
            store.pos[i] = CENTER
                + Vec2::new(
                    rng.random_range(-spread..=spread),
                    rng.random_range(-spread..=spread),
                );
            store.vel[i] = Vec2::new(
                rng.random_range(-speed..=speed),
                rng.random_range(-speed..=speed),
            );
            store.opacity[i] = rng.random_range(cfg.spawn_opacity.0..=cfg.spawn_opacity.1);
            store.scale[i] = rng.random_range(cfg.spawn_scale.0..=cfg.spawn_scale.1);
        }

        store
    }

    /// Creates `len` particles at rest on [`CENTER`], fully opaque, unit scale.
    pub fn with_len(len: usize) -> Self {
        Self {
            pos: vec![CENTER; len],
            vel: vec![Vec2::ZERO; len],
            opacity: vec![1.0; len],
            scale: vec![1.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    #[inline]
    pub fn sample(&self, id: ParticleId) -> ParticleSample {
        ParticleSample {
            pos: self.pos[id],
            opacity: self.opacity[id],
            scale: self.scale[id],
        }
    }

    /// Copies out every particle's position, opacity and scale.
    pub fn snapshot(&self) -> Vec<ParticleSample> {
        (0..self.len()).map(|id| self.sample(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn spawn_respects_configured_ranges() {
        let cfg = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let store = ParticleStore::spawn(20, &cfg, &mut rng);

        assert_eq!(store.len(), 20);
        assert_eq!(store.vel.len(), 20);
        assert_eq!(store.opacity.len(), 20);
        assert_eq!(store.scale.len(), 20);

        for i in 0..store.len() {
            let off = store.pos[i] - CENTER;
            assert!(off.x.abs() <= 8.0 && off.y.abs() <= 8.0, "pos {:?}", store.pos[i]);
            assert!(store.vel[i].x.abs() <= 0.25 && store.vel[i].y.abs() <= 0.25);
            assert!((0.8..=1.0).contains(&store.opacity[i]));
            assert!((0.8..=1.2).contains(&store.scale[i]));
        }
    }

    #[test]
    fn spawn_is_reproducible_for_a_seed() {
        let cfg = SwarmConfig::default();
        let a = ParticleStore::spawn(20, &cfg, &mut StdRng::seed_from_u64(3));
        let b = ParticleStore::spawn(20, &cfg, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.pos, b.pos);
        assert_eq!(a.scale, b.scale);
    }

    #[test]
    fn snapshot_matches_arrays() {
        let mut store = ParticleStore::with_len(3);
        store.pos[1] = Vec2::new(4.0, 5.0);
        store.opacity[1] = 0.5;
        store.scale[2] = 1.1;

        let snap = store.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].pos, CENTER);
        assert_eq!(snap[1].pos, Vec2::new(4.0, 5.0));
        assert_eq!(snap[1].opacity, 0.5);
        assert_eq!(snap[2].scale, 1.1);
    }

    #[test]
    fn empty_store() {
        let store = ParticleStore::with_len(0);
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
