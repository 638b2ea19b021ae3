use crate::types::ParticleId;
use glam::Vec2;

/// A scratch buffer that accumulates neighbor contributions per particle.
///
/// For each `ParticleId`, this buffer stores:
///
/// - The sum of offsets to every neighbor (used for cohesion).
/// - The number of neighbors that contributed.
/// - The summed separation push away from neighbors that are too close.
///
/// It is filled from a single read of all positions, so every particle sees
/// the same start-of-tick state regardless of update order.
#[derive(Debug)]
pub struct NeighborBuffer {
    /// Summed offsets `q - p` to each neighbor `q`.
    offset: Vec<Vec2>,
    /// Number of neighbors per particle.
    pub count: Vec<u32>,
    /// Summed separation push per particle, already scaled.
    separation: Vec<Vec2>,
}

impl NeighborBuffer {
    /// Creates a new [`NeighborBuffer`] for `len` particles, all cleared.
    ///
    /// ### Parameters
    /// - `len` - Number of particles this buffer can store contributions for.
    pub fn with_len(len: usize) -> Self {
        Self {
            offset: vec![Vec2::ZERO; len],
            count: vec![0; len],
            separation: vec![Vec2::ZERO; len],
        }
    }

    /// Ensures that the internal storage has exactly the given length.
    ///
    /// After this call all entries are cleared, even if the length was
    /// already correct.
    ///
    /// ### Parameters
    /// - `len` - Desired length of the internal buffers.
    pub fn ensure_len(&mut self, len: usize) {
        if self.offset.len() != len {
            self.offset.resize(len, Vec2::ZERO);
            self.count.resize(len, 0);
            self.separation.resize(len, Vec2::ZERO);
        }
        self.clear();
    }

    /// Clears all accumulated contributions without changing the length.
    pub fn clear(&mut self) {
        self.offset.fill(Vec2::ZERO);
        self.count.fill(0);
        self.separation.fill(Vec2::ZERO);
    }

    /// Records one neighbor of `id` at offset `delta` from it.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add_neighbor(&mut self, id: ParticleId, delta: Vec2) {
        self.offset[id] += delta;
        self.count[id] += 1;
    }

    /// Adds a separation push for `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add_separation(&mut self, id: ParticleId, push: Vec2) {
        self.separation[id] += push;
    }

    /// Returns the average offset from `id` to its neighbors.
    ///
    /// ### Returns
    /// The mean of every recorded `delta`, or `Vec2::ZERO` if `id` has no
    /// neighbors.
    #[inline]
    pub fn avg_offset(&self, id: ParticleId) -> Vec2 {
        let c = self.count[id];
        if c == 0 {
            Vec2::ZERO
        } else {
            self.offset[id] / (c as f32)
        }
    }

    #[inline]
    pub fn separation(&self, id: ParticleId) -> Vec2 {
        self.separation[id]
    }

    #[inline]
    pub fn has_neighbors(&self, id: ParticleId) -> bool {
        self.count[id] > 0
    }

    pub fn len(&self) -> usize {
        self.count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }
}
