use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SwarmError;

/// Identifier for a particle in a [`crate::particles::ParticleStore`].
///
/// This is an index into the store's arrays and is only used to tell a
/// particle apart from its neighbors; it carries no other meaning.
pub type ParticleId = usize;

/// Number of particles in every swarm.
pub const PARTICLE_COUNT: usize = 20;

/// Side length of the local square a swarm is drawn in.
pub const LOCAL_SIZE: f32 = 32.0;

/// Geometric center of the local square; every silhouette is centered here.
pub const CENTER: Vec2 = Vec2::new(16.0, 16.0);

/// Which side a unit belongs to. Only affects colouring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleColor {
    Friendly,
    Hostile,
}

impl RoleColor {
    /// Particle fill colour as `[r, g, b]`.
    pub fn fill_rgb(self) -> [u8; 3] {
        match self {
            RoleColor::Friendly => [0x60, 0xa5, 0xfa],
            RoleColor::Hostile => [0xf8, 0x71, 0x71],
        }
    }

    /// Glow colour as `[r, g, b]`, also used for the silhouette outline.
    pub fn glow_rgb(self) -> [u8; 3] {
        match self {
            RoleColor::Friendly => [0x3b, 0x82, 0xf6],
            RoleColor::Hostile => [0xef, 0x44, 0x44],
        }
    }

    /// Outline colour as `[r, g, b, a]` (glow colour at `0x50` alpha).
    pub fn outline_rgba(self) -> [u8; 4] {
        let [r, g, b] = self.glow_rgb();
        [r, g, b, 0x50]
    }
}

impl FromStr for RoleColor {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "friendly" | "player" => Ok(RoleColor::Friendly),
            "hostile" | "enemy" => Ok(RoleColor::Hostile),
            _ => Err(SwarmError::UnknownRole(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_host_aliases() {
        assert_eq!("player".parse::<RoleColor>().unwrap(), RoleColor::Friendly);
        assert_eq!("Enemy".parse::<RoleColor>().unwrap(), RoleColor::Hostile);
        assert_eq!(" hostile ".parse::<RoleColor>().unwrap(), RoleColor::Hostile);
        assert!(matches!(
            "neutral".parse::<RoleColor>(),
            Err(SwarmError::UnknownRole(name)) if name == "neutral"
        ));
    }

    #[test]
    fn outline_reuses_glow_with_alpha() {
        assert_eq!(RoleColor::Friendly.outline_rgba(), [0x3b, 0x82, 0xf6, 0x50]);
        assert_ne!(RoleColor::Friendly.fill_rgb(), RoleColor::Hostile.fill_rgb());
    }
}
