//! Particle-cloud swarms that depict units on a tactical grid.
//!
//! Main components:
//! - [`geometry`] — the silhouettes particles are confined to.
//! - [`particles`] — per-swarm particle arrays and render snapshots.
//! - [`neighbor_buffer`] — scratch buffer for cohesion and separation.
//! - [`phases`] — the per-tick integrator pipeline.
//! - [`swarm`] — one unit's swarm instance.
//! - [`scheduler`] — threaded fixed-interval driver for live swarms.
//! - [`config`] — simulation constants.
//! - [`error`] — crate error type.
//! - [`types`] — shared constants, ids and the role palette.

pub mod config;
pub mod error;
pub mod geometry;
pub mod neighbor_buffer;
pub mod particles;
pub mod phases;
pub mod scheduler;
pub mod swarm;
pub mod types;

pub use config::SwarmConfig;
pub use error::{Result, SwarmError};
pub use geometry::ShapeClass;
pub use particles::ParticleSample;
pub use scheduler::{SwarmHandle, SwarmScheduler};
pub use swarm::Swarm;
pub use types::{PARTICLE_COUNT, RoleColor};
