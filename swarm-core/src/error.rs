use thiserror::Error;

use crate::scheduler::SwarmHandle;

/// Errors raised at the edges of the simulation core.
///
/// The per-tick numeric update never fails; everything here comes from
/// construction, parsing, or looking up a swarm that no longer exists.
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown shape class `{0}`")]
    UnknownShape(String),

    #[error("unknown role `{0}`")]
    UnknownRole(String),

    #[error("no live swarm for handle {0}")]
    UnknownSwarm(SwarmHandle),

    #[error("failed to spawn tick loop thread")]
    Spawn(#[from] std::io::Error),

    #[error("failed to read swarm config `{path}`")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse swarm config")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
