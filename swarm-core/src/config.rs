use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

use crate::error::{Result, SwarmError};

/// Tunable constants for a swarm's spawn state and per-tick update.
///
/// Every swarm driven by the same [`crate::scheduler::SwarmScheduler`]
/// shares one copy. Distances are in local units of the 32×32 square;
/// gains are applied once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub tick_period_ms: u64,

    pub centering_gain: f32,
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub cohesion_gain: f32,
    pub separation_gain: f32,
    pub jitter: f32,

    /// Applied as `v * -reflection_restitution` on boundary contact.
    pub reflection_restitution: f32,
    /// Pull toward the center added to the reflected velocity.
    pub reflection_bias: f32,
    pub damping: f32,

    pub shimmer_base: f32,
    pub shimmer_amplitude: f32,
    /// Radians per millisecond of simulated time.
    pub shimmer_rate: f32,

    pub spawn_spread: f32,
    pub spawn_speed: f32,
    pub spawn_opacity: (f32, f32),
    pub spawn_scale: (f32, f32),
}

/// Allowed band for particle scale.
pub const SCALE_RANGE: (f32, f32) = (0.8, 1.2);

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 30,
            centering_gain: 0.008,
            neighbor_radius: 8.0,
            separation_radius: 4.0,
            cohesion_gain: 0.005,
            separation_gain: 0.1,
            jitter: 0.005,
            reflection_restitution: 0.2,
            reflection_bias: 0.05,
            damping: 0.995,
            shimmer_base: 0.7,
            shimmer_amplitude: 0.2,
            shimmer_rate: 0.003,
            spawn_spread: 8.0,
            spawn_speed: 0.25,
            spawn_opacity: (0.8, 1.0),
            spawn_scale: SCALE_RANGE,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SwarmError {
    SwarmError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(invalid(field, format!("{value} is not finite")));
    }
    if value < 0.0 {
        return Err(invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn range_within(field: &'static str, range: (f32, f32), bounds: (f32, f32)) -> Result<()> {
    let (lo, hi) = range;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(invalid(field, format!("({lo}, {hi}) is not a valid range")));
    }
    if lo < bounds.0 || hi > bounds.1 {
        return Err(invalid(
            field,
            format!("({lo}, {hi}) leaves [{}, {}]", bounds.0, bounds.1),
        ));
    }
    Ok(())
}

impl SwarmConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    ///
    /// Missing fields keep their [`Default`] values.
    ///
    /// ### Errors
    /// - [`SwarmError::ConfigParse`] if the document is not valid JSON for
    ///   this struct.
    /// - [`SwarmError::InvalidConfig`] if [`SwarmConfig::validate`] rejects it.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SwarmConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON config file.
    ///
    /// ### Errors
    /// [`SwarmError::ConfigRead`] if the file cannot be read, otherwise as
    /// [`SwarmConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SwarmError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Tick period as a [`Duration`].
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Checks that every value keeps the simulation within its invariants.
    ///
    /// Called by swarm construction so that a bad config fails at creation
    /// time instead of producing a swarm that drifts out of range.
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(invalid("tick_period_ms", "must be at least 1 ms"));
        }

        non_negative("centering_gain", self.centering_gain)?;
        non_negative("neighbor_radius", self.neighbor_radius)?;
        non_negative("separation_radius", self.separation_radius)?;
        non_negative("cohesion_gain", self.cohesion_gain)?;
        non_negative("separation_gain", self.separation_gain)?;
        non_negative("jitter", self.jitter)?;
        non_negative("reflection_restitution", self.reflection_restitution)?;
        non_negative("reflection_bias", self.reflection_bias)?;
        non_negative("shimmer_amplitude", self.shimmer_amplitude)?;
        non_negative("shimmer_rate", self.shimmer_rate)?;
        non_negative("spawn_spread", self.spawn_spread)?;
        non_negative("spawn_speed", self.spawn_speed)?;

        if self.separation_radius > self.neighbor_radius {
            return Err(invalid(
                "separation_radius",
                format!(
                    "{} exceeds neighbor_radius {}",
                    self.separation_radius, self.neighbor_radius
                ),
            ));
        }

        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(invalid("damping", format!("{} is outside (0, 1]", self.damping)));
        }

        if !self.shimmer_base.is_finite() {
            return Err(invalid("shimmer_base", "not finite"));
        }
        let lo = self.shimmer_base - self.shimmer_amplitude;
        let hi = self.shimmer_base + self.shimmer_amplitude;
        if lo < 0.0 || hi > 1.0 {
            return Err(invalid(
                "shimmer_base",
                format!("shimmer band [{lo}, {hi}] leaves [0, 1]"),
            ));
        }

        range_within("spawn_opacity", self.spawn_opacity, (0.0, 1.0))?;
        range_within("spawn_scale", self.spawn_scale, SCALE_RANGE)?;

        Ok(())
    }

    /// A config with every force and the jitter switched off.
    ///
    /// Only damping and boundary handling remain, which is handy when a
    /// test needs to isolate one term.
    pub fn inert() -> Self {
        Self {
            centering_gain: 0.0,
            cohesion_gain: 0.0,
            separation_gain: 0.0,
            jitter: 0.0,
            ..Self::default()
        }
    }
}
