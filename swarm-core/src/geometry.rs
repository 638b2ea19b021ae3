//! Silhouettes that confine a swarm's particles.
//!
//! Each [`ShapeClass`] variant owns its containment test, its projection
//! back into the shape, and its outline. All coordinates are in the local
//! 32×32 square centered on [`CENTER`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{error::SwarmError, types::CENTER};

/// Radius of the [`ShapeClass::Round`] silhouette.
pub const ROUND_RADIUS: f32 = 11.0;
/// Y of the [`ShapeClass::Triangular`] apex.
pub const TRIANGLE_APEX_Y: f32 = 5.0;
/// Y of the [`ShapeClass::Triangular`] base.
pub const TRIANGLE_BASE_Y: f32 = 27.0;
/// Half-width gained per unit of height below the apex.
pub const TRIANGLE_SLOPE: f32 = 0.8;
/// Half extent of the [`ShapeClass::Square`] silhouette.
pub const SQUARE_HALF_EXTENT: f32 = 10.0;

/// Slack for containment tests, so that a point projected onto the
/// boundary still counts as inside after float rounding.
pub const CONTAINMENT_EPS: f32 = 1e-4;

/// The silhouette a swarm is confined to. Fixed for a swarm's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    Round,
    Triangular,
    Square,
}

impl ShapeClass {
    pub const ALL: [ShapeClass; 3] = [ShapeClass::Round, ShapeClass::Triangular, ShapeClass::Square];

    /// Returns `true` if `p` lies inside or on the boundary of the shape.
    pub fn is_inside(self, p: Vec2) -> bool {
        let d = p - CENTER;
        match self {
            ShapeClass::Round => d.length() <= ROUND_RADIUS + CONTAINMENT_EPS,
            ShapeClass::Triangular => {
                p.y >= TRIANGLE_APEX_Y - CONTAINMENT_EPS
                    && p.y <= TRIANGLE_BASE_Y + CONTAINMENT_EPS
                    && d.x.abs() <= triangle_half_width(p.y) + CONTAINMENT_EPS
            }
            ShapeClass::Square => {
                d.x.abs() <= SQUARE_HALF_EXTENT + CONTAINMENT_EPS
                    && d.y.abs() <= SQUARE_HALF_EXTENT + CONTAINMENT_EPS
            }
        }
    }

    /// Maps `p` to a point inside or on the boundary of the shape.
    ///
    /// Points already inside are returned unchanged (up to the slack of
    /// [`CONTAINMENT_EPS`]), so projecting twice gives the same point as
    /// projecting once.
    ///
    /// - Round scales the offset from the center down to the radius.
    /// - Triangular clamps `y` between apex and base first, then clamps `x`
    ///   to the half-width at that clamped `y`.
    /// - Square clamps each axis independently.
    pub fn project(self, p: Vec2) -> Vec2 {
        match self {
            ShapeClass::Round => {
                let d = p - CENTER;
                let dist = d.length();
                if dist > ROUND_RADIUS {
                    CENTER + d * (ROUND_RADIUS / dist)
                } else {
                    p
                }
            }
            ShapeClass::Triangular => {
                let y = p.y.clamp(TRIANGLE_APEX_Y, TRIANGLE_BASE_Y);
                let half = triangle_half_width(y);
                let x = p.x.clamp(CENTER.x - half, CENTER.x + half);
                Vec2::new(x, y)
            }
            ShapeClass::Square => {
                let min = CENTER - Vec2::splat(SQUARE_HALF_EXTENT);
                let max = CENTER + Vec2::splat(SQUARE_HALF_EXTENT);
                p.clamp(min, max)
            }
        }
    }

    /// Closed boundary polyline of the shape, for drawing.
    ///
    /// `segments` only matters for [`ShapeClass::Round`].
    pub fn outline(self, segments: usize) -> Vec<Vec2> {
        match self {
            ShapeClass::Round => {
                let segments = segments.max(3);
                (0..segments)
                    .map(|i| {
                        let t = (i as f32) / (segments as f32) * std::f32::consts::TAU;
                        CENTER + Vec2::new(t.cos(), t.sin()) * ROUND_RADIUS
                    })
                    .collect()
            }
            ShapeClass::Triangular => {
                let half = triangle_half_width(TRIANGLE_BASE_Y);
                vec![
                    Vec2::new(CENTER.x, TRIANGLE_APEX_Y),
                    Vec2::new(CENTER.x + half, TRIANGLE_BASE_Y),
                    Vec2::new(CENTER.x - half, TRIANGLE_BASE_Y),
                ]
            }
            ShapeClass::Square => {
                let h = SQUARE_HALF_EXTENT;
                vec![
                    CENTER + Vec2::new(-h, -h),
                    CENTER + Vec2::new(h, -h),
                    CENTER + Vec2::new(h, h),
                    CENTER + Vec2::new(-h, h),
                ]
            }
        }
    }
}

#[inline]
fn triangle_half_width(y: f32) -> f32 {
    (y - TRIANGLE_APEX_Y) * TRIANGLE_SLOPE
}

impl FromStr for ShapeClass {
    type Err = SwarmError;

    /// Accepts the shape names and the unit-type names hosts use for them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" | "interceptor" => Ok(ShapeClass::Round),
            "triangular" | "support" => Ok(ShapeClass::Triangular),
            "square" | "tank" => Ok(ShapeClass::Square),
            _ => Err(SwarmError::UnknownShape(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn center_is_inside_every_shape() {
        for shape in ShapeClass::ALL {
            assert!(shape.is_inside(CENTER), "{shape:?}");
            assert_eq!(shape.project(CENTER), CENTER);
        }
    }

    #[test]
    fn round_projects_onto_radius() {
        let p = ShapeClass::Round.project(Vec2::new(30.0, 16.0));
        assert!(approx(p, Vec2::new(27.0, 16.0)), "got {p:?}");
        assert!(ShapeClass::Round.is_inside(p));
        assert!(!ShapeClass::Round.is_inside(Vec2::new(30.0, 16.0)));
    }

    #[test]
    fn triangle_above_apex_clamps_to_apex() {
        let p = ShapeClass::Triangular.project(Vec2::new(16.0, 2.0));
        assert_eq!(p.y, 5.0);
        assert_eq!(p.x, 16.0);
        assert!(ShapeClass::Triangular.is_inside(p));
    }

    #[test]
    fn triangle_uses_half_width_at_clamped_y() {
        // Below the base and far to the right: y clamps to 27 first, then x
        // clamps to the base half-width of 17.6.
        let p = ShapeClass::Triangular.project(Vec2::new(60.0, 40.0));
        assert!(approx(p, Vec2::new(16.0 + 17.6, 27.0)), "got {p:?}");

        // Above the apex and off to the side: the band collapses to x = 16.
        let p = ShapeClass::Triangular.project(Vec2::new(3.0, -4.0));
        assert_eq!(p, Vec2::new(16.0, 5.0));
    }

    #[test]
    fn triangle_containment_follows_slope() {
        assert!(ShapeClass::Triangular.is_inside(Vec2::new(16.0 + 8.0, 15.0)));
        assert!(!ShapeClass::Triangular.is_inside(Vec2::new(16.0 + 8.1, 15.0)));
        assert!(!ShapeClass::Triangular.is_inside(Vec2::new(16.0, 27.5)));
    }

    #[test]
    fn square_clamps_each_axis() {
        assert_eq!(ShapeClass::Square.project(Vec2::new(40.0, 40.0)), Vec2::new(26.0, 26.0));
        assert_eq!(ShapeClass::Square.project(Vec2::new(-3.0, 20.0)), Vec2::new(6.0, 20.0));
        assert!(ShapeClass::Square.is_inside(Vec2::new(26.0, 6.0)));
        assert!(!ShapeClass::Square.is_inside(Vec2::new(26.5, 6.0)));
    }

    #[test]
    fn outline_vertices_lie_on_the_shape() {
        for shape in ShapeClass::ALL {
            let pts = shape.outline(32);
            assert!(pts.len() >= 3);
            for p in pts {
                assert!(shape.is_inside(p), "{shape:?} outline point {p:?}");
            }
        }
    }

    #[test]
    fn parses_shape_and_unit_names() {
        assert_eq!("interceptor".parse::<ShapeClass>().unwrap(), ShapeClass::Round);
        assert_eq!("Support".parse::<ShapeClass>().unwrap(), ShapeClass::Triangular);
        assert_eq!("tank".parse::<ShapeClass>().unwrap(), ShapeClass::Square);
        assert_eq!("square".parse::<ShapeClass>().unwrap(), ShapeClass::Square);
        assert!(matches!(
            "hexagon".parse::<ShapeClass>(),
            Err(SwarmError::UnknownShape(_))
        ));
    }

    fn any_shape() -> impl Strategy<Value = ShapeClass> {
        prop_oneof![
            Just(ShapeClass::Round),
            Just(ShapeClass::Triangular),
            Just(ShapeClass::Square),
        ]
    }

    proptest! {
        #[test]
        fn prop_projection_lands_inside(
            shape in any_shape(),
            x in -200.0f32..200.0,
            y in -200.0f32..200.0,
        ) {
            let p = shape.project(Vec2::new(x, y));
            prop_assert!(shape.is_inside(p), "{:?} projected ({}, {}) to {:?}", shape, x, y, p);
        }

        #[test]
        fn prop_projection_is_idempotent(
            shape in any_shape(),
            x in -200.0f32..200.0,
            y in -200.0f32..200.0,
        ) {
            let once = shape.project(Vec2::new(x, y));
            let twice = shape.project(once);
            prop_assert!(approx(once, twice), "{:?}: {:?} vs {:?}", shape, once, twice);
        }

        #[test]
        fn prop_inside_points_are_fixed(
            shape in any_shape(),
            x in 0.0f32..32.0,
            y in 0.0f32..32.0,
        ) {
            let p = Vec2::new(x, y);
            if shape.is_inside(p) {
                prop_assert!(approx(shape.project(p), p));
            }
        }
    }
}
