//! Radius-restricted visibility sweep
//!
//! Computes the star-shaped region visible (and walkable in a straight
//! line) from an origin point out to a budget radius, against a set of
//! movement-blocking wall segments. Wall endpoints the sweep can see, with
//! open space behind them, are reported as corners for the recursive
//! spread to bend around.

use glam::DVec2;
use ordered_float::OrderedFloat;

use crate::core::constants::{ARC_SAMPLES, SWEEP_EPSILON};
use crate::gridless::shapes::polygon_from;
use geo::Polygon;

/// A wall endpoint the sweep reached with walkable space behind it
#[derive(Debug, Clone, Copy)]
pub struct Corner {
    pub point: DVec2,
    /// Straight-line distance from the sweep origin
    pub distance: f64,
    /// Unit direction from the origin toward the corner
    pub direction: DVec2,
}

/// Output of one sweep: the restricted visibility polygon and the corners
/// that seed sub-sweeps.
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub polygon: Polygon<f64>,
    pub corners: Vec<Corner>,
}

/// Sweep the area reachable in a straight line from `origin` within
/// `radius`, bounded by `segments`.
pub fn restricted_sweep(origin: DVec2, radius: f64, segments: &[(DVec2, DVec2)]) -> SweepResult {
    let mut angles: Vec<f64> = Vec::with_capacity(ARC_SAMPLES + segments.len() * 6);
    for i in 0..ARC_SAMPLES {
        angles.push(i as f64 / ARC_SAMPLES as f64 * std::f64::consts::TAU);
    }
    for (a, b) in segments {
        for endpoint in [a, b] {
            let theta = (*endpoint - origin).to_angle();
            // Keep every candidate in [0, tau) so the boundary sorts into
            // one monotonic sweep.
            for candidate in [theta - SWEEP_EPSILON, theta, theta + SWEEP_EPSILON] {
                angles.push(candidate.rem_euclid(std::f64::consts::TAU));
            }
        }
    }
    angles.sort_by_key(|a| OrderedFloat(*a));
    angles.dedup();

    let boundary: Vec<DVec2> = angles
        .iter()
        .map(|theta| {
            let dir = DVec2::from_angle(*theta);
            let t = cast_ray(origin, dir, segments).unwrap_or(f64::INFINITY);
            origin + dir * t.min(radius)
        })
        .collect();

    let corners = find_corners(origin, radius, segments);

    SweepResult {
        polygon: polygon_from(boundary),
        corners,
    }
}

/// Distance along the ray to the nearest blocking segment, if any
fn cast_ray(origin: DVec2, dir: DVec2, segments: &[(DVec2, DVec2)]) -> Option<f64> {
    let mut nearest: Option<f64> = None;
    for (a, b) in segments {
        if let Some(t) = ray_segment(origin, dir, *a, *b) {
            nearest = Some(nearest.map_or(t, |n: f64| n.min(t)));
        }
    }
    nearest
}

/// Parametric ray/segment intersection; returns the ray parameter t >= 0
fn ray_segment(origin: DVec2, dir: DVec2, a: DVec2, b: DVec2) -> Option<f64> {
    let edge = b - a;
    let denom = dir.perp_dot(edge);
    if denom.abs() < 1e-12 {
        return None;
    }
    let diff = a - origin;
    let t = diff.perp_dot(edge) / denom;
    let u = diff.perp_dot(dir) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Wall endpoints inside the radius that the origin can see and that have
/// open space past them on at least one side.
fn find_corners(origin: DVec2, radius: f64, segments: &[(DVec2, DVec2)]) -> Vec<Corner> {
    let mut corners = Vec::new();
    for (a, b) in segments {
        for endpoint in [*a, *b] {
            let offset = endpoint - origin;
            let distance = offset.length();
            if distance <= f64::EPSILON || distance >= radius {
                continue;
            }
            let direction = offset / distance;

            // The endpoint itself must be visible from the origin.
            let hit = cast_ray(origin, direction, segments).unwrap_or(f64::INFINITY);
            if hit < distance - SWEEP_EPSILON * distance.max(1.0) {
                continue;
            }

            // Open space behind: a ray nudged to either side must travel
            // strictly past the endpoint.
            let theta = direction.to_angle();
            let open_behind = [theta - SWEEP_EPSILON, theta + SWEEP_EPSILON]
                .into_iter()
                .any(|side| {
                    let t = cast_ray(origin, DVec2::from_angle(side), segments)
                        .unwrap_or(f64::INFINITY);
                    t > distance + SWEEP_EPSILON * distance.max(1.0)
                });
            if open_behind {
                corners.push(Corner { point: endpoint, distance, direction });
            }
        }
    }
    corners
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, Point};

    #[test]
    fn test_open_field_is_a_disc() {
        let result = restricted_sweep(DVec2::ZERO, 100.0, &[]);
        assert!(result.corners.is_empty());
        let exact = std::f64::consts::PI * 100.0 * 100.0;
        let area = result.polygon.unsigned_area();
        assert!((area - exact).abs() / exact < 0.02, "area {area}");
    }

    #[test]
    fn test_wall_casts_shadow() {
        // Wall between the origin and points further east.
        let segments = [(DVec2::new(50.0, -200.0), DVec2::new(50.0, 200.0))];
        let result = restricted_sweep(DVec2::ZERO, 100.0, &segments);
        assert!(result.polygon.contains(&Point::new(40.0, 0.0)));
        assert!(!result.polygon.contains(&Point::new(60.0, 0.0)));
        // West side unaffected.
        assert!(result.polygon.contains(&Point::new(-90.0, 0.0)));
    }

    #[test]
    fn test_short_wall_ends_are_corners() {
        // Wall fully inside the radius; both endpoints have space behind.
        let segments = [(DVec2::new(50.0, -30.0), DVec2::new(50.0, 30.0))];
        let result = restricted_sweep(DVec2::ZERO, 200.0, &segments);
        assert_eq!(result.corners.len(), 2);
        for corner in &result.corners {
            assert!((corner.point.x - 50.0).abs() < 1e-9);
            assert!(corner.distance < 200.0);
        }
    }

    #[test]
    fn test_endpoint_outside_radius_not_a_corner() {
        let segments = [(DVec2::new(50.0, -300.0), DVec2::new(50.0, 300.0))];
        let result = restricted_sweep(DVec2::ZERO, 100.0, &segments);
        assert!(result.corners.is_empty());
    }

    #[test]
    fn test_hidden_endpoint_not_a_corner() {
        // The second wall's near endpoint is shadowed by the first wall.
        let segments = [
            (DVec2::new(20.0, -200.0), DVec2::new(20.0, 200.0)),
            (DVec2::new(60.0, -30.0), DVec2::new(60.0, 30.0)),
        ];
        let result = restricted_sweep(DVec2::ZERO, 100.0, &segments);
        assert!(result
            .corners
            .iter()
            .all(|c| (c.point.x - 60.0).abs() > 1e-9));
    }
}
