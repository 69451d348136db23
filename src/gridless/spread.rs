//! Recursive corner-spreading reachability for gridless scenes
//!
//! The reachable area under a movement budget is approximated by a
//! visibility sweep from the agent, re-seeded past every corner the sweep
//! bent around with the budget that remains after walking to that corner.
//! Each corner is spent at most once per computation so mutually visible
//! corners cannot ping-pong.

use ahash::AHashSet;
use geo::{MultiPolygon, Polygon};
use glam::DVec2;

use crate::core::config::RecursionDepth;
use crate::core::constants::CORNER_SPACER;
use crate::gridless::shapes::{drop_slivers, union_all};
use crate::gridless::sweep::restricted_sweep;

/// Inputs for one spread computation
pub struct SpreadParams<'a> {
    /// Movement-blocking wall segments
    pub segments: &'a [(DVec2, DVec2)],
    /// Depth bound for corner recursion
    pub depth: RecursionDepth,
}

/// All polygons covering points walkable from `origin` within `budget`
pub fn spread_polygons(
    origin: DVec2,
    budget: f64,
    params: &SpreadParams<'_>,
) -> Vec<Polygon<f64>> {
    let mut spent_corners: AHashSet<(i64, i64)> = AHashSet::new();
    let mut out = Vec::new();
    spread_into(origin, budget, params, 0, &mut spent_corners, &mut out);
    out
}

/// The spread as one unioned shape
pub fn spread_shape(origin: DVec2, budget: f64, params: &SpreadParams<'_>) -> MultiPolygon<f64> {
    drop_slivers(union_all(spread_polygons(origin, budget, params)))
}

fn spread_into(
    origin: DVec2,
    budget: f64,
    params: &SpreadParams<'_>,
    level: u32,
    spent_corners: &mut AHashSet<(i64, i64)>,
    out: &mut Vec<Polygon<f64>>,
) {
    if budget <= 0.0 {
        return;
    }
    let result = restricted_sweep(origin, budget, params.segments);
    out.push(result.polygon);

    if !params.depth.allows(level) {
        return;
    }
    for corner in result.corners {
        let remaining = budget - corner.distance - CORNER_SPACER;
        if remaining <= 0.0 {
            continue;
        }
        if !spent_corners.insert(corner_key(corner.point)) {
            continue;
        }
        let next_origin = corner.point + corner.direction * CORNER_SPACER;
        spread_into(next_origin, remaining, params, level + 1, spent_corners, out);
    }
}

/// Quantized corner identity, stable across float noise
fn corner_key(point: DVec2) -> (i64, i64) {
    ((point.x * 2.0).round() as i64, (point.y * 2.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, Point};

    #[test]
    fn test_open_field_single_disc() {
        let params = SpreadParams { segments: &[], depth: RecursionDepth::default() };
        let shape = spread_shape(DVec2::ZERO, 300.0, &params);
        assert_eq!(shape.0.len(), 1);
        let exact = std::f64::consts::PI * 300.0 * 300.0;
        assert!((shape.unsigned_area() - exact).abs() / exact < 0.02);
    }

    #[test]
    fn test_spread_wraps_around_wall() {
        // Short wall east of the agent; the shadow behind it is reachable
        // by walking around either end.
        let segments = [(DVec2::new(100.0, -50.0), DVec2::new(100.0, 50.0))];
        let params = SpreadParams { segments: &segments, depth: RecursionDepth::default() };
        let shape = spread_shape(DVec2::ZERO, 400.0, &params);

        let behind = Point::new(150.0, 0.0);
        assert!(shape.contains(&behind));
    }

    #[test]
    fn test_zero_depth_keeps_shadow() {
        let segments = [(DVec2::new(100.0, -50.0), DVec2::new(100.0, 50.0))];
        let params = SpreadParams { segments: &segments, depth: RecursionDepth::Limited(0) };
        let shape = spread_shape(DVec2::ZERO, 400.0, &params);

        assert!(!shape.contains(&Point::new(150.0, 0.0)));
        assert!(shape.contains(&Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_budget_shrinks_past_corner() {
        let segments = [(DVec2::new(100.0, -50.0), DVec2::new(100.0, 50.0))];
        let params = SpreadParams { segments: &segments, depth: RecursionDepth::default() };
        // Walking to a corner costs ~112 px, leaving little budget behind
        // the wall.
        let shape = spread_shape(DVec2::ZERO, 130.0, &params);
        assert!(!shape.contains(&Point::new(190.0, 0.0)));
    }

    #[test]
    fn test_union_area_less_than_sum() {
        let segments = [(DVec2::new(100.0, -50.0), DVec2::new(100.0, 50.0))];
        let params = SpreadParams { segments: &segments, depth: RecursionDepth::default() };
        let polygons = spread_polygons(DVec2::ZERO, 400.0, &params);
        assert!(polygons.len() > 1);
        let sum: f64 = polygons.iter().map(|p| p.unsigned_area()).sum();
        let merged = spread_shape(DVec2::ZERO, 400.0, &params);
        assert!(merged.unsigned_area() < sum);
    }
}
