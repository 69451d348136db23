//! Continuous-space reachability for scenes without a grid
//!
//! Mirrors the grid pipeline in polygon space: movement tiers are unions
//! of recursively spread visibility polygons, weapon coverage is a circle
//! per target, ideal areas are boolean intersections, and the approach
//! toward a target area is approximated by an ellipse locus.

pub mod shapes;
pub mod spread;
pub mod sweep;

use geo::{BooleanOps, MultiPolygon};
use glam::DVec2;
use ordered_float::OrderedFloat;

use crate::core::config::ColorTag;
use crate::range::WeaponRange;
use shapes::{boundary_points, circle, drop_slivers, ellipse, intersect, union_all};
use spread::{spread_shape, SpreadParams};

pub use spread::spread_polygons;
pub use sweep::restricted_sweep;

/// A selected target in pixel space
#[derive(Debug, Clone, Copy)]
pub struct GridlessTarget {
    pub id: u64,
    pub point: DVec2,
    /// Half-diagonal of the target's bounding box; range circles extend
    /// this far past the weapon's own reach.
    pub radius: f64,
    pub visible: bool,
}

impl GridlessTarget {
    pub fn new(id: u64, point: DVec2, width_px: f64, height_px: f64) -> Self {
        Self {
            id,
            point,
            radius: (width_px / 2.0).hypot(height_px / 2.0),
            visible: true,
        }
    }
}

/// One action tier's reachable shape
#[derive(Debug, Clone)]
pub struct TierShape {
    pub tier: u32,
    pub color: ColorTag,
    pub shape: MultiPolygon<f64>,
}

/// Movement shapes for every action tier, furthest tier first so a
/// renderer can paint them back to front.
pub fn movement_tiers(
    origin: DVec2,
    px_per_action: f64,
    actions: u32,
    params: &SpreadParams<'_>,
    palette: &[ColorTag],
) -> Vec<TierShape> {
    let mut tiers: Vec<TierShape> = (1..=actions)
        .map(|tier| {
            let shape = spread_shape(origin, px_per_action * tier as f64, params);
            let color = palette
                .get((tier as usize).min(palette.len().saturating_sub(1)))
                .copied()
                .unwrap_or(0);
            TierShape { tier, color, shape }
        })
        .collect();
    tiers.reverse();
    tiers
}

/// The circle from which `weapon` reaches `target`. Range is a
/// straight-line measure, so walls are deliberately not applied here.
pub fn target_range_circle(
    target: &GridlessTarget,
    weapon: &WeaponRange,
    px_per_unit: f64,
) -> MultiPolygon<f64> {
    let radius = weapon.range as f64 * px_per_unit + target.radius;
    MultiPolygon::new(vec![circle(target.point, radius)])
}

/// Where `weapon` covers every target at once
fn weapon_coverage(
    targets: &[GridlessTarget],
    weapon: &WeaponRange,
    px_per_unit: f64,
) -> Option<MultiPolygon<f64>> {
    targets
        .iter()
        .map(|t| target_range_circle(t, weapon, px_per_unit))
        .reduce(|a, b| intersect(&a, &b))
}

/// Reachable area covering every target with at least one weapon:
/// per-weapon intersection across targets, unioned over weapons, clipped
/// to the outermost movement tier.
pub fn ideal_areas(
    targets: &[GridlessTarget],
    weapons: &[WeaponRange],
    outer_tier: &MultiPolygon<f64>,
    px_per_unit: f64,
) -> MultiPolygon<f64> {
    if targets.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    let mut covered: Option<MultiPolygon<f64>> = None;
    for weapon in weapons {
        if let Some(coverage) = weapon_coverage(targets, weapon, px_per_unit) {
            covered = Some(match covered {
                Some(acc) => acc.union(&coverage),
                None => coverage,
            });
        }
    }
    match covered {
        Some(shape) => drop_slivers(intersect(&shape, outer_tier)),
        None => MultiPolygon::new(vec![]),
    }
}

/// Approximate corridor of points from which the ideal area stays within
/// the budget: the union of ellipses with foci at the agent and each ideal
/// boundary point, clipped by the tier shape and a bounding circle. The
/// ellipses ignore walls by construction; only the clip respects them.
pub fn reach_corridor(
    agent: DVec2,
    ideal: &MultiPolygon<f64>,
    tier: &MultiPolygon<f64>,
    budget_px: f64,
) -> MultiPolygon<f64> {
    let inside = intersect(ideal, tier);
    let points = boundary_points(ideal);
    if points.is_empty() {
        return inside;
    }

    let ellipses: Vec<_> = points
        .iter()
        .filter_map(|p| ellipse(agent, *p, budget_px))
        .collect();
    if ellipses.is_empty() {
        return inside;
    }

    let farthest = points
        .iter()
        .map(|p| OrderedFloat(agent.distance(*p)))
        .max()
        .map(|d| d.0)
        .unwrap_or(budget_px);
    let bound = MultiPolygon::new(vec![circle(agent, farthest)]);

    let corridor = intersect(&intersect(&union_all(ellipses), tier), &bound);
    drop_slivers(corridor.union(&inside))
}
