//! Polygon construction and boolean helpers for gridless mode
//!
//! All gridless geometry runs in f64 pixel space. Circles and ellipses are
//! sampled polygons so every downstream operation is a plain polygon
//! boolean.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use glam::DVec2;

use crate::core::constants::{ARC_SAMPLES, MIN_SPREAD_AREA};

pub fn coord(p: DVec2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

pub fn point(c: Coord<f64>) -> DVec2 {
    DVec2::new(c.x, c.y)
}

/// Close a point loop into a polygon
pub fn polygon_from(points: impl IntoIterator<Item = DVec2>) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = points.into_iter().map(coord).collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Sampled circle polygon
pub fn circle(center: DVec2, radius: f64) -> Polygon<f64> {
    polygon_from((0..ARC_SAMPLES).map(|i| {
        let angle = i as f64 / ARC_SAMPLES as f64 * std::f64::consts::TAU;
        center + DVec2::new(angle.cos(), angle.sin()) * radius
    }))
}

/// Ellipse as the locus of points whose summed distance to the two foci is
/// `width`. Returns `None` when the ellipse is degenerate (the budget does
/// not exceed the focal separation).
pub fn ellipse(focus_a: DVec2, focus_b: DVec2, width: f64) -> Option<Polygon<f64>> {
    let separation = focus_a.distance(focus_b);
    if width <= separation || width <= 0.0 {
        return None;
    }
    let semi_major = width / 2.0;
    let c = separation / 2.0;
    let semi_minor = (semi_major * semi_major - c * c).sqrt();
    let center = (focus_a + focus_b) / 2.0;
    let axis = if separation > 0.0 {
        (focus_b - focus_a) / separation
    } else {
        DVec2::X
    };

    Some(polygon_from((0..ARC_SAMPLES).map(|i| {
        let angle = i as f64 / ARC_SAMPLES as f64 * std::f64::consts::TAU;
        let local = DVec2::new(semi_major * angle.cos(), semi_minor * angle.sin());
        center + DVec2::new(
            local.x * axis.x - local.y * axis.y,
            local.x * axis.y + local.y * axis.x,
        )
    })))
}

/// Union a batch of polygons into one possibly-multi-part shape
pub fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    polygons
        .into_iter()
        .map(|p| MultiPolygon::new(vec![p]))
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| MultiPolygon::new(vec![]))
}

pub fn intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.intersection(b)
}

/// Drop parts too small to be anything but boolean-op noise
pub fn drop_slivers(shape: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        shape
            .0
            .into_iter()
            .filter(|p| p.unsigned_area() > MIN_SPREAD_AREA)
            .collect(),
    )
}

/// Boundary points of every exterior ring in the shape
pub fn boundary_points(shape: &MultiPolygon<f64>) -> Vec<DVec2> {
    shape
        .0
        .iter()
        .flat_map(|p| p.exterior().0.iter().map(|c| point(*c)))
        .collect()
}
