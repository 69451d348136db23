//! Terrain movement cost strategies
//!
//! Three mutually exclusive backends can be active for a scene: none (flat
//! cost), a simple per-cell cost lookup, or a percent-of-movement model
//! sampled at points within each cell. Cost computation never fails: any
//! backend error degrades that query to flat cost.

use ahash::AHashMap;
use geo::{Area, BooleanOps, Coord, LineString, Polygon};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::constants::{AREA_COVER_THRESHOLD, FIVE_POINT_CLEAR_MAX, FUDGE};
use crate::core::error::Result;
use crate::grid::geometry::GridGeometry;
use crate::grid::tile::TileKey;

/// How percent-based backends sample a destination cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TerrainMeasure {
    /// Sample the cell center only
    #[default]
    CenterPoint,
    /// Sample the four quarter points plus the center
    FivePoint,
    /// Weight by polygon overlap between the cell and terrain regions
    AreaOverlap,
}

/// What a percent sample means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PercentModel {
    /// Samples are "fraction of normal speed granted"; cost is the reciprocal
    #[default]
    SpeedPercent,
    /// Samples are already cost multipliers
    DirectCost,
}

impl PercentModel {
    fn apply(&self, value: f32) -> f32 {
        match self {
            PercentModel::SpeedPercent => {
                if value > 0.0 {
                    1.0 / value
                } else {
                    f32::INFINITY
                }
            }
            PercentModel::DirectCost => value,
        }
    }
}

/// Point sampling backend for percent-based terrain systems
pub trait PercentSampler: Sync {
    /// Sample the terrain value at a pixel point. 1.0 means clear ground.
    fn percent_at(&self, point: Vec2) -> Result<f32>;

    /// Terrain region outlines in pixel space, for the area-overlap measure
    fn regions(&self) -> &[Polygon<f64>] {
        &[]
    }
}

/// Cost to enter a cell, as a multiplier of the base step cost
pub trait TerrainCost: Sync {
    fn cost_to_enter(&self, from: TileKey, to: TileKey, geometry: &dyn GridGeometry) -> f32;

    /// True for backends that also modify the agent's live speed
    /// attribute; the search must then measure from the unmodified speed
    /// or terrain would be counted twice.
    fn modifies_speed(&self) -> bool {
        false
    }
}

/// No terrain system active, or terrain explicitly ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCost;

impl TerrainCost for FlatCost {
    fn cost_to_enter(&self, _from: TileKey, _to: TileKey, _geometry: &dyn GridGeometry) -> f32 {
        1.0
    }
}

/// Fixed per-cell cost lookup (e.g. 2.0 for difficult terrain).
/// Queried for the destination cell only.
#[derive(Debug, Clone, Default)]
pub struct CellCost {
    costs: AHashMap<TileKey, f32>,
}

impl CellCost {
    pub fn new(costs: AHashMap<TileKey, f32>) -> Self {
        Self { costs }
    }

    pub fn set(&mut self, key: TileKey, cost: f32) {
        self.costs.insert(key, cost);
    }
}

impl TerrainCost for CellCost {
    fn cost_to_enter(&self, _from: TileKey, to: TileKey, _geometry: &dyn GridGeometry) -> f32 {
        self.costs.get(&to).copied().unwrap_or(1.0)
    }
}

/// Percent-movement terrain backend with configurable cell sampling
pub struct PercentCost<S: PercentSampler> {
    sampler: S,
    measure: TerrainMeasure,
    model: PercentModel,
}

impl<S: PercentSampler> PercentCost<S> {
    pub fn new(sampler: S, measure: TerrainMeasure, model: PercentModel) -> Self {
        Self { sampler, measure, model }
    }

    /// Build a backend sampling the way the settings snapshot asks for
    pub fn from_settings(
        sampler: S,
        model: PercentModel,
        settings: &crate::core::config::OverlaySettings,
    ) -> Self {
        Self::new(sampler, settings.terrain_measure, model)
    }

    /// Probe for backends that only report presence: sample a point far from
    /// any terrain and return what "clear" costs under this model.
    pub fn no_terrain_probe(&self) -> f32 {
        match self.sampler.percent_at(Vec2::ZERO) {
            Ok(value) => self.model.apply(value),
            Err(_) => 1.0,
        }
    }

    fn sample(&self, point: Vec2) -> Result<f32> {
        self.sampler.percent_at(point)
    }

    fn center_point_cost(&self, to: TileKey, geometry: &dyn GridGeometry) -> Result<f32> {
        Ok(self.model.apply(self.sample(geometry.cell_center(to))?))
    }

    fn five_point_cost(&self, to: TileKey, geometry: &dyn GridGeometry) -> Result<f32> {
        let top_left = geometry.cell_top_left(to);
        let size = geometry.cell_size();

        let mut samples = [1.0_f32; 5];
        for (i, sample) in samples.iter_mut().enumerate() {
            let point = if i == 4 {
                geometry.cell_center(to)
            } else {
                // Quarter points of the cell
                top_left
                    + Vec2::new(
                        (2 * (i as i32 / 2) + 1) as f32 * size / 4.0,
                        (2 * (i as i32 % 2) + 1) as f32 * size / 4.0,
                    )
            };
            *sample = self.sample(point)?;
        }

        let disagreeing = samples.iter().filter(|s| **s != 1.0).count();
        if disagreeing > FIVE_POINT_CLEAR_MAX {
            let product: f32 = samples.iter().product();
            Ok(self.model.apply(product.powf(0.2)))
        } else {
            Ok(1.0)
        }
    }

    fn area_overlap_cost(&self, to: TileKey, geometry: &dyn GridGeometry) -> Result<f32> {
        let top_left = geometry.cell_top_left(to);
        let size = geometry.cell_size();
        let cell = inset_rect(top_left, size, FUDGE);
        let cell_area = cell.unsigned_area();
        if cell_area <= 0.0 {
            return Ok(1.0);
        }

        let mut covered = 0.0;
        let mut probe: Option<Vec2> = None;
        for region in self.sampler.regions() {
            let overlap = cell.intersection(region);
            let area = overlap.unsigned_area();
            if area > 0.0 {
                covered += area / cell_area;
                if probe.is_none() {
                    if let Some(coord) = overlap.0.first().and_then(|p| p.exterior().0.first()) {
                        probe = Some(Vec2::new(coord.x as f32, coord.y as f32));
                    }
                }
            }
        }

        match probe {
            Some(point) if covered >= AREA_COVER_THRESHOLD => {
                Ok(self.model.apply(self.sample(point)?))
            }
            _ => Ok(1.0),
        }
    }
}

impl<S: PercentSampler> TerrainCost for PercentCost<S> {
    fn modifies_speed(&self) -> bool {
        matches!(self.model, PercentModel::SpeedPercent)
    }

    fn cost_to_enter(&self, _from: TileKey, to: TileKey, geometry: &dyn GridGeometry) -> f32 {
        let result = match self.measure {
            TerrainMeasure::CenterPoint => self.center_point_cost(to, geometry),
            TerrainMeasure::FivePoint => self.five_point_cost(to, geometry),
            TerrainMeasure::AreaOverlap => self.area_overlap_cost(to, geometry),
        };
        match result {
            Ok(cost) => cost,
            Err(err) => {
                tracing::warn!("Terrain backend failed for {to}, treating as clear: {err}");
                1.0
            }
        }
    }
}

fn inset_rect(top_left: Vec2, size: f32, inset: f32) -> Polygon<f64> {
    let x0 = (top_left.x + inset) as f64;
    let y0 = (top_left.y + inset) as f64;
    let x1 = (top_left.x + size - inset) as f64;
    let y1 = (top_left.y + size - inset) as f64;
    Polygon::new(
        LineString::from(vec![
            Coord { x: x0, y: y0 },
            Coord { x: x1, y: y0 },
            Coord { x: x1, y: y1 },
            Coord { x: x0, y: y1 },
            Coord { x: x0, y: y0 },
        ]),
        vec![],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ReachError;
    use crate::grid::geometry::SquareGrid;

    struct UniformSampler(f32);

    impl PercentSampler for UniformSampler {
        fn percent_at(&self, _point: Vec2) -> Result<f32> {
            Ok(self.0)
        }
    }

    struct FailingSampler;

    impl PercentSampler for FailingSampler {
        fn percent_at(&self, _point: Vec2) -> Result<f32> {
            Err(ReachError::Terrain("backend offline".into()))
        }
    }

    /// Terrain only on the left half of the scene (x < cutoff)
    struct HalfSceneSampler {
        cutoff: f32,
        percent: f32,
        regions: Vec<Polygon<f64>>,
    }

    impl HalfSceneSampler {
        fn new(cutoff: f32, percent: f32) -> Self {
            let c = cutoff as f64;
            let region = Polygon::new(
                LineString::from(vec![
                    Coord { x: -10_000.0, y: -10_000.0 },
                    Coord { x: c, y: -10_000.0 },
                    Coord { x: c, y: 10_000.0 },
                    Coord { x: -10_000.0, y: 10_000.0 },
                    Coord { x: -10_000.0, y: -10_000.0 },
                ]),
                vec![],
            );
            Self { cutoff, percent, regions: vec![region] }
        }
    }

    impl PercentSampler for HalfSceneSampler {
        fn percent_at(&self, point: Vec2) -> Result<f32> {
            Ok(if point.x < self.cutoff { self.percent } else { 1.0 })
        }

        fn regions(&self) -> &[Polygon<f64>] {
            &self.regions
        }
    }

    fn grid() -> SquareGrid {
        SquareGrid::new(100.0, 5.0)
    }

    #[test]
    fn test_flat_cost_is_one() {
        let grid = grid();
        let cost = FlatCost.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn test_cell_cost_lookup() {
        let grid = grid();
        let mut terrain = CellCost::default();
        terrain.set(TileKey::new(2, 2), 2.0);
        assert_eq!(
            terrain.cost_to_enter(TileKey::new(2, 1), TileKey::new(2, 2), &grid),
            2.0
        );
        assert_eq!(
            terrain.cost_to_enter(TileKey::new(2, 1), TileKey::new(2, 0), &grid),
            1.0
        );
    }

    #[test]
    fn test_speed_percent_reciprocal() {
        let grid = grid();
        let terrain = PercentCost::new(
            UniformSampler(0.5),
            TerrainMeasure::CenterPoint,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert!((cost - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_direct_cost_passthrough() {
        let grid = grid();
        let terrain = PercentCost::new(
            UniformSampler(3.0),
            TerrainMeasure::CenterPoint,
            PercentModel::DirectCost,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert!((cost - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_five_point_all_terrain() {
        let grid = grid();
        let terrain = PercentCost::new(
            UniformSampler(0.5),
            TerrainMeasure::FivePoint,
            PercentModel::SpeedPercent,
        );
        // All five samples at 0.5: cost = 1 / (0.5^5)^(1/5) = 2
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert!((cost - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_five_point_corner_clipping_is_clear() {
        let grid = grid();
        // Cell (0, 1) spans x in [100, 200]; terrain covers x < 130, which
        // catches only the two left quarter points.
        let terrain = PercentCost::new(
            HalfSceneSampler::new(130.0, 0.5),
            TerrainMeasure::FivePoint,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn test_area_overlap_majority_covered() {
        let grid = grid();
        // Cell (0, 1) spans x in [100, 200]; terrain covers x < 180 (80%).
        let terrain = PercentCost::new(
            HalfSceneSampler::new(180.0, 0.5),
            TerrainMeasure::AreaOverlap,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert!((cost - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_area_overlap_minority_clear() {
        let grid = grid();
        // Terrain covers only x < 120 (20% of the cell).
        let terrain = PercentCost::new(
            HalfSceneSampler::new(120.0, 0.5),
            TerrainMeasure::AreaOverlap,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn test_backend_error_degrades_to_flat() {
        let grid = grid();
        let terrain = PercentCost::new(
            FailingSampler,
            TerrainMeasure::CenterPoint,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert_eq!(cost, 1.0);
    }

    #[test]
    fn test_from_settings_picks_up_measure() {
        let grid = grid();
        let settings = crate::core::config::OverlaySettings {
            terrain_measure: TerrainMeasure::FivePoint,
            ..Default::default()
        };
        // Terrain catches the two left quarter points and the center of
        // cell (0, 1): the five-point geometric mean, not the center-point
        // reciprocal of 2.0 the default measure would give.
        let terrain = PercentCost::from_settings(
            HalfSceneSampler::new(151.0, 0.5),
            PercentModel::SpeedPercent,
            &settings,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        let expect = 1.0 / 0.125_f32.powf(0.2);
        assert!((cost - expect).abs() < 1e-4);
    }

    #[test]
    fn test_zero_percent_is_impassable() {
        let grid = grid();
        let terrain = PercentCost::new(
            UniformSampler(0.0),
            TerrainMeasure::CenterPoint,
            PercentModel::SpeedPercent,
        );
        let cost = terrain.cost_to_enter(TileKey::new(0, 0), TileKey::new(0, 1), &grid);
        assert!(cost.is_infinite());
    }
}
