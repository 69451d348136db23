//! Weapon range and visibility reachability
//!
//! For every selected target this module answers "from which cells can I
//! hit it": cells whose grid distance to the target's footprint is within
//! a weapon's range and which have unobstructed sight to some point of the
//! target's silhouette. Per-target sets are then intersected to find cells
//! that cover every target at once.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::ColorTag;
use crate::core::constants::FUDGE;
use crate::grid::geometry::GridGeometry;
use crate::grid::hex::CubeCoord;
use crate::grid::tile::TileKey;
use crate::search::dijkstra::ReachableSet;
use crate::world::ObstacleTester;

/// One weapon's reach, in scene distance units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponRange {
    pub range: f32,
    pub color: ColorTag,
    pub weapon_id: Option<String>,
}

impl WeaponRange {
    pub fn new(range: f32, color: ColorTag) -> Self {
        Self { range, color, weapon_id: None }
    }
}

/// A selected target occupying a rectangle of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    /// Top-left occupied cell
    pub cell: TileKey,
    /// Footprint in cells
    pub width: i32,
    pub height: i32,
    pub visible: bool,
}

impl Target {
    pub fn new(id: u64, cell: TileKey, width: i32, height: i32) -> Self {
        Self { id, cell, width, height, visible: true }
    }

    pub fn occupied_cells(&self) -> Vec<TileKey> {
        let mut out = Vec::with_capacity((self.width * self.height).max(0) as usize);
        for row in 0..self.height.max(1) {
            for col in 0..self.width.max(1) {
                out.push(TileKey::new(self.cell.gx + row, self.cell.gy + col));
            }
        }
        out
    }

    pub fn occupies(&self, key: &TileKey) -> bool {
        key.gx >= self.cell.gx
            && key.gx < self.cell.gx + self.height.max(1)
            && key.gy >= self.cell.gy
            && key.gy < self.cell.gy + self.width.max(1)
    }

    /// Pixel center of the footprint
    pub fn center_px(&self, geometry: &dyn GridGeometry) -> Vec2 {
        let size = geometry.cell_size();
        geometry.cell_top_left(self.cell)
            + Vec2::new(
                self.width.max(1) as f32 * size / 2.0,
                self.height.max(1) as f32 * size / 2.0,
            )
    }

    /// Sight sample points across the silhouette: the center plus eight
    /// points offset by a quarter of the smaller footprint extent.
    pub fn silhouette_points(&self, geometry: &dyn GridGeometry) -> Vec<Vec2> {
        let center = self.center_px(geometry);
        let q = self.width.min(self.height).max(1) as f32 * geometry.cell_size() / 4.0;
        let mut out = Vec::with_capacity(9);
        for dx in [-q, 0.0, q] {
            for dy in [-q, 0.0, q] {
                out.push(center + Vec2::new(dx, dy));
            }
        }
        out
    }
}

/// Collaborators shared by the range queries
pub struct RangeParams<'a> {
    pub geometry: &'a dyn GridGeometry,
    pub obstacles: &'a dyn ObstacleTester,
}

/// Cells from which `target` is inside some weapon's range with clear
/// sight, tagged with the granting weapon's color. Weapons are applied
/// shortest range first so a cell keeps the color of the tightest weapon
/// that covers it.
pub fn target_range_cells(
    target: &Target,
    weapons: &[WeaponRange],
    params: &RangeParams<'_>,
) -> AHashMap<TileKey, ColorTag> {
    let mut out = AHashMap::new();
    if weapons.is_empty() {
        return out;
    }

    let mut sorted: Vec<&WeaponRange> = weapons.iter().collect();
    sorted.sort_by_key(|w| OrderedFloat(w.range));

    for weapon in sorted {
        let tiles = weapon.range / params.geometry.distance_per_cell();
        if tiles < 0.0 {
            continue;
        }
        let candidates = if params.geometry.is_hex() {
            hex_candidates(target, tiles, params.geometry)
        } else {
            square_candidates(target, tiles)
        };
        for key in candidates {
            if out.contains_key(&key) || target.occupies(&key) {
                continue;
            }
            if can_see_target(key, target, params) {
                out.insert(key, weapon.color);
            }
        }
    }
    out
}

/// Quadrant scan around the target footprint, mirrored across its edges.
///
/// Grid distance uses the alternating diagonal metric: straight remainder
/// plus one and a half per diagonal step, floored.
fn square_candidates(target: &Target, tiles: f32) -> Vec<TileKey> {
    let reach = (tiles + FUDGE).floor() as i32;
    let mut out = Vec::new();
    for dx in 0..=reach {
        for dy in 0..=reach {
            let diagonals = dx.min(dy);
            let straight = (dx - dy).abs();
            let distance = (straight + 3 * diagonals / 2) as f32;
            if distance >= tiles + FUDGE {
                continue;
            }

            let mut rows = AHashSet::new();
            rows.insert(target.cell.gx - dy);
            rows.insert(target.cell.gx + target.height.max(1) - 1 + dy);
            let mut cols = AHashSet::new();
            cols.insert(target.cell.gy - dx);
            cols.insert(target.cell.gy + target.width.max(1) - 1 + dx);

            for row in &rows {
                for col in &cols {
                    out.push(TileKey::new(*row, *col));
                }
            }
        }
    }
    out
}

/// Hexes within range of any cell of the target footprint, via cube
/// coordinates.
fn hex_candidates(target: &Target, tiles: f32, geometry: &dyn GridGeometry) -> Vec<TileKey> {
    let Some(layout) = geometry.hex_layout() else {
        return Vec::new();
    };
    let reach = (tiles + FUDGE).floor().max(0.0) as u32;
    let mut seen: AHashSet<CubeCoord> = AHashSet::new();
    for cell in target.occupied_cells() {
        let center = layout.offset_to_cube(cell);
        for cube in center.hexes_in_range(reach) {
            seen.insert(cube);
        }
    }
    seen.into_iter()
        .map(|cube| layout.cube_to_offset(cube))
        .collect()
}

/// Any silhouette sample visible from the candidate cell center accepts
fn can_see_target(candidate: TileKey, target: &Target, params: &RangeParams<'_>) -> bool {
    let from = params.geometry.cell_center(candidate);
    target
        .silhouette_points(params.geometry)
        .into_iter()
        .any(|point| !params.obstacles.blocks_sight(from, point))
}

/// Per-cell count of how many targets are hittable from it, with the color
/// of the first granting weapon encountered.
pub fn build_range_count(
    per_target: &[AHashMap<TileKey, ColorTag>],
) -> AHashMap<TileKey, (usize, ColorTag)> {
    let mut out: AHashMap<TileKey, (usize, ColorTag)> = AHashMap::new();
    for cells in per_target {
        for (key, color) in cells {
            out.entry(*key)
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, *color));
        }
    }
    out
}

/// Reachable cells covering every selected target
pub fn ideal_cells(
    per_target: &[AHashMap<TileKey, ColorTag>],
    reachable: &ReachableSet,
) -> AHashSet<TileKey> {
    let wanted = per_target.len();
    if wanted == 0 {
        return AHashSet::new();
    }
    build_range_count(per_target)
        .into_iter()
        .filter(|(key, (count, _))| *count == wanted && reachable.contains(key))
        .map(|(key, _)| key)
        .collect()
}
