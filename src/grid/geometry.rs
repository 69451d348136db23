//! Grid geometry providers
//!
//! The engine talks to the host grid through the `GridGeometry` trait and
//! never branches on host specifics. Concrete square and hex providers are
//! supplied for tests and for hosts without their own grid math.

use glam::Vec2;

use crate::grid::hex::{CubeCoord, HexLayout, HexOrientation};
use crate::grid::tile::TileKey;

/// Pixel-space geometry of a discrete grid
pub trait GridGeometry: Sync {
    /// Size of one cell in pixels (side length for squares, bounding width
    /// for hexes). Used for sub-cell sampling offsets.
    fn cell_size(&self) -> f32;

    /// Scene distance represented by one cell (e.g. 5 ft)
    fn distance_per_cell(&self) -> f32;

    fn cell_center(&self, key: TileKey) -> Vec2;

    fn cell_top_left(&self, key: TileKey) -> Vec2;

    fn cell_from_point(&self, point: Vec2) -> TileKey;

    /// Adjacent cells: 8 for square grids, 6 for hex grids
    fn neighbors_of(&self, key: TileKey) -> Vec<TileKey>;

    /// Cell outline in pixel coordinates
    fn vertices(&self, key: TileKey) -> Vec<Vec2>;

    fn is_hex(&self) -> bool {
        false
    }

    /// Offset convention, present only for hex grids
    fn hex_layout(&self) -> Option<HexLayout> {
        None
    }
}

/// Square grid with 8-connected neighbors
#[derive(Debug, Clone)]
pub struct SquareGrid {
    /// Cell side length in pixels
    pub size: f32,
    /// Scene distance per cell
    pub distance: f32,
}

impl SquareGrid {
    pub fn new(size: f32, distance: f32) -> Self {
        Self { size, distance }
    }
}

impl GridGeometry for SquareGrid {
    fn cell_size(&self) -> f32 {
        self.size
    }

    fn distance_per_cell(&self) -> f32 {
        self.distance
    }

    fn cell_center(&self, key: TileKey) -> Vec2 {
        self.cell_top_left(key) + Vec2::splat(self.size / 2.0)
    }

    fn cell_top_left(&self, key: TileKey) -> Vec2 {
        // gx is the row (y axis), gy the column (x axis)
        Vec2::new(key.gy as f32 * self.size, key.gx as f32 * self.size)
    }

    fn cell_from_point(&self, point: Vec2) -> TileKey {
        TileKey::new(
            (point.y / self.size).floor() as i32,
            (point.x / self.size).floor() as i32,
        )
    }

    fn neighbors_of(&self, key: TileKey) -> Vec<TileKey> {
        let mut out = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                out.push(TileKey::new(key.gx + dx, key.gy + dy));
            }
        }
        out
    }

    fn vertices(&self, key: TileKey) -> Vec<Vec2> {
        let tl = self.cell_top_left(key);
        vec![
            tl,
            tl + Vec2::new(self.size, 0.0),
            tl + Vec2::new(self.size, self.size),
            tl + Vec2::new(0.0, self.size),
        ]
    }
}

/// Hex grid parameterized by circumradius and offset layout
#[derive(Debug, Clone)]
pub struct HexGrid {
    /// Circumradius (center to vertex) in pixels
    pub radius: f32,
    /// Scene distance per cell
    pub distance: f32,
    pub layout: HexLayout,
}

impl HexGrid {
    pub fn new(radius: f32, distance: f32, layout: HexLayout) -> Self {
        Self { radius, distance, layout }
    }

    fn center_of_cube(&self, cube: CubeCoord) -> Vec2 {
        let s = self.radius;
        let sqrt3 = 3.0_f32.sqrt();
        let (q, r) = (cube.q as f32, cube.r as f32);
        match self.layout.orientation {
            HexOrientation::Rows => Vec2::new(s * sqrt3 * (q + r / 2.0), s * 1.5 * r),
            HexOrientation::Columns => Vec2::new(s * 1.5 * q, s * sqrt3 * (r + q / 2.0)),
        }
    }

    fn bounding_extent(&self) -> Vec2 {
        let s = self.radius;
        let sqrt3 = 3.0_f32.sqrt();
        match self.layout.orientation {
            HexOrientation::Rows => Vec2::new(sqrt3 * s, 2.0 * s),
            HexOrientation::Columns => Vec2::new(2.0 * s, sqrt3 * s),
        }
    }
}

impl GridGeometry for HexGrid {
    fn cell_size(&self) -> f32 {
        2.0 * self.radius
    }

    fn distance_per_cell(&self) -> f32 {
        self.distance
    }

    fn cell_center(&self, key: TileKey) -> Vec2 {
        self.center_of_cube(self.layout.offset_to_cube(key))
    }

    fn cell_top_left(&self, key: TileKey) -> Vec2 {
        self.cell_center(key) - self.bounding_extent() / 2.0
    }

    fn cell_from_point(&self, point: Vec2) -> TileKey {
        let s = self.radius;
        let sqrt3 = 3.0_f32.sqrt();
        let (q, r) = match self.layout.orientation {
            HexOrientation::Rows => (
                (sqrt3 / 3.0 * point.x - point.y / 3.0) / s,
                (2.0 / 3.0 * point.y) / s,
            ),
            HexOrientation::Columns => (
                (2.0 / 3.0 * point.x) / s,
                (-point.x / 3.0 + sqrt3 / 3.0 * point.y) / s,
            ),
        };
        self.layout.cube_to_offset(CubeCoord::round(q, r))
    }

    fn neighbors_of(&self, key: TileKey) -> Vec<TileKey> {
        self.layout
            .offset_to_cube(key)
            .neighbors()
            .iter()
            .map(|cube| self.layout.cube_to_offset(*cube))
            .collect()
    }

    fn vertices(&self, key: TileKey) -> Vec<Vec2> {
        let center = self.cell_center(key);
        let start = match self.layout.orientation {
            HexOrientation::Rows => 30.0_f32.to_radians(),
            HexOrientation::Columns => 0.0,
        };
        (0..6)
            .map(|i| {
                let angle = start + (i as f32) * 60.0_f32.to_radians();
                center + Vec2::new(angle.cos(), angle.sin()) * self.radius
            })
            .collect()
    }

    fn is_hex(&self) -> bool {
        true
    }

    fn hex_layout(&self) -> Option<HexLayout> {
        Some(self.layout)
    }
}
