//! Cube coordinates for hex grids
//!
//! Uses axial coordinates (q, r) with the third cube coordinate derived.
//! Offset conversion handles both hex orientations and both offset parities.

use serde::{Deserialize, Serialize};

use crate::grid::tile::TileKey;

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
}

impl CubeCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance between two cells
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// All 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [CubeCoord; 6] {
        [
            CubeCoord::new(self.q + 1, self.r),
            CubeCoord::new(self.q + 1, self.r - 1),
            CubeCoord::new(self.q, self.r - 1),
            CubeCoord::new(self.q - 1, self.r),
            CubeCoord::new(self.q - 1, self.r + 1),
            CubeCoord::new(self.q, self.r + 1),
        ]
    }

    /// All hexes within `range` of this one (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<CubeCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(CubeCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Round floating point hex to the nearest integer hex
    pub fn round(q: f32, r: f32) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

/// Whether hex rows or hex columns are offset against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HexOrientation {
    /// Pointy-top hexes; every other row is shifted
    #[default]
    Rows,
    /// Flat-top hexes; every other column is shifted
    Columns,
}

/// Offset convention of a hex grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HexLayout {
    pub orientation: HexOrientation,
    /// True if even rows/columns are the shifted ones
    pub even: bool,
}

impl HexLayout {
    /// Convert offset coordinates (row = gx, col = gy) to cube coordinates
    pub fn offset_to_cube(&self, key: TileKey) -> CubeCoord {
        let row = key.gx;
        let col = key.gy;
        let parity = if self.even { 1 } else { -1 };
        match self.orientation {
            HexOrientation::Rows => {
                let q = col - (row + parity * (row & 1)) / 2;
                CubeCoord::new(q, row)
            }
            HexOrientation::Columns => {
                let r = row - (col + parity * (col & 1)) / 2;
                CubeCoord::new(col, r)
            }
        }
    }

    /// Convert cube coordinates back to offset coordinates
    pub fn cube_to_offset(&self, cube: CubeCoord) -> TileKey {
        let parity = if self.even { 1 } else { -1 };
        match self.orientation {
            HexOrientation::Rows => {
                let row = cube.r;
                let col = cube.q + (row + parity * (row & 1)) / 2;
                TileKey::new(row, col)
            }
            HexOrientation::Columns => {
                let col = cube.q;
                let row = cube.r + (col + parity * (col & 1)) / 2;
                TileKey::new(row, col)
            }
        }
    }
}
