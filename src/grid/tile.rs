//! Grid cell identity and per-search cell state

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::config::ColorTag;
use crate::core::constants::MAX_DIST;

/// Integer offset coordinates identifying one grid cell.
///
/// `gx` is the row index and `gy` the column index, matching the offset
/// convention of the geometry providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TileKey {
    pub gx: i32,
    pub gy: i32,
}

impl TileKey {
    pub fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }

    /// True if the other cell differs in both coordinates
    pub fn is_diagonal(&self, other: &TileKey) -> bool {
        self.gx != other.gx && self.gy != other.gy
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.gx, self.gy)
    }
}

/// Mutable per-search state for one discovered cell.
///
/// Created on demand when a neighbor is first discovered and discarded at
/// the end of the search pass; nothing persists across refreshes.
#[derive(Debug, Clone)]
pub struct GridTile {
    pub key: TileKey,
    /// Cumulative cost from the search origin, in tile units
    pub distance: f32,
    /// Closed-set marker; a settled tile is never re-examined
    pub visited: bool,
    /// Predecessors achieving the minimal distance within tolerance.
    /// Ties are kept, not broken.
    pub upstreams: AHashSet<TileKey>,
    /// Presentation tag, opaque to the search
    pub color: Option<ColorTag>,
}

impl GridTile {
    pub fn new(key: TileKey) -> Self {
        Self {
            key,
            distance: MAX_DIST,
            visited: false,
            upstreams: AHashSet::new(),
            color: None,
        }
    }

    pub fn with_color(key: TileKey, color: ColorTag) -> Self {
        Self {
            color: Some(color),
            ..Self::new(key)
        }
    }

    /// True if this tile was never reached within budget
    pub fn unreached(&self) -> bool {
        self.distance >= MAX_DIST
    }
}
