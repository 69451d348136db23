//! Wall segments and the obstacle tester
//!
//! Walls are pixel-space segments that may block movement, sight, or both.
//! The engine only ever asks whether the straight line between two points
//! crosses a blocking segment.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Point-to-point obstruction queries
pub trait ObstacleTester: Sync {
    fn blocks_movement(&self, a: Vec2, b: Vec2) -> bool;

    fn blocks_sight(&self, a: Vec2, b: Vec2) -> bool;
}

/// A single wall segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub a: Vec2,
    pub b: Vec2,
    /// Blocks movement along paths crossing it
    pub movement: bool,
    /// Blocks line of sight
    pub sight: bool,
}

impl Wall {
    /// A wall blocking both movement and sight
    pub fn solid(a: Vec2, b: Vec2) -> Self {
        Self { a, b, movement: true, sight: true }
    }

    /// A window: blocks movement but not sight
    pub fn window(a: Vec2, b: Vec2) -> Self {
        Self { a, b, movement: true, sight: false }
    }

    /// A curtain: blocks sight but not movement
    pub fn curtain(a: Vec2, b: Vec2) -> Self {
        Self { a, b, movement: false, sight: true }
    }
}

/// The obstacle layer for a scene
#[derive(Debug, Clone, Default)]
pub struct WallLayer {
    walls: Vec<Wall>,
}

impl WallLayer {
    pub fn new(walls: Vec<Wall>) -> Self {
        Self { walls }
    }

    pub fn push(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Endpoint pairs of movement-blocking walls, for the gridless sweep
    pub fn movement_segments(&self) -> Vec<(Vec2, Vec2)> {
        self.walls
            .iter()
            .filter(|w| w.movement)
            .map(|w| (w.a, w.b))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

impl ObstacleTester for WallLayer {
    fn blocks_movement(&self, a: Vec2, b: Vec2) -> bool {
        self.walls
            .iter()
            .any(|w| w.movement && segments_intersect(a, b, w.a, w.b))
    }

    fn blocks_sight(&self, a: Vec2, b: Vec2) -> bool {
        self.walls
            .iter()
            .any(|w| w.sight && segments_intersect(a, b, w.a, w.b))
    }
}

/// Check if two line segments properly intersect (crossing, not touching)
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = cross_sign(b1, b2, a1);
    let d2 = cross_sign(b1, b2, a2);
    let d3 = cross_sign(a1, a2, b1);
    let d4 = cross_sign(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn cross_sign(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
