//! Scene obstacle layer

pub mod walls;

pub use walls::{ObstacleTester, Wall, WallLayer};
