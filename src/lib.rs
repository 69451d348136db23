//! Tactical Reach - movement and targeting decision core for turn-based overlays

pub mod core;
pub mod grid;
pub mod gridless;
pub mod overlay;
pub mod range;
pub mod search;
pub mod terrain;
pub mod world;
