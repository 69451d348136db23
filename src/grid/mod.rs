//! Grid cells, coordinates, and geometry providers

pub mod geometry;
pub mod hex;
pub mod tile;

pub use geometry::{GridGeometry, HexGrid, SquareGrid};
pub use tile::{GridTile, TileKey};
