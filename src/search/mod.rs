//! Movement reachability search and action-tier bucketing

pub mod bucket;
pub mod dijkstra;
pub mod upstream;

pub use bucket::{action_bucket, color_for, DiagonalPolicy};
pub use dijkstra::{reachable_tiles, ReachableSet, SearchParams};
pub use upstream::UpstreamIndex;
