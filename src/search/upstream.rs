//! Transitive predecessor closure over a finished search
//!
//! The search records only direct predecessors. Path highlighting and
//! corridor checks need "is cell A anywhere upstream of cell B", so the
//! closure is materialized once per search, cheapest cells first so every
//! predecessor's set already exists when its dependents are built.

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::grid::tile::TileKey;
use crate::search::dijkstra::ReachableSet;

/// All-upstreams lookup for every reachable cell
#[derive(Debug, Clone, Default)]
pub struct UpstreamIndex {
    closure: AHashMap<TileKey, AHashSet<TileKey>>,
}

impl UpstreamIndex {
    pub fn build(set: &ReachableSet) -> Self {
        let mut order: Vec<_> = set.iter().map(|t| (t.key, t.distance)).collect();
        order.sort_by_key(|(_, d)| OrderedFloat(*d));

        let mut closure: AHashMap<TileKey, AHashSet<TileKey>> =
            AHashMap::with_capacity(order.len());
        for (key, _) in order {
            let mut all = AHashSet::new();
            if let Some(tile) = set.get(&key) {
                for upstream in &tile.upstreams {
                    all.insert(*upstream);
                    if let Some(theirs) = closure.get(upstream) {
                        all.extend(theirs.iter().copied());
                    }
                }
            }
            closure.insert(key, all);
        }
        Self { closure }
    }

    /// Every cell on any minimal path from the origin to `key`
    pub fn upstreams_of(&self, key: &TileKey) -> Option<&AHashSet<TileKey>> {
        self.closure.get(key)
    }

    /// True if `candidate` lies on some minimal path to `key`
    pub fn is_upstream(&self, key: &TileKey, candidate: &TileKey) -> bool {
        self.closure
            .get(key)
            .is_some_and(|set| set.contains(candidate))
    }

    /// The cells to highlight for a move to `dest`: the destination plus
    /// everything upstream of it.
    pub fn path_tiles(&self, dest: &TileKey) -> AHashSet<TileKey> {
        let mut out = self.closure.get(dest).cloned().unwrap_or_default();
        out.insert(*dest);
        out
    }
}
