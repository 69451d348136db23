//! Budget-bounded reachability search over grid cells
//!
//! A Dijkstra variant tuned for small per-turn budgets: the frontier is a
//! flat set scanned linearly for the minimum, ties within `FUDGE` keep
//! every predecessor, and any relaxation whose rounded distance exceeds
//! the action budget is pruned instead of queued.

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::core::config::ColorTag;
use crate::core::constants::{FUDGE, MAX_DIST};
use crate::grid::geometry::GridGeometry;
use crate::grid::tile::{GridTile, TileKey};
use crate::search::bucket::{color_for, DiagonalPolicy};
use crate::terrain::TerrainCost;
use crate::world::ObstacleTester;

/// Inputs shared by one search pass
pub struct SearchParams<'a> {
    pub geometry: &'a dyn GridGeometry,
    pub obstacles: &'a dyn ObstacleTester,
    pub terrain: &'a dyn TerrainCost,
    pub policy: DiagonalPolicy,
    /// Whole tiles of movement one action buys
    pub tiles_per_action: f32,
    /// Number of actions worth of movement to explore
    pub actions: u32,
}

impl<'a> SearchParams<'a> {
    /// Largest rounded distance still inside the budget
    pub fn budget(&self) -> f32 {
        self.tiles_per_action * self.actions as f32
    }
}

/// All cells reachable within the action budget, with their distances
/// and tie-preserving predecessor sets.
#[derive(Debug, Clone, Default)]
pub struct ReachableSet {
    tiles: AHashMap<TileKey, GridTile>,
    origin: Vec<TileKey>,
}

impl ReachableSet {
    pub fn get(&self, key: &TileKey) -> Option<&GridTile> {
        self.tiles.get(key)
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn distance(&self, key: &TileKey) -> Option<f32> {
        self.tiles.get(key).map(|t| t.distance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridTile> {
        self.tiles.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.tiles.keys()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cells the searched agent occupies, all at distance zero
    pub fn origin(&self) -> &[TileKey] {
        &self.origin
    }

    /// Tag every tile with its action-tier color
    pub fn colorize(&mut self, tiles_per_action: f32, policy: DiagonalPolicy, palette: &[ColorTag]) {
        for tile in self.tiles.values_mut() {
            tile.color = Some(color_for(tile.distance, tiles_per_action, policy, palette));
        }
    }
}

/// Explore outward from the agent's occupied cells until the budget is
/// exhausted.
pub fn reachable_tiles(origin: &[TileKey], params: &SearchParams<'_>) -> ReachableSet {
    let budget = params.budget();
    let mut tiles: AHashMap<TileKey, GridTile> = AHashMap::new();
    let mut frontier: AHashSet<TileKey> = AHashSet::new();

    for key in origin {
        let mut tile = GridTile::new(*key);
        tile.distance = 0.0;
        tiles.insert(*key, tile);
        frontier.insert(*key);
    }

    while let Some(current_key) = pop_nearest(&mut frontier, &tiles) {
        let current = &tiles[&current_key];
        if current.visited {
            tracing::warn!("Tile {current_key} settled twice, skipping");
            continue;
        }
        if current.unreached() {
            break;
        }
        let current_distance = current.distance;
        let current_center = params.geometry.cell_center(current_key);
        if let Some(tile) = tiles.get_mut(&current_key) {
            tile.visited = true;
        }

        for neighbor_key in params.geometry.neighbors_of(current_key) {
            let neighbor_center = params.geometry.cell_center(neighbor_key);
            if params
                .obstacles
                .blocks_movement(current_center, neighbor_center)
            {
                continue;
            }

            let entry_cost =
                params
                    .terrain
                    .cost_to_enter(current_key, neighbor_key, params.geometry);
            let mut step = current_distance + entry_cost;
            // Hex grids have no diagonals; offset coordinates of adjacent
            // hexes may still differ in both components.
            if !params.geometry.is_hex() && current_key.is_diagonal(&neighbor_key) {
                step += params.policy.delta();
            }
            if params.policy.round(step) > budget {
                continue;
            }

            let neighbor = tiles
                .entry(neighbor_key)
                .or_insert_with(|| GridTile::new(neighbor_key));
            if neighbor.visited {
                continue;
            }
            if (step - neighbor.distance).abs() < FUDGE {
                // Equal-cost path through a different predecessor
                neighbor.upstreams.insert(current_key);
            } else if step < neighbor.distance {
                neighbor.distance = step;
                neighbor.upstreams.clear();
                neighbor.upstreams.insert(current_key);
                frontier.insert(neighbor_key);
            }
        }
    }

    ReachableSet {
        tiles,
        origin: origin.to_vec(),
    }
}

/// Linear scan for the unsettled frontier tile with minimal distance
fn pop_nearest(
    frontier: &mut AHashSet<TileKey>,
    tiles: &AHashMap<TileKey, GridTile>,
) -> Option<TileKey> {
    let nearest = frontier
        .iter()
        .min_by_key(|key| {
            OrderedFloat(tiles.get(*key).map(|t| t.distance).unwrap_or(MAX_DIST))
        })
        .copied()?;
    frontier.remove(&nearest);
    Some(nearest)
}
