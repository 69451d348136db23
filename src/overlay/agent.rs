//! Per-agent movement bookkeeping and the actor accessor seam

use glam::Vec2;
use ordered_float::OrderedFloat;

use crate::grid::geometry::GridGeometry;
use crate::grid::tile::TileKey;
use crate::range::WeaponRange;

/// Movement state tracked per logical agent.
///
/// `measure_from` is where paths are computed from and deliberately lags
/// `location`: it snaps forward at turn boundaries so mid-turn previews
/// keep measuring from where the turn started.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub id: u64,
    /// Top-left pixel of the footprint paths are measured from
    pub measure_from: Vec2,
    /// Literal current top-left pixel
    pub location: Vec2,
    /// Footprint in cells
    pub width: i32,
    pub height: i32,
    /// Host-supplied override; when absent the actor accessor is asked
    pub speed_override: Option<f32>,
    /// Speed before modifiers, kept for presentation
    pub unmodified_speed: Option<f32>,
    pub ignore_difficult_terrain: bool,
    /// Set once the missing-speed prompt has been raised for this agent
    pub speed_prompted: bool,
}

impl AgentState {
    pub fn new(id: u64, position: Vec2) -> Self {
        Self {
            id,
            measure_from: position,
            location: position,
            width: 1,
            height: 1,
            speed_override: None,
            unmodified_speed: None,
            ignore_difficult_terrain: false,
            speed_prompted: false,
        }
    }

    /// Record a mid-turn move without changing the measuring point
    pub fn move_to(&mut self, position: Vec2) {
        self.location = position;
    }

    /// Snap the measuring point to the current position at a turn boundary
    pub fn begin_turn(&mut self) {
        self.measure_from = self.location;
    }

    /// Cells the footprint occupies at the measuring point
    pub fn occupied_cells(&self, geometry: &dyn GridGeometry) -> Vec<TileKey> {
        let half = Vec2::splat(geometry.cell_size() / 2.0);
        let base = geometry.cell_from_point(self.measure_from + half);
        let mut out = Vec::with_capacity((self.width * self.height).max(1) as usize);
        for row in 0..self.height.max(1) {
            for col in 0..self.width.max(1) {
                out.push(TileKey::new(base.gx + row, base.gy + col));
            }
        }
        out
    }

    /// Pixel center of the footprint at the measuring point
    pub fn center(&self, geometry: &dyn GridGeometry) -> Vec2 {
        let size = geometry.cell_size();
        self.measure_from
            + Vec2::new(
                self.width.max(1) as f32 * size / 2.0,
                self.height.max(1) as f32 * size / 2.0,
            )
    }
}

/// Read-only seam to the host's rules system.
///
/// Implemented once per supported rules system; the engine never branches
/// on a system identifier.
pub trait ActorAdapter: Sync {
    /// Distance one action buys, in scene units
    fn speed(&self, agent_id: u64) -> Option<f32>;

    /// Speed before terrain or condition modifiers
    fn unmodified_speed(&self, agent_id: u64) -> Option<f32> {
        self.speed(agent_id)
    }

    fn weapons(&self, agent_id: u64) -> Vec<WeaponRange>;

    fn ignores_difficult_terrain(&self, _agent_id: u64) -> bool {
        false
    }
}

/// Sort weapons by reach and drop duplicates of the same range; the first
/// listed weapon of a given range keeps its color.
pub fn dedupe_weapons(mut weapons: Vec<WeaponRange>) -> Vec<WeaponRange> {
    weapons.sort_by_key(|w| OrderedFloat(w.range));
    weapons.dedup_by_key(|w| OrderedFloat(w.range));
    weapons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::geometry::SquareGrid;

    #[test]
    fn test_measure_from_lags_location() {
        let mut agent = AgentState::new(1, Vec2::new(100.0, 100.0));
        agent.move_to(Vec2::new(300.0, 100.0));
        assert_eq!(agent.measure_from, Vec2::new(100.0, 100.0));
        agent.begin_turn();
        assert_eq!(agent.measure_from, Vec2::new(300.0, 100.0));
    }

    #[test]
    fn test_occupied_cells_footprint() {
        let grid = SquareGrid::new(100.0, 5.0);
        let mut agent = AgentState::new(1, Vec2::new(200.0, 100.0));
        agent.width = 2;
        agent.height = 2;
        let cells = agent.occupied_cells(&grid);
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&TileKey::new(1, 2)));
        assert!(cells.contains(&TileKey::new(2, 3)));
    }

    #[test]
    fn test_dedupe_weapons_keeps_first_of_range() {
        let weapons = vec![
            WeaponRange::new(30.0, 1),
            WeaponRange::new(5.0, 2),
            WeaponRange::new(30.0, 3),
        ];
        let deduped = dedupe_weapons(weapons);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].range, 5.0);
        assert_eq!(deduped[1].color, 1);
    }
}
