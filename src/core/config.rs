//! Engine configuration
//!
//! Everything the host can tune is passed in as a plain settings snapshot.
//! The engine never reads ambient global state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::search::bucket::DiagonalPolicy;
use crate::terrain::TerrainMeasure;

/// Opaque color tag carried through results for presentation. The engine
/// never interprets it.
pub type ColorTag = u32;

/// Default palette indexed by action tier (tier 0 = no movement needed).
pub const DEFAULT_PALETTE: [ColorTag; 5] = [0x0000ff, 0x00ff00, 0xffff00, 0xff0000, 0x800000];

/// How deep the gridless corner-spreading recursion may go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecursionDepth {
    Limited(u32),
    Unlimited,
}

impl RecursionDepth {
    /// True if another level of recursion is allowed below `level`
    pub fn allows(&self, level: u32) -> bool {
        match self {
            RecursionDepth::Limited(max) => level < *max,
            RecursionDepth::Unlimited => true,
        }
    }
}

impl Default for RecursionDepth {
    fn default() -> Self {
        RecursionDepth::Limited(3)
    }
}

/// Settings snapshot handed to every recompute call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// How diagonal steps are costed and rounded
    pub diagonal_policy: DiagonalPolicy,
    /// How many action tiers of movement to compute
    pub actions_to_show: u32,
    /// Depth bound for gridless corner spreading
    pub recursion_depth: RecursionDepth,
    /// Skip terrain costs entirely for this agent
    pub ignore_difficult_terrain: bool,
    /// How percent-based terrain backends sample a cell
    pub terrain_measure: TerrainMeasure,
    /// Color per action tier; distances past the end clamp to the last entry
    pub palette: Vec<ColorTag>,
}

impl OverlaySettings {
    /// Parse a settings snapshot from its JSON form
    pub fn load_from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a settings snapshot persisted by the host
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }

    /// Serialize the snapshot for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            diagonal_policy: DiagonalPolicy::default(),
            actions_to_show: 4,
            recursion_depth: RecursionDepth::default(),
            ignore_difficult_terrain: false,
            terrain_measure: TerrainMeasure::CenterPoint,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}
