//! Diagonal costing policies and action-tier bucketing

use serde::{Deserialize, Serialize};

use crate::core::config::ColorTag;
use crate::core::constants::FUDGE;

/// How diagonal steps on a square grid are costed and how raw tile
/// distances are rounded before budget checks and bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DiagonalPolicy {
    /// Diagonals alternate 1-2-1 tiles, rounding down the odd half
    #[default]
    AlternatingLow,
    /// Diagonals alternate 2-1-2 tiles, rounding up the odd half
    AlternatingHigh,
    /// Diagonals cost the same as orthogonal steps
    EqualCost,
    /// Diagonals cost two tiles
    DoubleCost,
}

impl DiagonalPolicy {
    /// Extra cost a diagonal step adds on top of the terrain entry cost
    pub fn delta(&self) -> f32 {
        match self {
            DiagonalPolicy::AlternatingLow | DiagonalPolicy::AlternatingHigh => 0.5,
            DiagonalPolicy::EqualCost => 0.0,
            DiagonalPolicy::DoubleCost => 1.0,
        }
    }

    /// Collapse a raw cumulative distance to whole tiles.
    ///
    /// The alternating policies accumulate half tiles per diagonal; whether
    /// the odd half counts is what distinguishes them.
    pub fn round(&self, distance: f32) -> f32 {
        match self {
            DiagonalPolicy::AlternatingLow => (distance + FUDGE).floor(),
            DiagonalPolicy::AlternatingHigh => (distance - FUDGE).ceil(),
            DiagonalPolicy::EqualCost | DiagonalPolicy::DoubleCost => distance.round(),
        }
    }
}

/// Map a tile distance to an action tier.
///
/// Tier 0 is reserved for the origin cells themselves; any positive
/// distance costs at least one action. Tiers past `max_tier` clamp.
pub fn action_bucket(
    distance: f32,
    tiles_per_action: f32,
    policy: DiagonalPolicy,
    max_tier: usize,
) -> usize {
    if distance == 0.0 {
        return 0;
    }
    let rounded = policy.round(distance);
    if rounded < 1.0 {
        return 1.min(max_tier);
    }
    let tier = (rounded / tiles_per_action).ceil() as usize;
    tier.min(max_tier)
}

/// Palette color for a tile distance
pub fn color_for(
    distance: f32,
    tiles_per_action: f32,
    policy: DiagonalPolicy,
    palette: &[ColorTag],
) -> ColorTag {
    let Some(last) = palette.len().checked_sub(1) else {
        return 0;
    };
    palette[action_bucket(distance, tiles_per_action, policy, last)]
}
