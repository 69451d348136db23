//! Shared numeric constants for the reach engine
//!
//! All tolerances and tuning knobs are collected here with explanations of
//! their purpose.

/// Sentinel distance for tiles not yet reached by the search
pub const MAX_DIST: f32 = 999.0;

/// Floating point tolerance used when comparing cumulative path costs.
///
/// Two paths whose costs differ by less than this are treated as ties and
/// both predecessors are kept.
pub const FUDGE: f32 = 0.1;

/// How far past a wall corner a recursive spread re-originates (pixels)
pub const CORNER_SPACER: f64 = 2.0;

/// Spread polygons with less area than this (square pixels) are discarded
/// as numeric noise from the boolean union.
pub const MIN_SPREAD_AREA: f64 = 250.0;

/// Number of boundary samples used when approximating circles, ellipses
/// and the unobstructed arc of a sweep.
pub const ARC_SAMPLES: usize = 64;

/// Angular nudge used to probe both sides of a wall endpoint during a sweep
pub const SWEEP_EPSILON: f64 = 1e-4;

/// In five-point terrain sampling, cells where at most this many samples
/// disagree with open ground are treated as clear. Tunable heuristic that
/// avoids over-penalizing corner clipping.
pub const FIVE_POINT_CLEAR_MAX: usize = 2;

/// Minimum fraction of a cell that terrain regions must cover before the
/// area-overlap measure charges the cell at all.
pub const AREA_COVER_THRESHOLD: f64 = 0.5;
