//! Refresh orchestration
//!
//! The controller owns per-agent state and turns one explicit
//! `recompute` call into a full reachability snapshot. It carries no
//! event subscriptions; the host invokes it and renders the returned
//! snapshot. Overlapping refresh requests coalesce into a single
//! trailing re-run.

use ahash::{AHashMap, AHashSet};
use geo::{BooleanOps, Contains, MultiPolygon, Point};
use glam::DVec2;

use crate::core::config::{ColorTag, OverlaySettings};
use crate::grid::geometry::GridGeometry;
use crate::grid::tile::TileKey;
use crate::gridless::shapes::intersect;
use crate::gridless::spread::SpreadParams;
use crate::gridless::{
    ideal_areas, movement_tiers, reach_corridor, target_range_circle, GridlessTarget, TierShape,
};
use crate::overlay::agent::{dedupe_weapons, ActorAdapter, AgentState};
use crate::range::{ideal_cells, target_range_cells, RangeParams, Target, WeaponRange};
use crate::search::bucket::action_bucket;
use crate::search::dijkstra::{reachable_tiles, ReachableSet, SearchParams};
use crate::search::upstream::UpstreamIndex;
use crate::terrain::{FlatCost, TerrainCost};
use crate::world::ObstacleTester;

/// Why a recompute was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    AgentMoved,
    TargetsChanged,
    SettingsChanged,
    TurnChanged,
    Forced,
}

/// One-shot user-facing notices; fire-and-forget, never part of the
/// snapshot itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Targets are selected but no reachable cell covers them all
    NoIdealCells,
    /// The agent has no usable speed; the host should prompt for one
    MissingSpeed { agent_id: u64 },
}

pub trait NotificationSink: Sync {
    fn notify(&self, notice: Notice);
}

/// Collaborators and settings for one recompute call. Built fresh by the
/// host per call; the engine reads no ambient state.
pub struct ReachContext<'a> {
    pub geometry: &'a dyn GridGeometry,
    pub obstacles: &'a dyn ObstacleTester,
    pub terrain: &'a dyn TerrainCost,
    pub actors: &'a dyn ActorAdapter,
    pub notifications: &'a dyn NotificationSink,
    pub settings: &'a OverlaySettings,
    pub targets: &'a [Target],
}

/// Collaborators and settings for one gridless recompute call. Distances
/// are in pixels; `px_per_unit` converts speeds and weapon ranges.
pub struct GridlessContext<'a> {
    /// Movement-blocking wall segments in pixel space
    pub segments: &'a [(DVec2, DVec2)],
    pub actors: &'a dyn ActorAdapter,
    pub notifications: &'a dyn NotificationSink,
    pub settings: &'a OverlaySettings,
    pub targets: &'a [GridlessTarget],
    pub px_per_unit: f64,
}

/// Everything a renderer needs for one frame of the overlay
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    /// Reachable cells with distances, upstream sets, and tier colors
    pub tiles: ReachableSet,
    /// Transitive predecessor closure for path highlighting
    pub upstreams: UpstreamIndex,
    /// Per-target cells the agent could attack from
    pub target_cells: Vec<(u64, AHashMap<TileKey, ColorTag>)>,
    /// Reachable cells covering every selected target
    pub ideal: AHashSet<TileKey>,
    /// True when targets are selected but the ideal set came up empty and
    /// the overlay falls back to the unfiltered reachable area
    pub ideal_fallback: bool,
    /// Fewest actions that bring each target into range, if any cell does
    pub actions_to_reach: AHashMap<u64, Option<u32>>,
}

/// The gridless counterpart of [`Reachability`]: polygon shapes instead
/// of cell sets.
#[derive(Debug, Clone)]
pub struct GridlessReachability {
    /// Movement shapes, furthest tier first
    pub tiers: Vec<TierShape>,
    /// Reachable area covering every selected target with some weapon
    pub ideal: MultiPolygon<f64>,
    /// Approximate approach corridor toward the ideal area
    pub corridor: MultiPolygon<f64>,
    /// True when targets are selected but the ideal area came up empty
    pub ideal_fallback: bool,
    /// Fewest actions that bring each target into range, if any tier does
    pub actions_to_reach: AHashMap<u64, Option<u32>>,
}

impl Default for GridlessReachability {
    fn default() -> Self {
        Self {
            tiers: Vec::new(),
            ideal: MultiPolygon::new(vec![]),
            corridor: MultiPolygon::new(vec![]),
            ideal_fallback: false,
            actions_to_reach: AHashMap::new(),
        }
    }
}

/// Owns per-agent state across refreshes within a scene
#[derive(Default)]
pub struct RefreshController {
    agents: AHashMap<u64, AgentState>,
    refreshing: bool,
    pending: bool,
    warned_no_ideal: bool,
    last_targets: AHashSet<u64>,
}

impl RefreshController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self, id: u64) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: u64) -> Option<&mut AgentState> {
        self.agents.get_mut(&id)
    }

    pub fn upsert_agent(&mut self, agent: AgentState) {
        self.agents.insert(agent.id, agent);
    }

    /// Drop all per-agent state, e.g. when the scene changes
    pub fn reset(&mut self) {
        self.agents.clear();
        self.warned_no_ideal = false;
        self.last_targets.clear();
    }

    /// Recompute the overlay for one agent, coalescing re-entrant
    /// requests into a single trailing re-run.
    pub fn request_refresh(
        &mut self,
        agent_id: u64,
        trigger: RefreshTrigger,
        ctx: &ReachContext<'_>,
    ) -> Option<Reachability> {
        if self.refreshing {
            self.pending = true;
            return None;
        }
        self.refreshing = true;
        let mut snapshot = self.recompute(agent_id, trigger, ctx);
        while self.pending {
            self.pending = false;
            snapshot = self.recompute(agent_id, trigger, ctx);
        }
        self.refreshing = false;
        Some(snapshot)
    }

    /// One full recompute pass
    pub fn recompute(
        &mut self,
        agent_id: u64,
        trigger: RefreshTrigger,
        ctx: &ReachContext<'_>,
    ) -> Reachability {
        self.note_target_selection(ctx.targets.iter().map(|t| t.id));

        let Some(agent) = self.agents.get_mut(&agent_id) else {
            tracing::debug!("Refresh for unknown agent {agent_id}, nothing to do");
            return Reachability::default();
        };
        tracing::debug!("Recomputing overlay for agent {agent_id}: {trigger:?}");

        let Some(speed) = resolve_speed(agent, ctx.actors, ctx.notifications) else {
            return Reachability::default();
        };
        agent.unmodified_speed = ctx.actors.unmodified_speed(agent_id);

        let skip_terrain = ctx.settings.ignore_difficult_terrain
            || agent.ignore_difficult_terrain
            || ctx.actors.ignores_difficult_terrain(agent_id);
        let terrain: &dyn TerrainCost = if skip_terrain { &FlatCost } else { ctx.terrain };

        // Speed-percent backends already slow the live speed attribute;
        // search from the unmodified value so terrain is charged once.
        let speed = if terrain.modifies_speed() {
            agent.unmodified_speed.unwrap_or(speed)
        } else {
            speed
        };
        let tiles_per_action = speed / ctx.geometry.distance_per_cell();

        let origin = agent.occupied_cells(ctx.geometry);
        let weapons = dedupe_weapons(ctx.actors.weapons(agent_id));
        let targets: Vec<&Target> = ctx.targets.iter().filter(|t| t.visible).collect();

        let search = SearchParams {
            geometry: ctx.geometry,
            obstacles: ctx.obstacles,
            terrain,
            policy: ctx.settings.diagonal_policy,
            tiles_per_action,
            actions: ctx.settings.actions_to_show,
        };
        let range = RangeParams {
            geometry: ctx.geometry,
            obstacles: ctx.obstacles,
        };

        // Movement and range reachability share no mutable state.
        let (mut tiles, target_cells) = rayon::join(
            || reachable_tiles(&origin, &search),
            || {
                targets
                    .iter()
                    .map(|&t| (t.id, target_range_cells(t, &weapons, &range)))
                    .collect::<Vec<_>>()
            },
        );

        tiles.colorize(
            tiles_per_action,
            ctx.settings.diagonal_policy,
            &ctx.settings.palette,
        );
        let upstreams = UpstreamIndex::build(&tiles);

        let per_target: Vec<_> = target_cells.iter().map(|(_, cells)| cells.clone()).collect();
        let ideal = ideal_cells(&per_target, &tiles);

        let mut ideal_fallback = false;
        if !targets.is_empty() && ideal.is_empty() {
            ideal_fallback = true;
            if !self.warned_no_ideal {
                self.warned_no_ideal = true;
                ctx.notifications.notify(Notice::NoIdealCells);
            }
        }

        let max_tier = ctx.settings.palette.len().saturating_sub(1);
        let actions_to_reach = target_cells
            .iter()
            .map(|(id, cells)| {
                let best = cells
                    .keys()
                    .filter_map(|key| tiles.distance(key))
                    .map(|d| {
                        action_bucket(
                            d,
                            tiles_per_action,
                            ctx.settings.diagonal_policy,
                            max_tier,
                        ) as u32
                    })
                    .min();
                (*id, best)
            })
            .collect();

        Reachability {
            tiles,
            upstreams,
            target_cells,
            ideal,
            ideal_fallback,
            actions_to_reach,
        }
    }

    /// Recompute the gridless overlay for one agent, with the same
    /// coalescing behavior as [`Self::request_refresh`].
    pub fn request_refresh_gridless(
        &mut self,
        agent_id: u64,
        trigger: RefreshTrigger,
        ctx: &GridlessContext<'_>,
    ) -> Option<GridlessReachability> {
        if self.refreshing {
            self.pending = true;
            return None;
        }
        self.refreshing = true;
        let mut snapshot = self.recompute_gridless(agent_id, trigger, ctx);
        while self.pending {
            self.pending = false;
            snapshot = self.recompute_gridless(agent_id, trigger, ctx);
        }
        self.refreshing = false;
        Some(snapshot)
    }

    /// One full recompute pass for a scene without a grid
    pub fn recompute_gridless(
        &mut self,
        agent_id: u64,
        trigger: RefreshTrigger,
        ctx: &GridlessContext<'_>,
    ) -> GridlessReachability {
        self.note_target_selection(ctx.targets.iter().map(|t| t.id));

        let Some(agent) = self.agents.get_mut(&agent_id) else {
            tracing::debug!("Refresh for unknown agent {agent_id}, nothing to do");
            return GridlessReachability::default();
        };
        tracing::debug!("Recomputing gridless overlay for agent {agent_id}: {trigger:?}");

        let Some(speed) = resolve_speed(agent, ctx.actors, ctx.notifications) else {
            return GridlessReachability::default();
        };
        let px_per_action = speed as f64 * ctx.px_per_unit;
        let origin = DVec2::new(agent.measure_from.x as f64, agent.measure_from.y as f64);

        let weapons = dedupe_weapons(ctx.actors.weapons(agent_id));
        let targets: Vec<GridlessTarget> =
            ctx.targets.iter().filter(|t| t.visible).copied().collect();
        let spread = SpreadParams {
            segments: ctx.segments,
            depth: ctx.settings.recursion_depth,
        };

        // Movement tiers and per-target coverage share no mutable state.
        let (tiers, coverage) = rayon::join(
            || {
                movement_tiers(
                    origin,
                    px_per_action,
                    ctx.settings.actions_to_show,
                    &spread,
                    &ctx.settings.palette,
                )
            },
            || {
                targets
                    .iter()
                    .map(|t| {
                        let circles = weapons
                            .iter()
                            .map(|w| target_range_circle(t, w, ctx.px_per_unit))
                            .reduce(|a, b| a.union(&b))
                            .unwrap_or_else(|| MultiPolygon::new(vec![]));
                        (t.id, circles)
                    })
                    .collect::<Vec<_>>()
            },
        );

        let outer = tiers
            .first()
            .map(|t| t.shape.clone())
            .unwrap_or_else(|| MultiPolygon::new(vec![]));
        let ideal = ideal_areas(&targets, &weapons, &outer, ctx.px_per_unit);

        let mut ideal_fallback = false;
        if !targets.is_empty() && ideal.0.is_empty() {
            ideal_fallback = true;
            if !self.warned_no_ideal {
                self.warned_no_ideal = true;
                ctx.notifications.notify(Notice::NoIdealCells);
            }
        }

        let budget_px = px_per_action * ctx.settings.actions_to_show as f64;
        let corridor = reach_corridor(origin, &ideal, &outer, budget_px);

        // Fewest actions per target: zero when the agent already stands
        // inside the target's coverage, otherwise the innermost tier whose
        // shape overlaps it. Tiers are stored furthest first.
        let here = Point::new(origin.x, origin.y);
        let actions_to_reach = coverage
            .iter()
            .map(|(id, circles)| {
                let best = if circles.contains(&here) {
                    Some(0)
                } else {
                    tiers
                        .iter()
                        .rev()
                        .find(|t| !intersect(&t.shape, circles).0.is_empty())
                        .map(|t| t.tier)
                };
                (*id, best)
            })
            .collect();

        GridlessReachability {
            tiers,
            ideal,
            corridor,
            ideal_fallback,
            actions_to_reach,
        }
    }

    /// Reset the one-shot no-ideal warning whenever the selection changes
    fn note_target_selection(&mut self, ids: impl Iterator<Item = u64>) {
        let current: AHashSet<u64> = ids.collect();
        if current != self.last_targets {
            self.warned_no_ideal = false;
            self.last_targets = current;
        }
    }
}

/// Pull the agent's effective speed, prompting the host once when neither
/// the override nor the adapter provides one.
fn resolve_speed(
    agent: &mut AgentState,
    actors: &dyn ActorAdapter,
    notifications: &dyn NotificationSink,
) -> Option<f32> {
    let speed = agent.speed_override.or_else(|| actors.speed(agent.id));
    if speed.is_none() && !agent.speed_prompted {
        agent.speed_prompted = true;
        notifications.notify(Notice::MissingSpeed { agent_id: agent.id });
    }
    speed
}

/// Weapons usable against a target from the agent's current cell, for
/// quick "can I already hit it" checks without a full snapshot.
pub fn weapons_in_range_from(
    cell: TileKey,
    target: &Target,
    weapons: &[WeaponRange],
    params: &RangeParams<'_>,
) -> Vec<WeaponRange> {
    weapons
        .iter()
        .filter(|w| {
            target_range_cells(target, std::slice::from_ref(*w), params).contains_key(&cell)
        })
        .cloned()
        .collect()
}
