//! Full-pipeline overlay tests: search, range, and controller together

use glam::Vec2;
use std::sync::Mutex;

use tactical_reach::core::config::OverlaySettings;
use tactical_reach::grid::{SquareGrid, TileKey};
use tactical_reach::overlay::{
    weapons_in_range_from, ActorAdapter, AgentState, Notice, NotificationSink, ReachContext,
    RefreshController, RefreshTrigger,
};
use tactical_reach::range::{RangeParams, Target, WeaponRange};
use tactical_reach::search::DiagonalPolicy;
use tactical_reach::terrain::{CellCost, FlatCost};
use tactical_reach::world::{Wall, WallLayer};

struct TestActor {
    speed: Option<f32>,
    weapons: Vec<WeaponRange>,
}

impl ActorAdapter for TestActor {
    fn speed(&self, _agent_id: u64) -> Option<f32> {
        self.speed
    }

    fn weapons(&self, _agent_id: u64) -> Vec<WeaponRange> {
        self.weapons.clone()
    }
}

#[derive(Default)]
struct CollectingSink {
    notices: Mutex<Vec<Notice>>,
}

impl NotificationSink for CollectingSink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn default_settings() -> OverlaySettings {
    OverlaySettings {
        diagonal_policy: DiagonalPolicy::AlternatingLow,
        actions_to_show: 1,
        ..OverlaySettings::default()
    }
}

#[test]
fn test_single_target_scenario() {
    init_logging();
    // Agent at the origin, speed 30 at 5 per cell, one action shown.
    // Single target 6 cells east with a 30-unit weapon.
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let actor = TestActor {
        speed: Some(30.0),
        weapons: vec![WeaponRange::new(30.0, 0xff0000)],
    };
    let sink = CollectingSink::default();
    let settings = default_settings();
    let targets = [Target::new(1, TileKey::new(0, 6), 1, 1)];
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &FlatCost,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &targets,
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let snapshot = controller
        .request_refresh(1, RefreshTrigger::Forced, &ctx)
        .unwrap();

    // Reachable area: 6 straight cells, 4 diagonal cells each way.
    assert!(snapshot.tiles.contains(&TileKey::new(0, 6)));
    assert!(snapshot.tiles.contains(&TileKey::new(4, 4)));
    assert!(!snapshot.tiles.contains(&TileKey::new(0, 7)));
    assert!(!snapshot.tiles.contains(&TileKey::new(5, 5)));

    // Every ideal cell is both reachable and inside the weapon envelope.
    assert!(!snapshot.ideal.is_empty());
    let (_, cells) = &snapshot.target_cells[0];
    for key in &snapshot.ideal {
        assert!(snapshot.tiles.contains(key));
        assert!(cells.contains_key(key));
    }
    assert!(sink.notices.lock().unwrap().is_empty());
}

#[test]
fn test_wall_splits_reachable_area() {
    let grid = SquareGrid::new(100.0, 5.0);
    // Long wall just east of the agent's column.
    let walls = WallLayer::new(vec![Wall::solid(
        Vec2::new(100.0, -2000.0),
        Vec2::new(100.0, 2000.0),
    )]);
    let actor = TestActor { speed: Some(15.0), weapons: vec![] };
    let sink = CollectingSink::default();
    let settings = default_settings();
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &FlatCost,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &[],
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let snapshot = controller
        .request_refresh(1, RefreshTrigger::Forced, &ctx)
        .unwrap();

    // Nothing east of the wall is reachable; west side is.
    for key in snapshot.tiles.keys() {
        assert!(key.gy <= 0, "reached {key} across the wall");
    }
    assert!(snapshot.tiles.contains(&TileKey::new(0, -3)));
}

#[test]
fn test_difficult_terrain_shrinks_reach_unless_ignored() {
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let mut terrain = CellCost::default();
    // Everything in a band east of the agent costs double.
    for gx in -10..=10 {
        for gy in 1..=10 {
            terrain.set(TileKey::new(gx, gy), 2.0);
        }
    }
    let actor = TestActor { speed: Some(20.0), weapons: vec![] };
    let sink = CollectingSink::default();
    let settings = default_settings();
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &terrain,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &[],
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let costed = controller
        .request_refresh(1, RefreshTrigger::Forced, &ctx)
        .unwrap();
    assert!(costed.tiles.contains(&TileKey::new(0, 2)));
    assert!(!costed.tiles.contains(&TileKey::new(0, 3)));

    controller.agent_mut(1).unwrap().ignore_difficult_terrain = true;
    let ignored = controller
        .request_refresh(1, RefreshTrigger::SettingsChanged, &ctx)
        .unwrap();
    assert!(ignored.tiles.contains(&TileKey::new(0, 4)));
}

#[test]
fn test_two_targets_ideal_is_intersection() {
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let actor = TestActor {
        speed: Some(30.0),
        weapons: vec![WeaponRange::new(5.0, 0xff0000)],
    };
    let sink = CollectingSink::default();
    let settings = default_settings();
    // Two targets two cells apart; a 1-tile weapon can only cover both
    // from the cells between them.
    let targets = [
        Target::new(1, TileKey::new(0, 3), 1, 1),
        Target::new(2, TileKey::new(0, 5), 1, 1),
    ];
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &FlatCost,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &targets,
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let snapshot = controller
        .request_refresh(1, RefreshTrigger::TargetsChanged, &ctx)
        .unwrap();

    assert!(snapshot.ideal.contains(&TileKey::new(0, 4)));
    assert!(snapshot.ideal.contains(&TileKey::new(1, 4)));
    assert!(snapshot.ideal.contains(&TileKey::new(-1, 4)));
    assert!(!snapshot.ideal.contains(&TileKey::new(0, 2)));
    assert!(!snapshot.ideal.contains(&TileKey::new(0, 6)));
    assert!(!snapshot.ideal_fallback);
}

#[test]
fn test_path_highlight_leads_to_ideal_cell() {
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let actor = TestActor {
        speed: Some(30.0),
        weapons: vec![WeaponRange::new(5.0, 0xff0000)],
    };
    let sink = CollectingSink::default();
    let settings = default_settings();
    let targets = [Target::new(1, TileKey::new(0, 6), 1, 1)];
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &FlatCost,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &targets,
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let snapshot = controller
        .request_refresh(1, RefreshTrigger::Forced, &ctx)
        .unwrap();

    let ideal_cell = TileKey::new(0, 5);
    assert!(snapshot.ideal.contains(&ideal_cell));
    let path = snapshot.upstreams.path_tiles(&ideal_cell);
    assert!(path.contains(&TileKey::new(0, 0)));
    assert!(path.contains(&ideal_cell));
    // Every path tile is itself reachable.
    for key in &path {
        assert!(snapshot.tiles.contains(key));
    }
}

#[test]
fn test_weapons_in_range_from_current_cell() {
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let params = RangeParams { geometry: &grid, obstacles: &walls };
    let target = Target::new(1, TileKey::new(0, 4), 1, 1);
    let weapons = [
        WeaponRange::new(5.0, 0xff0000),
        WeaponRange::new(30.0, 0x00ff00),
    ];

    let usable = weapons_in_range_from(TileKey::new(0, 0), &target, &weapons, &params);
    assert_eq!(usable.len(), 1);
    assert_eq!(usable[0].color, 0x00ff00);

    let adjacent = weapons_in_range_from(TileKey::new(0, 3), &target, &weapons, &params);
    assert_eq!(adjacent.len(), 2);
}

#[test]
fn test_colorize_tags_tiers() {
    let grid = SquareGrid::new(100.0, 5.0);
    let walls = WallLayer::default();
    let actor = TestActor { speed: Some(10.0), weapons: vec![] };
    let sink = CollectingSink::default();
    let settings = OverlaySettings {
        actions_to_show: 2,
        ..default_settings()
    };
    let ctx = ReachContext {
        geometry: &grid,
        obstacles: &walls,
        terrain: &FlatCost,
        actors: &actor,
        notifications: &sink,
        settings: &settings,
        targets: &[],
    };

    let mut controller = RefreshController::new();
    controller.upsert_agent(AgentState::new(1, Vec2::ZERO));

    let snapshot = controller
        .request_refresh(1, RefreshTrigger::Forced, &ctx)
        .unwrap();

    let origin = snapshot.tiles.get(&TileKey::new(0, 0)).unwrap();
    let near = snapshot.tiles.get(&TileKey::new(0, 2)).unwrap();
    let far = snapshot.tiles.get(&TileKey::new(0, 4)).unwrap();
    assert_eq!(origin.color, Some(settings.palette[0]));
    assert_eq!(near.color, Some(settings.palette[1]));
    assert_eq!(far.color, Some(settings.palette[2]));
}
