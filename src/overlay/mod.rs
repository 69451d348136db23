//! Agent state and refresh orchestration

pub mod agent;
pub mod controller;

pub use agent::{dedupe_weapons, ActorAdapter, AgentState};
pub use controller::{
    weapons_in_range_from, GridlessContext, GridlessReachability, Notice, NotificationSink,
    ReachContext, Reachability, RefreshController, RefreshTrigger,
};
