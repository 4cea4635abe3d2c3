//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed frame step only
//! - Seeded RNG only
//! - Stable iteration order (by insertion)
//! - No rendering or platform dependencies

pub mod collision;
pub mod dust;
pub mod lane;
pub mod registry;
pub mod road;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{find_collision, hitbox_overlap};
pub use dust::DustPuff;
pub use registry::{EntityRegistry, Ephemeral};
pub use road::RoadScroll;
pub use spawner::Spawner;
pub use state::{
    GameEvent, GamePhase, GameState, Lane, LaneDirection, Player, ScoreState, TrafficCar,
};
pub use tick::{TickInput, tick};
