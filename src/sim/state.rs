//! Game state and core simulation types

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dust::DustPuff;
use super::registry::EntityRegistry;
use super::road::RoadScroll;
use super::spawner::Spawner;
use crate::paint::Paintable;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start overlay is showing
    NotStarted,
    /// Active gameplay
    Running,
    /// Crashed; only a reload starts a new run
    GameOver,
}

/// Player-initiated lateral move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

/// Discrete lane slot in `{-1, 0, 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct Lane(i8);

#[derive(Debug, Error)]
#[error("lane {0} is outside -1..=1")]
pub struct LaneOutOfRange(pub i8);

impl TryFrom<i8> for Lane {
    type Error = LaneOutOfRange;

    fn try_from(index: i8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&index) {
            Ok(Self(index))
        } else {
            Err(LaneOutOfRange(index))
        }
    }
}

impl From<Lane> for i8 {
    fn from(lane: Lane) -> Self {
        lane.0
    }
}

impl Lane {
    pub const MIN: i8 = -1;
    pub const MAX: i8 = 1;

    /// Build a lane, clamping to the three slots
    pub fn new(index: i8) -> Self {
        Self(index.clamp(Self::MIN, Self::MAX))
    }

    #[inline]
    pub fn index(self) -> i8 {
        self.0
    }

    /// Lateral target for this lane
    #[inline]
    pub fn target_x(self, lane_width: f32) -> f32 {
        crate::lane_x(self.0, lane_width)
    }

    /// Lane one step in `direction`, or `None` at the boundary.
    ///
    /// The chase camera looks down +z, so +x is on the left of the screen.
    pub fn step(self, direction: LaneDirection) -> Option<Self> {
        let next = match direction {
            LaneDirection::Left => self.0 + 1,
            LaneDirection::Right => self.0 - 1,
        };
        (Self::MIN..=Self::MAX).contains(&next).then_some(Self(next))
    }
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Target lane
    pub lane: Lane,
    /// Continuous position; z never changes
    pub pos: Vec3,
    /// Cosmetic roll angle (radians)
    pub tilt: f32,
    /// Set on a lane change, cleared once the car settles
    pub switching: bool,
}

impl Player {
    pub fn new(z: f32) -> Self {
        Self {
            lane: Lane::default(),
            pos: Vec3::new(0.0, 0.0, z),
            tilt: 0.0,
            switching: false,
        }
    }
}

/// An oncoming traffic car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficCar {
    pub id: u32,
    pub pos: Vec3,
    pub color: [f32; 3],
}

impl Paintable for TrafficCar {
    fn recolor(&mut self, f: &dyn Fn([f32; 3]) -> [f32; 3]) {
        self.color = f(self.color);
    }
}

/// Survival score and the persisted best
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub current: u64,
    pub best: u64,
}

impl ScoreState {
    pub fn new(best: u64) -> Self {
        Self { current: 0, best }
    }

    /// Fold the final score into the best; returns true on a new record
    pub fn settle(&mut self) -> bool {
        if self.current > self.best {
            self.best = self.current;
            true
        } else {
            false
        }
    }
}

/// Side effects reported by the simulation, drained by the caller each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Start accepted; the run is live
    Started,
    /// Discrete lane actually changed
    LaneChanged { lane: Lane },
    /// A car entered the road
    TrafficSpawned { id: u32, x: f32 },
    /// Terminal transition (emitted exactly once per run)
    Crashed { score: u64, best: u64, new_best: bool },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Start was requested before assets were ready
    pub start_pending: bool,
    pub player: Player,
    pub traffic: EntityRegistry<TrafficCar>,
    /// Cosmetic puffs (not gameplay-affecting)
    #[serde(skip)]
    pub dust: EntityRegistry<DustPuff>,
    pub road: RoadScroll,
    pub spawner: Spawner,
    pub score: ScoreState,
    /// Simulation frames while Running
    pub frame: u64,
    /// Simulation clock in seconds (advances while Running)
    pub time: f64,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    next_id: u32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl GameState {
    /// Create a new game with default tuning
    pub fn new(seed: u64, best: u64) -> Self {
        Self::with_tuning(seed, best, Tuning::default())
    }

    pub fn with_tuning(seed: u64, best: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            phase: GamePhase::NotStarted,
            start_pending: false,
            player: Player::new(tuning.player_z),
            traffic: EntityRegistry::new(),
            dust: EntityRegistry::new(),
            road: RoadScroll::new(),
            spawner: Spawner::new(tuning.spawn_interval),
            score: ScoreState::new(best),
            frame: 0,
            time: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_step_bounds() {
        let left = Lane::new(1);
        assert_eq!(left.step(LaneDirection::Left), None);
        assert_eq!(left.step(LaneDirection::Right), Some(Lane::new(0)));

        let right = Lane::new(-1);
        assert_eq!(right.step(LaneDirection::Right), None);
        assert_eq!(right.step(LaneDirection::Left), Some(Lane::new(0)));
    }

    #[test]
    fn test_lane_new_clamps() {
        assert_eq!(Lane::new(5).index(), 1);
        assert_eq!(Lane::new(-7).index(), -1);
    }

    #[test]
    fn test_lane_deserialize_checks_range() {
        let lane: Lane = serde_json::from_str("-1").unwrap();
        assert_eq!(lane, Lane::new(-1));
        assert_eq!(serde_json::to_string(&Lane::new(1)).unwrap(), "1");
        assert!(serde_json::from_str::<Lane>("5").is_err());
        assert!(serde_json::from_str::<Player>(
            r#"{"lane": 1, "pos": [0.0, 0.0, -10.0], "tilt": 0.0, "switching": false}"#
        )
        .is_ok());
        assert!(serde_json::from_str::<Player>(
            r#"{"lane": 2, "pos": [0.0, 0.0, -10.0], "tilt": 0.0, "switching": false}"#
        )
        .is_err());
    }

    #[test]
    fn test_score_settle() {
        let mut score = ScoreState::new(20);
        score.current = 10;
        assert!(!score.settle());
        assert_eq!(score.best, 20);

        score.current = 30;
        assert!(score.settle());
        assert_eq!(score.best, 30);
    }

    #[test]
    fn test_new_state_waits_for_start() {
        let state = GameState::new(7, 42);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.score, ScoreState { current: 0, best: 42 });
        assert_eq!(state.player.pos.z, crate::consts::PLAYER_Z);
        assert!(state.traffic.is_empty());
    }
}
