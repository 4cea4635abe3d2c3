//! Highway Rush - A three-lane endless dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, traffic, collisions, score)
//! - `renderer`: WebGPU scene pass + motion-trail composite
//! - `assets`: Player model loading with fallback
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub mod assets;
pub mod highscores;
pub mod paint;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use highscores::BestScore;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step (one display refresh at 60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum simulation steps per rendered frame
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Lateral offsets of the three lanes (x)
    pub const LANE_OFFSETS: [f32; 3] = [-2.0, 0.0, 2.0];
    pub const LANE_WIDTH: f32 = 2.0;

    /// Player car rests at a fixed depth
    pub const PLAYER_Z: f32 = -10.0;

    /// Lane interpolation factor per frame
    pub const LANE_DAMPING: f32 = 0.2;
    /// Roll angle per unit of lateral error
    pub const TILT_FACTOR: f32 = -0.1;

    /// Traffic
    pub const SPAWN_INTERVAL: u32 = 60;
    pub const SPAWN_Z: f32 = 30.0;
    pub const DESPAWN_Z: f32 = -20.0;
    pub const TRAFFIC_SPEED: f32 = 0.5;

    /// Road scroll
    pub const ROAD_SPEED: f32 = 0.5;
    pub const ROAD_SEGMENT_LENGTH: f32 = 100.0;
    pub const ROAD_SEGMENT_COUNT: usize = 3;
    pub const ROAD_WIDTH: f32 = 10.0;
    pub const LANE_LINE_SPACING: f32 = 5.0;
    pub const LANE_LINE_EXTENT: f32 = 150.0;

    /// Coarse hitbox half-extents
    pub const HITBOX_X: f32 = 0.5;
    pub const HITBOX_Z: f32 = 1.5;

    /// Dust trail
    pub const DUST_LIFETIME: f64 = 0.5;
    pub const DUST_MAX_OPACITY: f32 = 0.4;
    pub const DUST_EMIT_CHANCE: f64 = 0.5;
    pub const DUST_MIN_ERROR: f32 = 0.1;
    pub const LANE_SETTLED_ERROR: f32 = 0.05;

    /// Post-process opacity for the trail composite
    pub const TRAIL_OPACITY: f32 = 0.85;
}

/// Lateral position of a lane index in `{-1, 0, 1}`
#[inline]
pub fn lane_x(lane: i8, lane_width: f32) -> f32 {
    lane as f32 * lane_width
}
