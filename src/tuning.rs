//! Data-driven game balance
//!
//! Defaults reproduce the classic arcade feel. A `Tuning` travels with the
//! game state so tests and experiments can tweak balance without touching
//! the simulation code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("spawn_z ({spawn_z}) must be ahead of despawn_z ({despawn_z})")]
    SpawnBehindDespawn { spawn_z: f32, despawn_z: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lane_width: f32,
    pub lane_damping: f32,
    pub tilt_factor: f32,
    pub player_z: f32,

    /// Frames between traffic spawns
    pub spawn_interval: u32,
    pub spawn_z: f32,
    pub despawn_z: f32,
    /// Distance traffic moves toward the camera per frame
    pub traffic_speed: f32,
    /// Distance road markings move per frame
    pub road_speed: f32,

    pub hitbox_x: f32,
    pub hitbox_z: f32,

    pub dust_lifetime: f64,
    pub dust_emit_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_width: LANE_WIDTH,
            lane_damping: LANE_DAMPING,
            tilt_factor: TILT_FACTOR,
            player_z: PLAYER_Z,
            spawn_interval: SPAWN_INTERVAL,
            spawn_z: SPAWN_Z,
            despawn_z: DESPAWN_Z,
            traffic_speed: TRAFFIC_SPEED,
            road_speed: ROAD_SPEED,
            hitbox_x: HITBOX_X,
            hitbox_z: HITBOX_Z,
            dust_lifetime: DUST_LIFETIME,
            dust_emit_chance: DUST_EMIT_CHANCE,
        }
    }
}

impl Tuning {
    /// Parse a tuning override from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let check = |field: &'static str, value: f64, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value })
            }
        };

        let chance = self.dust_emit_chance;
        check("dust_emit_chance", chance, (0.0..=1.0).contains(&chance))?;
        let speed = self.traffic_speed;
        check("traffic_speed", speed as f64, speed > 0.0)?;
        let damping = self.lane_damping;
        check("lane_damping", damping as f64, damping > 0.0 && damping <= 1.0)?;
        let interval = self.spawn_interval;
        check("spawn_interval", interval as f64, interval >= 1)?;

        if self.spawn_z <= self.despawn_z {
            return Err(TuningError::SpawnBehindDespawn {
                spawn_z: self.spawn_z,
                despawn_z: self.despawn_z,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "spawn_interval": 30 }"#).unwrap();
        assert_eq!(tuning.spawn_interval, 30);
        assert_eq!(tuning.lane_width, LANE_WIDTH);
        assert_eq!(tuning.hitbox_z, HITBOX_Z);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_emit_chance_above_one_rejected() {
        let err = Tuning::from_json(r#"{ "dust_emit_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "dust_emit_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for json in [
            r#"{ "dust_emit_chance": -0.1 }"#,
            r#"{ "traffic_speed": 0.0 }"#,
            r#"{ "traffic_speed": -0.5 }"#,
            r#"{ "lane_damping": 0.0 }"#,
            r#"{ "lane_damping": 1.2 }"#,
            r#"{ "spawn_interval": 0 }"#,
        ] {
            assert!(
                matches!(Tuning::from_json(json), Err(TuningError::OutOfRange { .. })),
                "{json}"
            );
        }
    }

    #[test]
    fn test_spawn_line_must_be_ahead() {
        let err = Tuning::from_json(r#"{ "spawn_z": -30.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::SpawnBehindDespawn { .. }));
    }

    #[test]
    fn test_bad_json_reported() {
        assert!(matches!(Tuning::from_json("{ spawn"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_edge_values_accepted() {
        let tuning =
            Tuning::from_json(r#"{ "dust_emit_chance": 1.0, "lane_damping": 1.0 }"#).unwrap();
        assert_eq!(tuning.dust_emit_chance, 1.0);
    }
}
