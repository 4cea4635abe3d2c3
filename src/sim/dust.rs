//! Dust puffs kicked up behind the car while it changes lanes

use glam::{Vec2, Vec3};
use rand::Rng;

use super::registry::Ephemeral;
use super::state::GameState;
use crate::consts::{DUST_MAX_OPACITY, DUST_MIN_ERROR, LANE_SETTLED_ERROR};

#[derive(Debug, Clone)]
pub struct DustPuff {
    pub pos: Vec3,
    pub scale: Vec2,
    pub born_at: f64,
}

impl Ephemeral for DustPuff {
    fn born_at(&self) -> f64 {
        self.born_at
    }
}

impl DustPuff {
    /// Fade-out opacity at `now`
    pub fn opacity(&self, now: f64, lifetime: f64) -> f32 {
        let alpha = 1.0 - (self.age(now) / lifetime) as f32;
        alpha.clamp(0.0, 1.0) * DUST_MAX_OPACITY
    }
}

/// Emit and expire dust for one frame given the lateral error measured
/// before this frame's relax step.
pub fn update_dust(state: &mut GameState, lateral_error: f32) {
    let now = state.time;

    if state.player.switching
        && lateral_error.abs() > DUST_MIN_ERROR
        && state.rng.random_bool(state.tuning.dust_emit_chance)
    {
        let jitter = state.rng.random_range(-0.5..0.5);
        let puff = DustPuff {
            pos: state.player.pos + Vec3::new(jitter, 0.1, -1.0),
            scale: Vec2::new(
                state.rng.random_range(0.5..1.5),
                state.rng.random_range(0.5..1.5),
            ),
            born_at: now,
        };
        state.dust.push(puff);
    }

    if lateral_error.abs() < LANE_SETTLED_ERROR {
        state.player.switching = false;
    }

    state.dust.prune_expired(now, state.tuning.dust_lifetime);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::LaneDirection;

    #[test]
    fn test_opacity_fades() {
        let puff = DustPuff {
            pos: Vec3::ZERO,
            scale: Vec2::ONE,
            born_at: 1.0,
        };
        assert!((puff.opacity(1.0, 0.5) - 0.4).abs() < 1e-6);
        assert!((puff.opacity(1.25, 0.5) - 0.2).abs() < 1e-5);
        assert_eq!(puff.opacity(1.6, 0.5), 0.0);
    }

    #[test]
    fn test_no_dust_when_not_switching() {
        let mut state = GameState::new(11, 0);
        for _ in 0..100 {
            update_dust(&mut state, 1.5);
        }
        assert!(state.dust.is_empty());
    }

    #[test]
    fn test_switching_emits_then_settles() {
        let mut state = GameState::new(11, 0);
        state.player.shift(LaneDirection::Left);
        for _ in 0..20 {
            update_dust(&mut state, 1.5);
        }
        assert!(!state.dust.is_empty());
        assert!(state.player.switching);

        update_dust(&mut state, 0.01);
        assert!(!state.player.switching);
    }

    #[test]
    fn test_old_puffs_pruned() {
        let mut state = GameState::new(11, 0);
        state.player.shift(LaneDirection::Left);
        for _ in 0..20 {
            update_dust(&mut state, 1.5);
        }
        state.player.switching = false;
        state.time += 0.5;
        update_dust(&mut state, 0.0);
        assert!(state.dust.is_empty());
    }
}
