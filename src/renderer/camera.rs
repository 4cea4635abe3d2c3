//! Chase camera that lags behind the player car

use glam::{Mat4, Vec3};

use crate::sim::GameState;

const START: Vec3 = Vec3::new(0.0, 5.0, -15.0);
const FOLLOW_X: f32 = 0.05;
const FOLLOW_Y: f32 = 0.02;
const LOOK_AHEAD: f32 = 10.0;

pub const FOV_Y_DEGREES: f32 = 75.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            eye: START,
            target: Vec3::new(0.0, 0.0, START.z + 5.0 + LOOK_AHEAD),
        }
    }
}

impl CameraRig {
    /// Ease toward the car once per rendered frame
    pub fn follow(&mut self, player: Vec3) {
        self.eye.x += (player.x - self.eye.x) * FOLLOW_X;
        self.eye.y += (START.y - self.eye.y) * FOLLOW_Y;
        self.target = Vec3::new(player.x, 0.0, player.z + LOOK_AHEAD);
    }

    /// Per-frame camera step; the rig holds still outside a live run
    pub fn update(&mut self, state: &GameState) {
        if state.is_running() {
            self.follow(state.player.pos);
        }
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(
            FOV_Y_DEGREES.to_radians(),
            aspect.max(1e-3),
            Z_NEAR,
            Z_FAR,
        );
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[test]
    fn test_follow_eases_toward_player() {
        let mut rig = CameraRig::default();
        rig.follow(Vec3::new(2.0, 0.0, -10.0));
        assert!((rig.eye.x - 0.1).abs() < 1e-6);
        assert_eq!(rig.eye.y, 5.0);
        assert_eq!(rig.target, Vec3::new(2.0, 0.0, 0.0));

        for _ in 0..500 {
            rig.follow(Vec3::new(2.0, 0.0, -10.0));
        }
        assert!((rig.eye.x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_holds_still_unless_running() {
        let mut state = GameState::new(1, 0);
        state.player.pos.x = 2.0;

        let mut rig = CameraRig::default();
        rig.update(&state);
        assert_eq!(rig, CameraRig::default());

        state.phase = GamePhase::Running;
        rig.update(&state);
        assert!((rig.eye.x - 0.1).abs() < 1e-6);

        state.phase = GamePhase::GameOver;
        let frozen = rig;
        rig.update(&state);
        assert_eq!(rig, frozen);
    }

    #[test]
    fn test_look_target_projects_to_center() {
        let mut rig = CameraRig::default();
        rig.follow(Vec3::new(0.0, 0.0, -10.0));
        let clip = rig.view_proj(16.0 / 9.0) * rig.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn test_positive_x_appears_on_the_left() {
        let rig = CameraRig {
            eye: START,
            target: Vec3::new(0.0, 0.0, 0.0),
        };
        let clip = rig.view_proj(1.0) * Vec3::new(2.0, 0.0, 0.0).extend(1.0);
        assert!(clip.x / clip.w < 0.0);
    }
}
