//! Lane model: discrete target slot plus damped lateral motion

use super::state::{LaneDirection, Player};
use crate::tuning::Tuning;

impl Player {
    /// Move the target lane one step. Returns true only when the lane
    /// actually changed (no-op at the boundary).
    pub fn shift(&mut self, direction: LaneDirection) -> bool {
        match self.lane.step(direction) {
            Some(next) => {
                self.lane = next;
                self.switching = true;
                true
            }
            None => false,
        }
    }

    /// Relax the lateral position toward the target lane by one frame and
    /// update the cosmetic roll. Returns the lateral error before the step.
    pub fn relax(&mut self, tuning: &Tuning) -> f32 {
        let target = self.lane.target_x(tuning.lane_width);
        let error = target - self.pos.x;
        self.pos.x += error * tuning.lane_damping;
        self.tilt = error * tuning.tilt_factor;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Lane;
    use proptest::prelude::*;

    fn direction() -> impl Strategy<Value = LaneDirection> {
        prop_oneof![Just(LaneDirection::Left), Just(LaneDirection::Right)]
    }

    #[test]
    fn test_shift_reports_change() {
        let mut player = Player::new(-10.0);
        assert!(player.shift(LaneDirection::Left));
        assert_eq!(player.lane, Lane::new(1));
        assert!(player.switching);

        player.switching = false;
        assert!(!player.shift(LaneDirection::Left));
        assert_eq!(player.lane, Lane::new(1));
        assert!(!player.switching);
    }

    #[test]
    fn test_relax_moves_fifth_of_error() {
        let tuning = Tuning::default();
        let mut player = Player::new(-10.0);
        player.shift(LaneDirection::Left);

        let error = player.relax(&tuning);
        assert!((error - 2.0).abs() < 1e-6);
        assert!((player.pos.x - 0.4).abs() < 1e-6);
        assert!((player.tilt - -0.2).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_lane_stays_in_bounds(moves in prop::collection::vec(direction(), 0..64)) {
            let mut player = Player::new(-10.0);
            for m in moves {
                let before = player.lane.index();
                let changed = player.shift(m);
                let after = player.lane.index();
                prop_assert!((-1..=1).contains(&after));
                prop_assert_eq!(changed, before != after);
                prop_assert!((after - before).abs() <= 1);
            }
        }

        #[test]
        fn prop_relax_converges_without_overshoot(
            moves in prop::collection::vec(direction(), 1..8),
            frames in 1usize..120,
        ) {
            let tuning = Tuning::default();
            let mut player = Player::new(-10.0);
            for m in moves {
                player.shift(m);
            }
            let target = player.lane.target_x(tuning.lane_width);
            let mut prev = (target - player.pos.x).abs();
            for _ in 0..frames {
                let before = player.pos.x;
                player.relax(&tuning);
                let err = (target - player.pos.x).abs();
                prop_assert!(err <= prev + 1e-6);
                // Never crosses the target
                prop_assert!((target - before) * (target - player.pos.x) >= -1e-6);
                prev = err;
            }
        }
    }
}
