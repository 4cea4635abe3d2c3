//! Traffic spawner: one car every `interval` frames in a random lane

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, TrafficCar};
use crate::consts::LANE_OFFSETS;
use crate::paint::Paintable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Frames since the last spawn
    pub timer: u32,
    pub interval: u32,
}

impl Spawner {
    pub fn new(interval: u32) -> Self {
        Self { timer: 0, interval }
    }

    /// Advance one frame. Returns true when a car is due; the counter
    /// resets when it fires.
    pub fn tick(&mut self) -> bool {
        self.timer += 1;
        if self.timer > self.interval {
            self.timer = 0;
            true
        } else {
            false
        }
    }
}

/// Create a car at the spawn line in a uniformly chosen lane
pub fn spawn_traffic(state: &mut GameState) -> u32 {
    let id = state.next_entity_id();
    let x = LANE_OFFSETS[state.rng.random_range(0..LANE_OFFSETS.len())];
    let color = [state.rng.random(), state.rng.random(), state.rng.random()];

    let mut car = TrafficCar {
        id,
        pos: Vec3::new(x, 0.0, state.tuning.spawn_z),
        color: [1.0; 3],
    };
    car.paint(color);

    log::debug!("Spawned car {} in lane x={}", id, x);
    state.traffic.push(car);
    state.events.push(GameEvent::TrafficSpawned { id, x });
    id
}
