//! Fixed-step frame driver
//!
//! Advances the world by one display frame: road scroll, lane motion, dust,
//! traffic spawn, traffic movement with collision and despawn, then score.

use glam::Vec2;

use super::collision::hitbox_overlap;
use super::dust::update_dust;
use super::registry::Sweep;
use super::spawner::spawn_traffic;
use super::state::{GameEvent, GamePhase, GameState, LaneDirection};

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start button pressed
    pub start: bool,
    /// Lane changes in arrival order
    pub shifts: Vec<LaneDirection>,
    /// Player model finished loading (or fell back)
    pub assets_ready: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    for &direction in &input.shifts {
        if state.player.shift(direction) {
            state.events.push(GameEvent::LaneChanged {
                lane: state.player.lane,
            });
        }
    }

    if state.phase == GamePhase::NotStarted {
        if input.start {
            state.start_pending = true;
        }
        if state.start_pending && input.assets_ready {
            state.phase = GamePhase::Running;
            state.start_pending = false;
            state.events.push(GameEvent::Started);
            log::info!("Run started (seed {})", state.seed);
        }
        return;
    }

    state.frame += 1;
    state.time += dt as f64;

    state.road.advance(state.tuning.road_speed);

    let lateral_error = state.player.relax(&state.tuning);
    update_dust(state, lateral_error);

    if state.spawner.tick() {
        spawn_traffic(state);
    }

    if advance_traffic(state) {
        crash(state);
        return;
    }

    state.score.current += 1;
}

/// Move every car toward the camera, checking for a hit and dropping cars
/// that passed the despawn line. Returns true on a collision; the scan
/// stops at the first hit.
fn advance_traffic(state: &mut GameState) -> bool {
    let speed = state.tuning.traffic_speed;
    let despawn_z = state.tuning.despawn_z;
    let player = state.player.pos;
    let half = Vec2::new(state.tuning.hitbox_x, state.tuning.hitbox_z);

    let mut hit = false;
    state.traffic.sweep_rev(|car| {
        car.pos.z -= speed;

        if hitbox_overlap(player, car.pos, half) {
            hit = true;
            return Sweep::Halt;
        }

        if car.pos.z < despawn_z {
            Sweep::Remove
        } else {
            Sweep::Keep
        }
    });
    hit
}

/// Terminal transition. Guarded by the phase so it runs once per run.
fn crash(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }
    state.phase = GamePhase::GameOver;

    let new_best = state.score.settle();
    log::info!(
        "Crashed at frame {} with score {} (best {}{})",
        state.frame,
        state.score.current,
        state.score.best,
        if new_best { ", new record" } else { "" }
    );

    state.events.push(GameEvent::Crashed {
        score: state.score.current,
        best: state.score.best,
        new_best,
    });
}
