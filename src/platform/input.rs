//! Input mapping
//!
//! Keyboard, on-screen buttons and screen-half taps all reduce to the two
//! lane actions.

use crate::sim::LaneDirection;

/// Map a `KeyboardEvent.key` value to a lane action
pub fn action_for_key(key: &str) -> Option<LaneDirection> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(LaneDirection::Left),
        "ArrowRight" | "d" | "D" => Some(LaneDirection::Right),
        _ => None,
    }
}

/// Map a single-finger tap at `x` on a viewport `width` pixels wide
pub fn action_for_tap(x: f64, width: f64) -> LaneDirection {
    if x < width / 2.0 {
        LaneDirection::Left
    } else {
        LaneDirection::Right
    }
}

/// On-screen lane buttons are shown on narrow viewports and mobile browsers
pub fn wants_touch_controls(viewport_width: f64, user_agent: &str) -> bool {
    const MOBILE_HINTS: [&str; 5] = ["Android", "iPhone", "iPad", "iPod", "Mobile"];
    viewport_width < 800.0 || MOBILE_HINTS.iter().any(|hint| user_agent.contains(hint))
}
