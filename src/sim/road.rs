//! World scroll: road segments and lane-line markers drift toward the
//! camera and wrap behind it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadScroll {
    /// Centre z of each road segment
    pub segments: Vec<f32>,
    /// Lane-line marker positions
    pub lines: Vec<Vec3>,
}

impl Default for RoadScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadScroll {
    pub fn new() -> Self {
        let segments = (0..ROAD_SEGMENT_COUNT)
            .map(|i| -(i as f32) * ROAD_SEGMENT_LENGTH)
            .collect();

        let steps = (2.0 * LANE_LINE_EXTENT / LANE_LINE_SPACING) as i32;
        let mut lines = Vec::with_capacity((steps as usize + 1) * LANE_OFFSETS.len());
        for step in 0..=steps {
            let z = -LANE_LINE_EXTENT + step as f32 * LANE_LINE_SPACING;
            for x in LANE_OFFSETS {
                lines.push(Vec3::new(x, 0.01, z));
            }
        }

        Self { segments, lines }
    }

    /// Loop length for segments (all segments laid end to end)
    fn segment_span() -> f32 {
        ROAD_SEGMENT_COUNT as f32 * ROAD_SEGMENT_LENGTH
    }

    /// Move everything toward the camera by `speed`, wrapping what passed
    pub fn advance(&mut self, speed: f32) {
        for z in &mut self.segments {
            *z -= speed;
            if *z < -ROAD_SEGMENT_LENGTH {
                *z += Self::segment_span();
            }
        }

        for line in &mut self.lines {
            line.z -= speed;
            if line.z < -LANE_LINE_EXTENT {
                line.z += 2.0 * LANE_LINE_EXTENT;
            }
        }
    }
}
