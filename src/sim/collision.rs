//! Coarse hitbox collision between the player and traffic
//!
//! Cars are compared by per-axis distance against fixed half-extents rather
//! than by mesh intersection.

use glam::{Vec2, Vec3};

use super::registry::EntityRegistry;
use super::state::TrafficCar;

/// True when `a` and `b` are closer than `half.x` across lanes and `half.y`
/// along the road. Both bounds are strict.
#[inline]
pub fn hitbox_overlap(a: Vec3, b: Vec3, half: Vec2) -> bool {
    let dx = (a.x - b.x).abs();
    let dz = (a.z - b.z).abs();
    dx < half.x && dz < half.y
}

/// First car (scanning from the newest) overlapping `player`
pub fn find_collision<'a>(
    player: Vec3,
    traffic: &'a EntityRegistry<TrafficCar>,
    half: Vec2,
) -> Option<&'a TrafficCar> {
    traffic
        .iter()
        .rev()
        .find(|car| hitbox_overlap(player, car.pos, half))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{HITBOX_X, HITBOX_Z};

    const HALF: Vec2 = Vec2::new(HITBOX_X, HITBOX_Z);

    #[test]
    fn test_overlap_same_lane_close() {
        assert!(hitbox_overlap(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.5), HALF));
    }

    #[test]
    fn test_no_overlap_far_along_road() {
        assert!(!hitbox_overlap(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), HALF));
        // Boundary is exclusive
        assert!(!hitbox_overlap(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.5), HALF));
    }

    #[test]
    fn test_no_overlap_adjacent_offset() {
        assert!(!hitbox_overlap(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), HALF));
        assert!(!hitbox_overlap(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), HALF));
    }

    #[test]
    fn test_height_ignored() {
        assert!(hitbox_overlap(Vec3::ZERO, Vec3::new(0.2, 5.0, -1.0), HALF));
    }

    #[test]
    fn test_find_collision_picks_overlapping_car() {
        let mut traffic = EntityRegistry::new();
        for (id, x, z) in [(1, 2.0, 0.0), (2, 0.0, 1.0), (3, 0.0, 10.0)] {
            traffic.push(TrafficCar {
                id,
                pos: Vec3::new(x, 0.0, z),
                color: [1.0; 3],
            });
        }

        let hit = find_collision(Vec3::ZERO, &traffic, HALF);
        assert_eq!(hit.map(|c| c.id), Some(2));

        let miss = find_collision(Vec3::new(-2.0, 0.0, 0.0), &traffic, HALF);
        assert!(miss.is_none());
    }
}
