//! Axis-aligned collision and clearance tests
//!
//! All hitboxes are AABBs. Obstacle collisions shrink the obstacle box
//! inward by [`COLLISION_BUFFER`] on every side so grazing contact does not
//! cost a heart; star pickups use the exact boxes.

use glam::Vec2;

use super::state::{Obstacle, Player, Star};
use crate::aabb_overlap;
use crate::consts::COLLISION_BUFFER;

/// Player vs obstacle, with the forgiving inward buffer
pub fn player_hits_obstacle(player: &Player, obs: &Obstacle) -> bool {
    player.pos.x < obs.pos.x + obs.size.x - COLLISION_BUFFER
        && player.pos.x + player.size.x > obs.pos.x + COLLISION_BUFFER
        && player.pos.y < obs.pos.y + obs.size.y - COLLISION_BUFFER
        && player.pos.y + player.size.y > obs.pos.y + COLLISION_BUFFER
}

/// Player vs star, exact boxes
pub fn player_touches_star(player: &Player, star: &Star) -> bool {
    aabb_overlap(player.pos, player.size, star.pos, star.size)
}

/// Spawn-safety test: is the candidate box within `clearance` of the other
/// box both horizontally (edge x to edge x) and vertically?
pub fn within_clearance(
    pos: Vec2,
    size: Vec2,
    other_pos: Vec2,
    other_size: Vec2,
    clearance: f32,
) -> bool {
    let horizontal = (pos.x - other_pos.x).abs() < clearance;
    let vertical =
        pos.y < other_pos.y + other_size.y + clearance && pos.y + size.y > other_pos.y - clearance;
    horizontal && vertical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{OBSTACLE_SIZE, PLAYER_SIZE, STAR_SIZE};
    use crate::sim::state::{Player, Viewport};

    fn player_at(x: f32, y: f32) -> Player {
        let mut p = Player::spawn(&Viewport::default());
        p.pos = Vec2::new(x, y);
        p
    }

    fn obstacle_at(x: f32, y: f32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, y),
            size: OBSTACLE_SIZE,
            kind: 0,
            stack_id: 0,
            passed: false,
        }
    }

    #[test]
    fn test_obstacle_hit_dead_center() {
        let p = player_at(100.0, 100.0);
        let o = obstacle_at(105.0, 105.0);
        assert!(player_hits_obstacle(&p, &o));
    }

    #[test]
    fn test_obstacle_graze_inside_buffer_misses() {
        let p = player_at(100.0, 100.0);
        // Overlaps the raw boxes by 5px on the x axis, less than the buffer
        let o = obstacle_at(100.0 + PLAYER_SIZE.x - 5.0, 100.0);
        assert!(aabb_overlap(p.pos, p.size, o.pos, o.size));
        assert!(!player_hits_obstacle(&p, &o));
    }

    #[test]
    fn test_obstacle_past_buffer_hits() {
        let p = player_at(100.0, 100.0);
        let o = obstacle_at(100.0 + PLAYER_SIZE.x - 15.0, 100.0);
        assert!(player_hits_obstacle(&p, &o));
    }

    #[test]
    fn test_star_touch_is_exact() {
        let p = player_at(100.0, 100.0);
        let star = Star {
            pos: Vec2::new(100.0 + PLAYER_SIZE.x - 1.0, 100.0),
            size: STAR_SIZE,
            collected: false,
        };
        assert!(player_touches_star(&p, &star));

        let apart = Star {
            pos: Vec2::new(100.0 + PLAYER_SIZE.x + 1.0, 100.0),
            size: STAR_SIZE,
            collected: false,
        };
        assert!(!player_touches_star(&p, &apart));
    }

    #[test]
    fn test_clearance_requires_both_axes() {
        let pos = Vec2::new(500.0, 200.0);
        let size = STAR_SIZE;
        // Horizontally close, vertically far
        assert!(!within_clearance(
            pos,
            size,
            Vec2::new(510.0, 400.0),
            OBSTACLE_SIZE,
            80.0
        ));
        // Vertically close, horizontally far
        assert!(!within_clearance(
            pos,
            size,
            Vec2::new(700.0, 210.0),
            OBSTACLE_SIZE,
            80.0
        ));
        // Close on both axes
        assert!(within_clearance(
            pos,
            size,
            Vec2::new(540.0, 230.0),
            OBSTACLE_SIZE,
            80.0
        ));
    }
}
