//! Snail Run - a side-scrolling endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring)
//! - `input`: Raw key/pointer events mapped to game commands
//! - `session`: Run lifecycle (start/pause/resume/restart/game over)
//! - `score`: Best-score persistence
//! - `render`: Canvas2D projection of the world state
//! - `audio`: Web Audio sound cues

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod score;
pub mod session;
pub mod sim;

pub use session::{HudSnapshot, Session, SessionPhase};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Downward acceleration per frame
    pub const GRAVITY: f32 = 0.6;
    /// Vertical velocity applied on jump (negative = up in screen coords)
    pub const JUMP_STRENGTH: f32 = -12.0;
    /// Horizontal input velocity while a direction key is held
    pub const MOVE_SPEED: f32 = 5.0;
    /// Fraction of downward velocity kept while hovering (hold-jump)
    pub const HOVER_DAMPING: f32 = 0.1;
    /// Height of the ground strip in pixels
    pub const GROUND_HEIGHT: f32 = 100.0;
    /// World scroll speed at the start of a run
    pub const INITIAL_SPEED: f32 = 6.0;

    /// Frames of collision immunity after a hit
    pub const INVINCIBILITY_FRAMES: u32 = 60;
    /// Hearts lost per collision
    pub const HEART_DAMAGE: f32 = 0.5;
    /// Hearts at the start of a run
    pub const STARTING_HEARTS: f32 = 3.0;
    /// Inward hitbox shrink on all obstacle sides (forgiving collisions)
    pub const COLLISION_BUFFER: f32 = 10.0;

    /// Mid-air jump budget (double jump)
    pub const MAX_JUMPS: u32 = 2;
    /// Score bonus for collecting a star
    pub const STAR_SCORE_BONUS: u32 = 10;

    /// Probability gate for an obstacle spawn once the interval lines up
    pub const OBSTACLE_SPAWN_CHANCE: f64 = 0.7;
    /// Random spawn-interval jitter, +/- frames
    pub const OBSTACLE_SPAWN_JITTER: i64 = 30;
    /// Number of obstacle visual variants
    pub const OBSTACLE_KINDS: u8 = 3;
    /// Tallest obstacle stack (inclusive)
    pub const MAX_STACK_HEIGHT: u32 = 3;
    /// Minimum horizontal gap to the nearest obstacle before another may spawn
    pub const OBSTACLE_MIN_GAP: f32 = 220.0;

    /// Frames between star spawn attempts
    pub const STAR_SPAWN_INTERVAL: u64 = 150;
    /// Minimum star height above the ground line
    pub const STAR_SPAWN_HEIGHT_MIN: f32 = 50.0;
    /// Randomized band above the minimum star height
    pub const STAR_SPAWN_HEIGHT_RANGE: f32 = 100.0;
    /// Required clearance between a star candidate and obstacles or other stars
    pub const STAR_CLEARANCE: f32 = 80.0;

    /// Frames between base-speed increases
    pub const SPEED_INCREASE_INTERVAL: u64 = 500;
    /// Base-speed increment per ramp step
    pub const SPEED_INCREASE_AMOUNT: f32 = 0.5;

    /// Entity sizes in pixels
    pub const PLAYER_SIZE: Vec2 = Vec2::new(60.0, 60.0);
    pub const OBSTACLE_SIZE: Vec2 = Vec2::new(50.0, 50.0);
    pub const STAR_SIZE: Vec2 = Vec2::new(30.0, 30.0);

    /// Entities are removed this far past the left edge
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Fixed drawable height; width follows the host element
    pub const VIEW_HEIGHT: f32 = 500.0;

    /// HUD snapshot publish interval, in frames
    pub const HUD_SYNC_INTERVAL: u64 = 10;
    /// Flicker band width while invincible, in frames
    pub const FLICKER_BAND: u64 = 5;

    /// Resume countdown steps and spacing
    pub const RESUME_COUNTDOWN_STEPS: u32 = 3;
    pub const RESUME_COUNTDOWN_INTERVAL_MS: i32 = 1000;
}

/// Axis-aligned rectangle overlap test
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}
