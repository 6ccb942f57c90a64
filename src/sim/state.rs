//! World state and entity records
//!
//! Everything the per-frame tick mutates lives here. The world is replaced
//! wholesale on restart; nothing carries over between runs except the seed
//! handed to [`World::new`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Drawable surface dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top of the ground strip
    pub fn ground_top(&self) -> f32 {
        self.height - GROUND_HEIGHT
    }

    /// Player y while standing on the ground
    pub fn player_ground_y(&self) -> f32 {
        self.ground_top() - PLAYER_SIZE.y
    }

    /// Fixed screen column the player occupies (the world scrolls, not the player)
    pub fn player_column(&self) -> f32 {
        self.width / 2.0 - PLAYER_SIZE.x / 2.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: VIEW_HEIGHT,
        }
    }
}

/// The player character
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Jumps spent since last ground contact
    pub jumps_used: u32,
    pub airborne: bool,
}

impl Player {
    /// Player at rest on the ground in the fixed screen column
    pub fn spawn(view: &Viewport) -> Self {
        Self {
            pos: Vec2::new(view.player_column(), view.player_ground_y()),
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            jumps_used: 0,
            airborne: false,
        }
    }
}

/// A scrolling obstacle. Obstacles spawned together share a `stack_id` and
/// the same x, so they move as one column and score as one group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
    /// Visual variant index
    pub kind: u8,
    pub stack_id: u32,
    pub passed: bool,
}

/// A collectible star
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: Vec2,
    pub collected: bool,
}

/// One-shot cues produced by a tick, drained by the session glue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    StarCollected,
    Hit,
    GameOver,
}

/// The single mutable aggregate the engine operates on
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Run RNG; every spawn decision draws from here
    pub rng: Pcg32,
    pub view: Viewport,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub stars: Vec<Star>,
    /// Base scroll speed, stepped upward at fixed intervals, never down
    pub speed: f32,
    pub frame: u64,
    pub score: u32,
    pub star_count: u32,
    /// Background scroll offset, wraps at `bg_span`
    pub bg_offset: f32,
    /// Width of one background tile at the current viewport scaling
    pub bg_span: f32,
    /// May be fractional (half-heart damage)
    pub hearts: f32,
    /// Frames of collision immunity remaining
    pub invincibility: u32,
    pub paused: bool,
    pub game_over: bool,
    next_stack_id: u32,
    /// Cues emitted this frame
    pub events: Vec<GameEvent>,
}

impl World {
    /// Fresh world for a new run
    pub fn new(seed: u64, view: Viewport) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            view,
            player: Player::spawn(&view),
            obstacles: Vec::new(),
            stars: Vec::new(),
            speed: INITIAL_SPEED,
            frame: 0,
            score: 0,
            star_count: 0,
            bg_offset: 0.0,
            bg_span: view.width,
            hearts: STARTING_HEARTS,
            invincibility: 0,
            paused: false,
            game_over: false,
            next_stack_id: 0,
            events: Vec::new(),
        }
    }

    /// Allocate a fresh monotonic stack id
    pub fn alloc_stack_id(&mut self) -> u32 {
        let id = self.next_stack_id;
        self.next_stack_id += 1;
        id
    }

    /// Apply a surface resize: ground line, idle player position and
    /// background span all follow the viewport.
    pub fn set_viewport(&mut self, view: Viewport) {
        let was_default_span = self.bg_span == self.view.width;
        self.view = view;
        if was_default_span {
            self.bg_span = view.width;
        }
        self.player.pos.x = view.player_column();
        if !self.player.airborne {
            self.player.pos.y = view.player_ground_y();
        }
    }

    /// Take the cues emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
