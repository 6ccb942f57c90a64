//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Frame-based stepping only, driven by the session controller
//! - Seeded RNG only; a fixed seed reproduces a run
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{player_hits_obstacle, player_touches_star, within_clearance};
pub use state::{GameEvent, Obstacle, Player, Star, Viewport, World};
pub use tick::{TickInput, tick};
