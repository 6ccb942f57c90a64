//! Input adapter
//!
//! Translates raw key/pointer events into the small command set the engine
//! consumes: an edge-triggered jump, the level-triggered hold and move
//! states, and a pause toggle. Pure state machine, no browser types.

use crate::consts::MOVE_SPEED;
use crate::sim::TickInput;

/// Pending commands accumulated between frames
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter {
    jump_requested: bool,
    pause_requested: bool,
    space_held: bool,
    up_held: bool,
    move_vx: f32,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key-down event. `repeat` marks auto-repeated events, which
    /// never produce a new jump edge.
    pub fn key_down(&mut self, code: &str, repeat: bool) {
        match code {
            "Space" => {
                self.space_held = true;
                if !repeat {
                    self.jump_requested = true;
                }
            }
            "ArrowUp" => {
                self.up_held = true;
                if !repeat {
                    self.jump_requested = true;
                }
            }
            "ArrowRight" => self.move_vx = MOVE_SPEED,
            "ArrowLeft" => self.move_vx = -MOVE_SPEED,
            "Escape" => self.pause_requested = true,
            _ => {}
        }
    }

    /// Feed a key-up event
    pub fn key_up(&mut self, code: &str) {
        match code {
            "Space" => self.space_held = false,
            "ArrowUp" => self.up_held = false,
            "ArrowLeft" | "ArrowRight" => self.move_vx = 0.0,
            _ => {}
        }
    }

    /// Pointer or touch press on the play surface counts as a jump request
    pub fn pointer_down(&mut self) {
        self.jump_requested = true;
    }

    /// True while either jump key is held (feeds the hover damping)
    pub fn jump_held(&self) -> bool {
        self.space_held || self.up_held
    }

    /// Snapshot for the next tick. The edge-triggered jump is consumed;
    /// hold and move levels persist until the matching key-up.
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            jump: std::mem::take(&mut self.jump_requested),
            hold_jump: self.jump_held(),
            move_vx: self.move_vx,
        }
    }

    /// Consume a pending pause toggle
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputAdapter::new();
        input.key_down("Space", false);

        let first = input.take_tick_input();
        assert!(first.jump);
        assert!(first.hold_jump);

        // Still held: no new edge, hold persists
        let second = input.take_tick_input();
        assert!(!second.jump);
        assert!(second.hold_jump);
    }

    #[test]
    fn test_key_repeat_does_not_jump() {
        let mut input = InputAdapter::new();
        input.key_down("Space", true);
        let snap = input.take_tick_input();
        assert!(!snap.jump);
        assert!(snap.hold_jump, "repeat still counts as held");
    }

    #[test]
    fn test_arrow_up_also_jumps_and_holds() {
        let mut input = InputAdapter::new();
        input.key_down("ArrowUp", false);
        let snap = input.take_tick_input();
        assert!(snap.jump);
        assert!(snap.hold_jump);

        input.key_up("ArrowUp");
        assert!(!input.take_tick_input().hold_jump);
    }

    #[test]
    fn test_move_is_level_triggered() {
        let mut input = InputAdapter::new();
        input.key_down("ArrowRight", false);
        assert_eq!(input.take_tick_input().move_vx, MOVE_SPEED);
        assert_eq!(input.take_tick_input().move_vx, MOVE_SPEED);

        input.key_up("ArrowRight");
        assert_eq!(input.take_tick_input().move_vx, 0.0);

        input.key_down("ArrowLeft", false);
        assert_eq!(input.take_tick_input().move_vx, -MOVE_SPEED);
        input.key_up("ArrowLeft");
        assert_eq!(input.take_tick_input().move_vx, 0.0);
    }

    #[test]
    fn test_pointer_is_a_jump_request() {
        let mut input = InputAdapter::new();
        input.pointer_down();
        assert!(input.take_tick_input().jump);
        assert!(!input.take_tick_input().jump);
    }

    #[test]
    fn test_pause_toggle_consumed_once() {
        let mut input = InputAdapter::new();
        input.key_down("Escape", false);
        assert!(input.take_pause());
        assert!(!input.take_pause());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut input = InputAdapter::new();
        input.key_down("KeyW", false);
        let snap = input.take_tick_input();
        assert!(!snap.jump);
        assert!(!snap.hold_jump);
        assert_eq!(snap.move_vx, 0.0);
    }
}
