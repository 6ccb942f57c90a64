//! Session controller
//!
//! Owns the run lifecycle around the pure simulation: `Idle → Running ⇄
//! Paused → GameOver`, restart, the resume countdown, best-score
//! write-through and the throttled HUD snapshot. The controller itself is
//! platform-independent; the host only schedules animation frames and the
//! countdown timer, and stops scheduling whenever [`Session::advance_frame`]
//! says so.

use crate::consts::*;
use crate::input::InputAdapter;
use crate::score::ScoreStore;
use crate::sim::{self, GameEvent, Viewport, World};

/// Session-level lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No run in progress (menu/attract)
    Idle,
    Running,
    Paused,
    /// Counting down before ticking resumes
    Resuming,
    GameOver,
}

/// Read-only projection for the presentation layer. Published at a coarse
/// interval; never the source of truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub score: u32,
    pub stars: u32,
    pub hearts: f32,
    pub best_score: u32,
    pub paused: bool,
    pub game_over: bool,
}

/// Resume countdown, driven by an external fixed-interval timer so it stays
/// independent of animation-frame scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeCountdown {
    remaining: u32,
}

/// Result of one countdown timer fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    /// Another step to announce (the count now showing)
    Step(u32),
    /// Countdown finished: ticking may resume
    Resume,
    /// No countdown in progress
    Inactive,
}

impl ResumeCountdown {
    fn new() -> Self {
        Self {
            remaining: RESUME_COUNTDOWN_STEPS,
        }
    }

    fn advance(&mut self) -> Option<u32> {
        self.remaining = self.remaining.saturating_sub(1);
        (self.remaining > 0).then_some(self.remaining)
    }
}

/// The session controller
pub struct Session<S: ScoreStore> {
    world: World,
    phase: SessionPhase,
    pub input: InputAdapter,
    store: S,
    best_score: u32,
    hud: HudSnapshot,
    countdown: Option<ResumeCountdown>,
    /// Aspect-corrected background span, re-applied across restarts
    bg_span: Option<f32>,
}

impl<S: ScoreStore> Session<S> {
    /// New idle session; the best score is loaded once, up front
    pub fn new(store: S, view: Viewport) -> Self {
        let best_score = store.load_best();
        let world = World::new(0, view);
        let hud = Self::snapshot(&world, best_score);
        Self {
            world,
            phase: SessionPhase::Idle,
            input: InputAdapter::new(),
            store,
            best_score,
            hud,
            countdown: None,
            bg_span: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Latest published snapshot
    pub fn hud(&self) -> HudSnapshot {
        self.hud
    }

    /// Count currently showing during the resume countdown
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining)
    }

    /// Start a fresh run, replacing the world wholesale
    pub fn start(&mut self, seed: u64) {
        self.world = World::new(seed, self.world.view);
        if let Some(span) = self.bg_span {
            self.world.bg_span = span;
        }
        self.input = InputAdapter::new();
        self.countdown = None;
        self.phase = SessionPhase::Running;
        self.publish_hud();
        log::info!("run started with seed {seed}");
    }

    /// Restart after game over; a full re-initialization
    pub fn restart(&mut self, seed: u64) {
        self.start(seed);
    }

    /// Route a jump request by phase. Returns true when it (re)started a
    /// run, meaning the host must resume frame scheduling.
    pub fn jump_requested(&mut self, seed: u64) -> bool {
        match self.phase {
            SessionPhase::Idle => {
                self.start(seed);
                true
            }
            SessionPhase::GameOver => {
                self.restart(seed);
                true
            }
            SessionPhase::Running => {
                self.input.pointer_down();
                false
            }
            SessionPhase::Paused | SessionPhase::Resuming => false,
        }
    }

    /// Toggle pause. Resuming goes through the countdown; the host starts
    /// its interval timer when it sees [`SessionPhase::Resuming`].
    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Running => {
                self.phase = SessionPhase::Paused;
                self.world.paused = true;
                self.publish_hud();
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Resuming;
                self.countdown = Some(ResumeCountdown::new());
            }
            _ => {}
        }
    }

    /// One fire of the host's countdown interval timer. Never advances
    /// physics; on the final fire the session returns to `Running` and the
    /// host re-enters frame scheduling.
    pub fn countdown_tick(&mut self) -> CountdownOutcome {
        let Some(countdown) = &mut self.countdown else {
            return CountdownOutcome::Inactive;
        };

        match countdown.advance() {
            Some(n) => CountdownOutcome::Step(n),
            None => {
                self.countdown = None;
                self.phase = SessionPhase::Running;
                self.world.paused = false;
                // Drop one-shots accumulated while suspended
                let _ = self.input.take_tick_input();
                self.publish_hud();
                CountdownOutcome::Resume
            }
        }
    }

    /// Advance one animation frame. Returns true when the host should
    /// schedule the next frame; false stops the loop (pause, countdown,
    /// game over detected inside this very tick, or no run in progress).
    pub fn advance_frame(&mut self) -> bool {
        if self.input.take_pause() {
            self.toggle_pause();
        }

        if self.phase != SessionPhase::Running {
            // Keep stale one-shots from leaking into the next resume
            let _ = self.input.take_tick_input();
            return false;
        }

        let input = self.input.take_tick_input();
        sim::tick(&mut self.world, &input);

        if self.world.game_over {
            self.finish_run();
            return false;
        }

        if self.world.frame % HUD_SYNC_INTERVAL == 0 {
            self.publish_hud();
        }
        true
    }

    /// Cues emitted since the last drain (audio hooks)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.drain_events()
    }

    /// Surface resize: ground line, idle position and background scaling
    /// all follow the viewport.
    pub fn set_viewport(&mut self, view: Viewport) {
        self.world.set_viewport(view);
    }

    /// Aspect-corrected width of one background tile
    pub fn set_background_span(&mut self, span: f32) {
        if span > 0.0 {
            self.bg_span = Some(span);
            self.world.bg_span = span;
        }
    }

    fn finish_run(&mut self) {
        self.phase = SessionPhase::GameOver;
        if self.world.score > self.best_score {
            self.best_score = self.world.score;
            self.store.save_best(self.best_score);
            log::info!("new best score {}", self.best_score);
        }
        self.publish_hud();
    }

    fn publish_hud(&mut self) {
        self.hud = Self::snapshot(&self.world, self.best_score);
    }

    fn snapshot(world: &World, best_score: u32) -> HudSnapshot {
        HudSnapshot {
            score: world.score,
            stars: world.star_count,
            hearts: world.hearts,
            best_score,
            paused: world.paused,
            game_over: world.game_over,
        }
    }
}
