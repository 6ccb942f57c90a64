//! Snail Run entry point
//!
//! Handles platform-specific initialization and drives the frame loop. All
//! game decisions live in the library; this file only schedules frames and
//! timers, forwards DOM events and projects HUD state into the page.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use snail_run::audio::{AudioManager, SoundCue, music_pass_ms};
    use snail_run::consts::*;
    use snail_run::render::Renderer;
    use snail_run::score::LocalScoreStore;
    use snail_run::session::{CountdownOutcome, HudSnapshot, Session, SessionPhase};
    use snail_run::sim::{GameEvent, Viewport};

    /// Game instance holding the session and its platform collaborators
    struct Game {
        session: Session<LocalScoreStore>,
        renderer: Option<Renderer>,
        /// Built lazily on the first user gesture
        audio: Option<AudioManager>,
        canvas: HtmlCanvasElement,
        last_hud: Option<HudSnapshot>,
        last_phase: SessionPhase,
        /// True while a frame is scheduled
        loop_running: bool,
        countdown_timer: Option<i32>,
        music_timer: Option<i32>,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement, character: &str) -> Self {
            let view = Viewport::new(canvas.width() as f32, canvas.height() as f32);
            let session = Session::new(LocalScoreStore, view);

            let renderer = match Renderer::new(&canvas, character) {
                Ok(r) => Some(r),
                Err(e) => {
                    log::warn!("renderer unavailable: {e:?}");
                    None
                }
            };

            Self {
                session,
                renderer,
                audio: None,
                canvas,
                last_hud: None,
                last_phase: SessionPhase::Idle,
                loop_running: false,
                countdown_timer: None,
                music_timer: None,
            }
        }

        fn ensure_audio(&mut self) {
            let audio = self.audio.get_or_insert_with(AudioManager::new);
            audio.resume();
        }

        fn play_cue(&self, cue: SoundCue) {
            if let Some(audio) = &self.audio {
                audio.play(cue);
            }
        }

        fn stop_music(&mut self) {
            if let Some(id) = self.music_timer.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(id);
                }
            }
            if let Some(audio) = &mut self.audio {
                audio.stop_music();
            }
        }

        fn stop_countdown_timer(&mut self) {
            if let Some(id) = self.countdown_timer.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(id);
                }
            }
        }

        /// Drain simulation cues into audio
        fn handle_events(&mut self) {
            for event in self.session.drain_events() {
                match event {
                    GameEvent::StarCollected => self.play_cue(SoundCue::Collect),
                    GameEvent::Hit => self.play_cue(SoundCue::Hit),
                    GameEvent::GameOver => self.stop_music(),
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(renderer) = &self.renderer {
                // Adopt the aspect-corrected background span once known
                if let Some(span) = renderer.background_span(self.session.world().view.height) {
                    self.session.set_background_span(span);
                }
                renderer.render(self.session.world());
            }
        }

        /// Project HUD state into the page, only when the published
        /// snapshot or the phase actually changed.
        fn sync_hud(&mut self) {
            let hud = self.session.hud();
            let phase = self.session.phase();
            if self.last_hud == Some(hud) && self.last_phase == phase {
                return;
            }
            self.last_hud = Some(hud);
            self.last_phase = phase;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            set_text("hud-score", &hud.score.to_string());
            set_text("hud-stars", &hud.stars.to_string());
            set_text("hud-hearts", &hud.hearts.to_string());
            set_text("hud-best", &hud.best_score.to_string());

            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            show("start-overlay", phase == SessionPhase::Idle);
            show(
                "pause-overlay",
                phase == SessionPhase::Paused || phase == SessionPhase::Resuming,
            );
            show("game-over", phase == SessionPhase::GameOver);

            if phase == SessionPhase::GameOver {
                set_text("final-score", &hud.score.to_string());
                set_text("final-best", &hud.best_score.to_string());
            }
            if let Some(count) = self.session.countdown_remaining() {
                set_text("countdown-num", &count.to_string());
            }
        }

        /// Apply the current host element size to the session
        fn apply_canvas_size(&mut self) {
            let width = self
                .canvas
                .parent_element()
                .map(|p| p.client_width())
                .unwrap_or_else(|| self.canvas.client_width());
            let width = width.max(1) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(VIEW_HEIGHT as u32);
            self.session
                .set_viewport(Viewport::new(width as f32, VIEW_HEIGHT));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Snail Run starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let character = canvas
            .get_attribute("data-character")
            .unwrap_or_else(|| "nelly".to_string());

        let game = Rc::new(RefCell::new(Game::new(canvas.clone(), &character)));

        {
            let mut g = game.borrow_mut();
            g.apply_canvas_size();
            g.render();
            g.sync_hud();
        }

        log::info!(
            "initialized for character '{}', best score {}",
            character,
            game.borrow().session.best_score()
        );

        setup_input_handlers(&canvas, game.clone());
        setup_resize_handler(game.clone());
        setup_auto_pause(game);

        log::info!("Snail Run ready - press jump to start");
    }

    /// Begin (or rejoin) the animation-frame loop
    fn start_frame_loop(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.loop_running {
                return;
            }
            g.loop_running = true;
        }
        request_frame(game.clone());
    }

    fn request_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(game: Rc<RefCell<Game>>) {
        let keep_going = {
            let mut g = game.borrow_mut();
            let keep = g.session.advance_frame();
            g.handle_events();
            g.render();
            g.sync_hud();
            if !keep {
                // Pause, countdown or game over: the loop stops here and is
                // re-entered explicitly on resume/restart.
                g.loop_running = false;
                if g.session.phase() == SessionPhase::Paused {
                    g.stop_music();
                }
            }
            keep
        };

        if keep_going {
            request_frame(game);
        }
    }

    /// Start the background melody and its re-queue interval
    fn start_music(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.stop_music();
            let Some(audio) = &mut g.audio else { return };
            audio.start_music();
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let timer_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let g = timer_game.borrow();
            if let Some(audio) = &g.audio {
                audio.schedule_music_pass();
            }
        });
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                music_pass_ms(),
            )
            .ok();
        closure.forget();
        game.borrow_mut().music_timer = id;
    }

    /// Route a jump request; kicks the loop and music when a run starts
    fn jump_request(game: &Rc<RefCell<Game>>) {
        let started = {
            let mut g = game.borrow_mut();
            g.ensure_audio();
            g.session.jump_requested(js_sys::Date::now() as u64)
        };
        if started {
            start_music(game);
            start_frame_loop(game);
        }
    }

    /// Process a pause toggle; manages the countdown timer and music
    fn pause_toggled(game: &Rc<RefCell<Game>>) {
        let phase = {
            let mut g = game.borrow_mut();
            g.session.toggle_pause();
            let phase = g.session.phase();
            if phase == SessionPhase::Paused {
                g.stop_music();
            }
            g.sync_hud();
            phase
        };

        if phase == SessionPhase::Resuming {
            start_countdown_timer(game.clone());
        }
    }

    fn start_countdown_timer(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let timer_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let outcome = {
                let mut g = timer_game.borrow_mut();
                let outcome = g.session.countdown_tick();
                match outcome {
                    CountdownOutcome::Step(_) | CountdownOutcome::Resume => {
                        g.play_cue(SoundCue::CountdownTick)
                    }
                    CountdownOutcome::Inactive => {}
                }
                if matches!(
                    outcome,
                    CountdownOutcome::Resume | CountdownOutcome::Inactive
                ) {
                    g.stop_countdown_timer();
                }
                g.sync_hud();
                outcome
            };

            if outcome == CountdownOutcome::Resume {
                start_music(&timer_game);
                start_frame_loop(&timer_game);
            }
        });

        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                RESUME_COUNTDOWN_INTERVAL_MS,
            )
            .ok();
        closure.forget();
        game.borrow_mut().countdown_timer = id;
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                match code.as_str() {
                    "Space" | "ArrowUp" => {
                        event.prevent_default();
                        game.borrow_mut()
                            .session
                            .input
                            .key_down(&code, event.repeat());
                        if !event.repeat() {
                            jump_request(&game);
                        }
                    }
                    "ArrowLeft" | "ArrowRight" => {
                        game.borrow_mut()
                            .session
                            .input
                            .key_down(&code, event.repeat());
                    }
                    "Escape" => {
                        let toggled = {
                            let mut g = game.borrow_mut();
                            g.session.input.key_down(&code, event.repeat());
                            g.session.input.take_pause()
                        };
                        if toggled {
                            pause_toggled(&game);
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.input.key_up(&event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click on the play surface is a jump request
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                jump_request(&game);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                jump_request(&game);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.apply_canvas_size();
            // Redraw immediately so a suspended game stays visible
            g.render();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Tab hidden
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow().session.phase() == SessionPhase::Running
                {
                    pause_toggled(&game);
                    log::info!("auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow().session.phase() == SessionPhase::Running {
                    pause_toggled(&game);
                    log::info!("auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use snail_run::score::MemoryScoreStore;
    use snail_run::session::Session;
    use snail_run::sim::Viewport;

    env_logger::init();
    log::info!("Snail Run (native) starting...");
    log::info!("native mode has no display - running a headless smoke run");

    let mut session = Session::new(MemoryScoreStore::default(), Viewport::default());
    session.start(42);

    let mut frames = 0u32;
    while frames < 3000 {
        // Jab the jump key now and then to exercise the double jump
        match frames % 60 {
            0 => session.input.key_down("Space", false),
            5 => {
                session.input.key_up("Space");
                session.input.key_down("Space", false);
            }
            20 => session.input.key_up("Space"),
            _ => {}
        }
        if !session.advance_frame() {
            break;
        }
        frames += 1;
    }

    let hud = session.hud();
    println!(
        "ran {frames} frames: score {}, stars {}, hearts {}, best {}",
        hud.score, hud.stars, hud.hearts, hud.best_score
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main; this satisfies the bin target
}
