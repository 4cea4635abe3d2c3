//! Highway Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, TouchEvent};

    use highway_rush::assets::{self, AssetSlot};
    use highway_rush::audio::{AudioManager, Cue};
    use highway_rush::consts::*;
    use highway_rush::platform::{
        LocalStore, action_for_key, action_for_tap, wants_touch_controls,
    };
    use highway_rush::renderer::Renderer;
    use highway_rush::sim::{GameEvent, GameState, LaneDirection, TickInput, tick};
    use highway_rush::ui::{GameOverSummary, hud_text};
    use highway_rush::{BestScore, Settings};

    const PLAYER_MODEL_URL: &str = "assets/carModel.glb";

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Option<Renderer>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        assets: AssetSlot,
        audio: AudioManager,
        store: LocalStore,
        best: BestScore,
        settings: Settings,
        game_over_shown: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store = LocalStore::new();
            let best = BestScore::load(&store);
            let settings = Settings::load(&store);
            Self {
                state: GameState::new(seed, best.0),
                renderer: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                assets: AssetSlot::new(),
                audio: AudioManager::new(&settings),
                store,
                best,
                settings,
                game_over_shown: false,
            }
        }

        fn queue_shift(&mut self, direction: LaneDirection) {
            self.input.shifts.push(direction);
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.input.assets_ready = self.assets.is_ready();

            let mut substeps = 0;
            while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, FRAME_DT);
                self.accumulator -= FRAME_DT;
                substeps += 1;

                // One-shot inputs are consumed by the first tick
                self.input.start = false;
                self.input.shifts.clear();
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Started => {
                    set_hidden("start-overlay", true);
                    set_hidden("hud", false);
                }
                GameEvent::LaneChanged { .. } => self.audio.play(Cue::LaneChange),
                GameEvent::TrafficSpawned { .. } => {}
                GameEvent::Crashed { score, .. } => {
                    self.audio.play(Cue::Impact);
                    self.audio.stop_music();
                    let new_best = self.best.commit(&self.store, score);
                    self.show_game_over(GameOverSummary {
                        score,
                        best: self.best.0,
                        new_best,
                    });
                }
            }
        }

        fn show_game_over(&mut self, summary: GameOverSummary) {
            if self.game_over_shown {
                return;
            }
            self.game_over_shown = true;

            let Some(document) = document() else { return };
            if let Some(el) = document.get_element_by_id("final-score") {
                el.set_text_content(Some(&summary.score_line()));
            }
            if let Some(el) = document.get_element_by_id("final-best") {
                el.set_text_content(Some(&summary.best_line()));
            }
            set_hidden("game-over", false);
        }

        /// Render the current frame
        fn render(&mut self) {
            let model = self.assets.get();
            let Some(renderer) = self.renderer.as_mut() else {
                return;
            };
            if let Some(model) = &model {
                renderer.ensure_player_model(model);
            }
            match renderer.render(&self.state, model.as_deref(), &self.settings) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            if let Some(el) = document.get_element_by_id("hud") {
                el.set_text_content(Some(&hud_text(&self.state.score)));
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Register `handler` for `event` on the element with `id`
    fn on_element<F>(document: &Document, id: &str, event: &str, handler: F)
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        let _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn viewport_size() -> (f64, f64) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (w, h)
    }

    fn canvas_pixel_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    fn update_touch_controls() {
        let (width, _) = viewport_size();
        let user_agent = web_sys::window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default();
        set_hidden("touch-controls", !wants_touch_controls(width, &user_agent));
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Highway Rush starting...");

        let Some(document) = document() else {
            log::error!("No document - cannot start");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element - cannot start");
            return;
        };

        let (width, height) = canvas_pixel_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.borrow();
            set_hidden("music-credit", !g.settings.show_music_credit);
            g.update_hud();
        }
        update_touch_controls();

        // Player model loads in the background; Start waits on the slot
        let slot = game.borrow().assets.clone();
        wasm_bindgen_futures::spawn_local(assets::load_player_model(PLAYER_MODEL_URL, slot));

        match Renderer::for_canvas(canvas.clone(), width, height).await {
            Ok(renderer) => game.borrow_mut().renderer = Some(renderer),
            Err(e) => log::error!("Renderer unavailable, continuing without graphics: {}", e),
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        setup_input_handlers(&document, &canvas, game.clone());
        setup_overlay_buttons(&document, game.clone());
        setup_resize(canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Highway Rush running!");
    }

    fn setup_input_handlers(
        document: &Document,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(direction) = action_for_key(&event.key()) {
                    game.borrow_mut().queue_shift(direction);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen lane buttons
        let buttons = [
            ("left-btn", LaneDirection::Left),
            ("right-btn", LaneDirection::Right),
        ];
        for (id, direction) in buttons {
            let game = game.clone();
            on_element(document, id, "pointerdown", move |event: web_sys::Event| {
                event.prevent_default();
                game.borrow_mut().queue_shift(direction);
            });
        }

        // Single-finger taps on either half of the screen
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let touches = event.touches();
                if touches.length() != 1 {
                    return;
                }
                if let Some(touch) = touches.get(0) {
                    let (width, _) = viewport_size();
                    let direction = action_for_tap(touch.client_x() as f64, width);
                    game.borrow_mut().queue_shift(direction);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // No page scrolling while racing
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if game.borrow().state.is_running() {
                    event.prevent_default();
                }
            });
            let options = web_sys::AddEventListenerOptions::new();
            options.set_passive(false);
            let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Browsers only allow audio after a gesture
        for event in ["pointerdown", "keydown"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().audio.start_music_once();
            });
            let _ =
                window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_overlay_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        on_element(document, "start-btn", "click", move |_event| {
            let mut g = game.borrow_mut();
            g.input.start = true;
            if !g.assets.is_ready() {
                log::info!("Start requested, waiting for player model");
            }
        });

        // A fresh page load is the reset
        on_element(document, "restart-btn", "click", |_event| {
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        });
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = canvas_pixel_size(&canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(renderer) = game.borrow_mut().renderer.as_mut() {
                renderer.resize(width, height);
            }
            update_touch_controls();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
use highway_rush::Tuning;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Highway Rush (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve` for the web version");

    // highway-rush [seed] [tuning.json]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path).map(|json| Tuning::from_json(&json)) {
            Ok(Ok(tuning)) => tuning,
            Ok(Err(e)) => {
                log::error!("Invalid tuning file {}: {}", path, e);
                return;
            }
            Err(e) => {
                log::error!("Cannot read tuning file {}: {}", path, e);
                return;
            }
        },
        None => Tuning::default(),
    };
    headless::run(seed, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Simulated run with a simple lane-dodging autopilot
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::{Vec2, Vec3};
    use highway_rush::consts::FRAME_DT;
    use highway_rush::platform::MemoryStore;
    use highway_rush::sim::{GameEvent, GameState, LaneDirection, TickInput, find_collision, tick};
    use highway_rush::{BestScore, Tuning};
    use highway_rush::ui::hud_text;

    const MAX_FRAMES: u64 = 36_000;
    const LOOKAHEAD_Z: f32 = 8.0;

    /// Dodge toward a free lane when a car is about to reach ours
    fn autopilot(state: &GameState) -> Option<LaneDirection> {
        // Stretched hitbox covering the stretch of road just ahead
        let half = Vec2::new(state.tuning.hitbox_x, LOOKAHEAD_Z * 0.5 + state.tuning.hitbox_z);
        let occupied = |lane: i8| {
            let probe = Vec3::new(
                highway_rush::lane_x(lane, state.tuning.lane_width),
                0.0,
                state.player.pos.z + LOOKAHEAD_Z * 0.5,
            );
            find_collision(probe, &state.traffic, half).is_some()
        };

        let lane = state.player.lane.index();
        if !occupied(lane) {
            return None;
        }
        [(LaneDirection::Left, lane + 1), (LaneDirection::Right, lane - 1)]
            .into_iter()
            .find(|&(_, target)| (-1..=1).contains(&target) && !occupied(target))
            .map(|(direction, _)| direction)
    }

    pub fn run(seed: u64, tuning: Tuning) {
        let store = MemoryStore::new();
        let mut best = BestScore::load(&store);
        let mut state = GameState::with_tuning(seed, best.0, tuning);

        let mut input = TickInput {
            start: true,
            assets_ready: true,
            ..Default::default()
        };

        while state.frame < MAX_FRAMES {
            input.shifts = autopilot(&state).into_iter().collect();
            tick(&mut state, &input, FRAME_DT);
            input.start = false;

            for event in state.drain_events() {
                if let GameEvent::Crashed { score, .. } = event {
                    best.commit(&store, score);
                    log::info!("Crashed after {} frames", state.frame);
                }
            }
            if !state.is_running() && state.frame > 0 {
                break;
            }
        }

        println!("{}", hud_text(&state.score));
        println!("Best: {}", best.0);
    }
}
