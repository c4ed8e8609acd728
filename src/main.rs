//! Slop Shooter entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use slop_shooter::Settings;
    use slop_shooter::audio::WebAudio;
    use slop_shooter::frame::{FrameScheduler, InputState, Key, NullRenderer, prevents_default};
    use slop_shooter::persistence::LocalStorageStore;
    use slop_shooter::platform::canvas::CanvasRenderer;
    use slop_shooter::platform::dom::DomUi;
    use slop_shooter::platform::fetch::FetchAssets;
    use slop_shooter::services::Services;
    use slop_shooter::sim::{FrameSnapshot, GameMode, GameState, ModeEvent};
    use slop_shooter::tuning::{Tuning, UpgradeKey};

    /// Buttons that only feed the mode table
    const MODE_BUTTONS: [(&str, ModeEvent); 9] = [
        ("startGame", ModeEvent::StartPressed),
        ("upgradeShop", ModeEvent::ShopPressed),
        ("backFromShop", ModeEvent::MenuPressed),
        ("resumeGame", ModeEvent::ResumePressed),
        ("quitToMenu", ModeEvent::MenuPressed),
        ("nextLevel", ModeEvent::MenuPressed),
        ("backToMenu", ModeEvent::MenuPressed),
        ("retryLevel", ModeEvent::RetryPressed),
        ("failToMenu", ModeEvent::MenuPressed),
    ];

    /// Game instance holding all state
    struct Game {
        state: GameState,
        services: Services,
        scheduler: FrameScheduler,
        input: InputState,
        renderer: Option<CanvasRenderer>,
        ui: DomUi,
        audio: Rc<RefCell<WebAudio>>,
        settings: Settings,
    }

    impl Game {
        /// One display refresh: update, draw, then sync the DOM
        fn frame(&mut self, time: f64) {
            let Game {
                state,
                services,
                scheduler,
                input,
                renderer,
                ui,
                ..
            } = self;

            match renderer {
                Some(renderer) => scheduler.on_refresh(time, state, input, services, renderer),
                None => scheduler.on_refresh(time, state, input, services, &mut NullRenderer),
            };
            ui.sync(&FrameSnapshot::capture(state), state, state.ticks);
        }

        fn press(&mut self, event: ModeEvent) {
            let before = self.state.mode();
            let after = self.state.dispatch(event.clone(), &mut self.services);
            log::debug!("{:?}: {:?} -> {:?}", event, before, after);
        }

        fn toggle_sound(&mut self) {
            let enabled = self.settings.toggle_sound();
            self.audio.borrow_mut().apply_settings(&self.settings);
            self.settings.save();
            log::info!("Sound {}", if enabled { "on" } else { "off" });
        }

        /// Number keys pick an owned weapon
        fn pick_weapon(&mut self, index: usize) {
            match self.state.select_weapon(index, &mut self.services) {
                Ok(()) => log::info!("Selected weapon {}", index + 1),
                Err(e) => log::info!("Can't select weapon {}: {}", index + 1, e),
            }
        }

        /// Tab hidden or window blurred
        fn lose_focus(&mut self, reason: &str) {
            self.input.release_all();
            if self.settings.pause_on_blur && self.state.mode() == GameMode::Playing {
                self.state.auto_pause(&mut self.services);
                log::info!("Auto-paused ({})", reason);
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Slop Shooter starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let renderer = CanvasRenderer::new(&canvas);
        if renderer.is_none() {
            log::error!("Canvas 2D context unavailable - nothing will be drawn");
        }

        let settings = Settings::load();
        let audio = Rc::new(RefCell::new(WebAudio::new(&settings)));
        let mut services = Services::new(
            Box::new(LocalStorageStore),
            Box::new(audio.clone()),
            Box::new(FetchAssets::new()),
        );

        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(seed, Tuning::default(), &mut services);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            services,
            scheduler: FrameScheduler::new(),
            input: InputState::new(),
            renderer,
            ui: DomUi::new(document.clone()),
            audio,
            settings,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_mode_buttons(game.clone());
        setup_shop_buttons(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Slop Shooter running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if prevents_default(&key) {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                g.audio.borrow().resume();

                match key.as_str() {
                    "m" | "M" => g.toggle_sound(),
                    digit @ ("1" | "2" | "3" | "4" | "5" | "6") => {
                        if let Ok(n) = digit.parse::<usize>() {
                            g.pick_weapon(n - 1);
                        }
                    }
                    _ => {
                        if let Some(key) = Key::from_dom(&key) {
                            g.input.key_down(key);
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_dom(&event.key()) {
                    game.borrow_mut().input.key_up(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Canvas click shoots
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.borrow().resume();
                g.input.click();
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        let document = web_sys::window().unwrap().document().unwrap();
        match document.get_element_by_id(id) {
            Some(btn) => {
                let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            None => log::warn!("Missing button #{}", id),
        }
    }

    fn setup_mode_buttons(game: Rc<RefCell<Game>>) {
        for (id, event) in MODE_BUTTONS {
            let game = game.clone();
            on_click(id, move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.borrow().resume();
                g.press(event.clone());
            });
        }
    }

    fn setup_shop_buttons(game: Rc<RefCell<Game>>) {
        for key in UpgradeKey::ALL {
            let game = game.clone();
            on_click(&format!("{}Upgrade", key.as_str()), move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                match g.state.buy_upgrade(key, &mut g.services) {
                    Ok(level) => log::info!("Upgraded {} to level {}", key.as_str(), level),
                    Err(e) => log::info!("Upgrade refused: {}", e),
                }
            });
        }

        let weapon_count = game.borrow().state.tuning.weapons.len();
        for index in 1..weapon_count {
            let game = game.clone();
            on_click(&format!("buyWeapon{}", index), move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                match g.state.buy_weapon(index, &mut g.services) {
                    Ok(()) => log::info!("Purchased weapon {}", index),
                    Err(e) => log::info!("Purchase refused: {}", e),
                }
            });
        }

        on_click("unlockCategory", move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            match g.state.unlock_next_category(&mut g.services) {
                Ok(id) => log::info!("Unlocked category {}", id),
                Err(e) => log::info!("Unlock refused: {}", e),
            }
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().lose_focus("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().lose_focus("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Slop Shooter (native) starting...");
    log::info!("Native mode runs a scripted headless level - use `trunk serve` for the web version");

    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Walk right through one level holding fire and report the outcome
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use slop_shooter::consts::FRAME_MS;
    use slop_shooter::frame::{FrameScheduler, InputState, Key, NullRenderer};
    use slop_shooter::services::Services;
    use slop_shooter::sim::{GameMode, GameState, ModeEvent};
    use slop_shooter::tuning::Tuning;

    let mut services = Services::headless();
    let mut state = GameState::new(42, Tuning::default(), &mut services);
    let mut scheduler = FrameScheduler::new();
    let mut input = InputState::new();

    state.dispatch(ModeEvent::StartPressed, &mut services);
    state.dispatch(ModeEvent::CategoryHit("dogs".to_string()), &mut services);
    log::info!(
        "Playing '{}' with {} targets",
        state.world.category().unwrap_or("?"),
        state.world.targets.len()
    );

    input.key_down(Key::Right);
    let mut now = 0.0;
    for frame in 0..3600u32 {
        if frame % 8 == 0 {
            input.key_down(Key::Fire);
        } else {
            input.key_up(Key::Fire);
        }
        if frame % 45 == 0 {
            input.key_up(Key::Jump);
            input.key_down(Key::Jump);
        }
        scheduler.on_refresh(now, &mut state, &mut input, &mut services, &mut NullRenderer);
        now += FRAME_MS;
        if state.mode() != GameMode::Playing {
            break;
        }
    }

    println!("Mode:   {:?}", state.mode());
    println!("Ticks:  {}", state.ticks);
    println!("Score:  {}", state.session.score);
    println!("Health: {}/{}", state.session.health, state.session.max_health);
    println!("Points: {}", state.session.points);
    if let Some(summary) = state.last_summary() {
        println!("{}", summary.message);
    }
}
