//! Frame scheduler and input mapping
//!
//! One update then one draw per display refresh. Keyboard state is collected
//! between refreshes and turned into a single [`TickInput`].

use std::collections::HashSet;

use crate::consts::{FRAME_MS, MAX_FRAME_MS};
use crate::services::Services;
use crate::sim::{FrameSnapshot, GameMode, GameState, ModeEvent, TickInput, tick};

/// Game actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Jump,
    AimUp,
    AimDown,
    RotateBack,
    RotateForward,
    Fire,
    /// Enter: fires in play, starts from the main menu
    Confirm,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Jump),
            "w" | "W" => Some(Key::AimUp),
            "s" | "S" => Some(Key::AimDown),
            "a" | "A" => Some(Key::RotateBack),
            "d" | "D" => Some(Key::RotateForward),
            " " => Some(Key::Fire),
            "Enter" => Some(Key::Confirm),
            "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Keys whose browser default (page scroll) is suppressed
pub fn prevents_default(key: &str) -> bool {
    matches!(
        key,
        "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | " " | "Enter" | "Escape"
    )
}

/// Held keys plus presses since the last refresh
#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
    clicked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-repeat keydowns don't count as new presses
    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Canvas click fires
    pub fn click(&mut self) {
        self.clicked = true;
    }

    /// Forget held keys, e.g. when the window loses focus and keyups go
    /// missing
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    fn axis(&self, negative: Key, positive: Key) -> i8 {
        match (self.is_held(negative), self.is_held(positive)) {
            // Left wins, matching the order the keys are checked in
            (true, _) => -1,
            (false, true) => 1,
            (false, false) => 0,
        }
    }

    /// Build this frame's tick input and clear the presses
    pub fn take(&mut self) -> TickInput {
        let input = TickInput {
            move_dir: self.axis(Key::Left, Key::Right),
            jump: self.was_pressed(Key::Jump),
            jump_held: self.is_held(Key::Jump),
            aim_dir: self.axis(Key::AimUp, Key::AimDown),
            rotate_dir: self.axis(Key::RotateBack, Key::RotateForward),
            shoot: self.clicked || self.was_pressed(Key::Fire) || self.was_pressed(Key::Confirm),
            pause: self.was_pressed(Key::Pause),
        };
        self.pressed.clear();
        self.clicked = false;
        input
    }
}

/// Draw target for one frame
pub trait FrameRenderer {
    fn draw(&mut self, frame: &FrameSnapshot<'_>);
}

/// Renderer that draws nothing (native runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn draw(&mut self, _frame: &FrameSnapshot<'_>) {}
}

/// Number of refreshes in the FPS window
const FPS_WINDOW: usize = 60;

/// Drives update -> draw from refresh timestamps
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    last_time: Option<f64>,
    pub frames: u64,
    // FPS tracking
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            last_time: None,
            frames: 0,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Elapsed ms since the previous refresh, clamped to [0, MAX_FRAME_MS]
    pub fn delta(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => FRAME_MS,
        };
        self.last_time = Some(now_ms);
        dt
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    fn track_fps(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest entry is the one we will overwrite next
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    /// One display refresh: input, one tick, one draw. Returns the clamped
    /// delta used for the fire-rate clock.
    pub fn on_refresh(
        &mut self,
        now_ms: f64,
        state: &mut GameState,
        input: &mut InputState,
        services: &mut Services,
        renderer: &mut dyn FrameRenderer,
    ) -> f64 {
        let dt = self.delta(now_ms);
        self.track_fps(now_ms);

        let starting = state.mode() == GameMode::MainMenu && input.was_pressed(Key::Confirm);
        let mut tick_input = input.take();
        if starting {
            state.dispatch(ModeEvent::StartPressed, services);
            // The Enter that started the game doesn't also shoot
            tick_input.shoot = false;
        }

        tick(state, &tick_input, dt, services);
        renderer.draw(&FrameSnapshot::capture(state));
        self.frames += 1;
        dt
    }
}
