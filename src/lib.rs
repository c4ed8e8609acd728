//! Slop Shooter - shoot the AI fakes, keep the real pictures
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game modes, economy)
//! - `tuning`: Data-driven game balance (categories, weapons, upgrades)
//! - `persistence`: Versioned save data and storage backends
//! - `frame`: Update-then-draw scheduler and input mapping
//! - `platform`: Browser glue (canvas, DOM overlays, asset fetching)

pub mod assets;
pub mod audio;
pub mod error;
pub mod frame;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{AssetError, ShopError, StoreError};
pub use highscores::HighScores;
pub use services::Services;
pub use settings::Settings;
pub use tuning::Tuning;

/// World geometry constants
pub mod consts {
    /// Logical canvas size (world units == CSS pixels)
    pub const CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;

    /// Fallback frame length when no refresh timestamp is available yet (ms)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest wall-clock step the scheduler will feed the sim (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = CANVAS_HEIGHT - 100.0;
    /// Degrees per tick for both aim axes
    pub const AIM_STEP: f32 = 3.0;
    pub const AIM_LIMIT: f32 = 90.0;
    /// Ticks of flashing after a penalty
    pub const INVULNERABILITY_TICKS: u32 = 60;
    /// Double jump impulse relative to the ground jump
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;

    /// Projectile box and kill bounds
    pub const PROJECTILE_SIZE: f32 = 6.0;
    pub const PROJECTILE_MIN_X: f32 = -50.0;
    pub const PROJECTILE_MAX_X: f32 = 3500.0;
    pub const PROJECTILE_MIN_Y: f32 = -50.0;
    pub const PROJECTILE_MAX_Y: f32 = CANVAS_HEIGHT + 50.0;

    /// Image target box
    pub const TARGET_WIDTH: f32 = 200.0;
    pub const TARGET_HEIGHT: f32 = 160.0;
    /// Feedback timers (ticks)
    pub const HIT_FLASH_TICKS: u32 = 30;
    pub const GLOW_TICKS: u32 = 30;
    pub const TEXT_DISPLAY_TICKS: u32 = 60;

    /// Category tile box (menu world)
    pub const TILE_WIDTH: f32 = 120.0;
    pub const TILE_HEIGHT: f32 = 80.0;

    /// World widths
    pub const MENU_WIDTH: f32 = 2500.0;
    pub const LEVEL_WIDTH: f32 = 4000.0;
    /// Level end zone starts this far before the right edge
    pub const LEVEL_END_MARGIN: f32 = 200.0;
    pub const GROUND_HEIGHT: f32 = 50.0;
    pub const PLATFORM_THICKNESS: f32 = 20.0;

    /// Placement retries before a target is dropped in regardless of overlap
    pub const PLACEMENT_ATTEMPTS: u32 = 20;
    pub const PLACEMENT_GAP_X: f32 = 240.0;
    pub const PLACEMENT_GAP_Y: f32 = 200.0;
}

/// Horizontal camera offset that keeps `focus_x` centred, clamped to the world
#[inline]
pub fn camera_offset(focus_x: f32, world_width: f32) -> f32 {
    let max = (world_width - consts::CANVAS_WIDTH).max(0.0);
    (focus_x - consts::CANVAS_WIDTH / 2.0).clamp(0.0, max)
}

/// Unit direction for an angle in degrees (0 = horizontal, positive = down)
#[inline]
pub fn degrees_to_direction(degrees: f32) -> glam::Vec2 {
    let radians = degrees.to_radians();
    glam::Vec2::new(radians.cos(), radians.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_offset_clamps_to_world() {
        assert_eq!(camera_offset(100.0, consts::LEVEL_WIDTH), 0.0);
        assert_eq!(camera_offset(1000.0, consts::LEVEL_WIDTH), 400.0);
        assert_eq!(
            camera_offset(10_000.0, consts::LEVEL_WIDTH),
            consts::LEVEL_WIDTH - consts::CANVAS_WIDTH
        );
    }

    #[test]
    fn test_degrees_to_direction() {
        let right = degrees_to_direction(0.0);
        assert!((right.x - 1.0).abs() < 1e-6 && right.y.abs() < 1e-6);
        let down = degrees_to_direction(90.0);
        assert!(down.x.abs() < 1e-6 && (down.y - 1.0).abs() < 1e-6);
    }
}
