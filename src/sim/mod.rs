//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete physics step per tick
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids assigned on spawn)
//! - No rendering or platform dependencies; storage, sound and images are
//!   reached through [`crate::services::Services`]

pub mod aabb;
pub mod body;
pub mod collision;
pub mod level;
pub mod projectile;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod tick;
pub mod world;

pub use aabb::{Aabb, Rect, overlaps};
pub use body::{Jump, PlayerBody};
pub use collision::{Side, bounce_projectile, resolve_player};
pub use projectile::{Projectile, fan_angles};
pub use session::{GameMode, LevelSummary, ModeEvent, Session, transition};
pub use snapshot::{FrameSnapshot, Hud, ShopView};
pub use state::GameState;
pub use stats::{PlayerStats, WeaponStats};
pub use tick::{TickInput, tick};
pub use world::{
    CategoryTile, Channel, Classification, Particle, Platform, Target, TileHit, TileKind, Verdict,
    World, WorldKind,
};
