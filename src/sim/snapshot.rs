//! Read-only views for renderers and the HUD
//!
//! Built fresh each frame from a [`GameState`]; nothing here mutates.

use super::body::PlayerBody;
use super::session::{GameMode, LevelSummary};
use super::state::GameState;
use super::stats;
use super::world::World;
use crate::tuning::{UpgradeKey, display_name};

/// Numbers shown in the in-game HUD
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub points: u32,
    pub health: u32,
    pub max_health: u32,
    /// Display name of the current level's category
    pub category: Option<String>,
    pub weapon: String,
    pub remaining_targets: usize,
    pub total_targets: usize,
    /// Real images still loading, placeholders on screen
    pub loading: bool,
}

impl Hud {
    /// 0.0 - 1.0
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameSnapshot<'a> {
    pub mode: GameMode,
    pub camera_x: f32,
    pub world: &'a World,
    /// `None` outside the menu world and levels, or while flashing off
    pub player: Option<&'a PlayerBody>,
    pub hud: Hud,
    pub summary: Option<&'a LevelSummary>,
}

impl<'a> FrameSnapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        let mode = state.session.mode;
        let has_world = matches!(
            mode,
            GameMode::CategorySelect | GameMode::Playing | GameMode::Paused
        );
        let player = (has_world && !state.player.flash_hidden()).then_some(&state.player);

        let hud = Hud {
            score: state.session.score,
            points: state.session.points,
            health: state.session.health,
            max_health: state.session.max_health,
            category: state.world.category().map(|id| {
                state
                    .tuning
                    .category(id)
                    .map_or_else(|| display_name(id), |c| c.name.clone())
            }),
            weapon: state
                .session
                .current_weapon(&state.tuning)
                .map(|w| w.name.clone())
                .unwrap_or_default(),
            remaining_targets: state.world.remaining_targets(),
            total_targets: state.world.targets.len(),
            loading: state.pending_assets.is_some(),
        };

        Self {
            mode,
            camera_x: state.camera_x,
            world: &state.world,
            player,
            hud,
            summary: state.session.last_summary.as_ref(),
        }
    }
}

/// One upgrade row in the shop
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeRow {
    pub key: UpgradeKey,
    pub label: &'static str,
    pub level: u32,
    pub max_level: u32,
    /// `None` at max level
    pub next_cost: Option<u32>,
    pub affordable: bool,
}

/// One weapon row in the shop
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponRow {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    pub selected: bool,
    pub cost: u32,
}

/// One category row in the shop
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    pub high_score: u32,
}

/// Shop contents with prices for the current profile
#[derive(Debug, Clone, PartialEq)]
pub struct ShopView {
    pub points: u32,
    pub upgrades: Vec<UpgradeRow>,
    pub weapons: Vec<WeaponRow>,
    pub categories: Vec<CategoryRow>,
    pub category_cost: u32,
}

impl ShopView {
    pub fn capture(state: &GameState) -> Self {
        let session = &state.session;
        let tuning = &state.tuning;

        let upgrades = UpgradeKey::ALL
            .iter()
            .filter(|key| tuning.upgrade(**key).is_some())
            .map(|&key| {
                let level = session.upgrade_level(key);
                let max_level = tuning.max_level(key);
                let next_cost = if level < max_level {
                    stats::upgrade_cost(tuning, key, level)
                } else {
                    None
                };
                UpgradeRow {
                    key,
                    label: key.label(),
                    level,
                    max_level,
                    next_cost,
                    affordable: next_cost.is_some_and(|c| c <= session.points),
                }
            })
            .collect();

        let weapons = tuning
            .weapons
            .iter()
            .enumerate()
            .map(|(index, w)| WeaponRow {
                index,
                name: w.name.clone(),
                description: w.description.clone(),
                unlocked: session.is_weapon_unlocked(index),
                selected: session.selected_weapon == index,
                cost: tuning.weapon_cost(index),
            })
            .collect();

        let categories = tuning
            .categories
            .iter()
            .map(|c| CategoryRow {
                id: c.id.clone(),
                name: c.name.clone(),
                unlocked: session.is_category_unlocked(&c.id),
                high_score: session.high_scores.best(&c.id),
            })
            .collect();

        Self {
            points: session.points,
            upgrades,
            weapons,
            categories,
            category_cost: tuning.economy.category_cost,
        }
    }
}
