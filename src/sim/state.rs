//! Game state and mode side effects
//!
//! [`GameState`] owns everything the tick mutates. Mode changes go through
//! [`GameState::dispatch`], which applies the pure [`transition`] table and
//! then does the work that comes with entering a mode (building worlds,
//! starting levels, settling rewards).

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::PlayerBody;
use super::level::{apply_visuals, build_level, build_menu};
use super::session::{GameMode, LevelSummary, ModeEvent, Session, transition};
use super::world::World;
use crate::assets::TargetSet;
use crate::audio::SoundEvent;
use crate::error::ShopError;
use crate::persistence::{load_session, save_session};
use crate::services::Services;
use crate::tuning::{Tuning, UpgradeKey};

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub session: Session,
    /// Menu world, level world, or empty outside both
    pub world: World,
    /// Respawned whenever a world is built
    pub player: PlayerBody,
    /// Fire-rate clock (ms)
    pub time_ms: f64,
    /// Simulation tick counter
    pub ticks: u64,
    pub last_shot_ms: Option<f64>,
    pub camera_x: f32,
    /// Category whose images are still loading
    pub pending_assets: Option<String>,
    /// Image sets that finished loading, reused on later visits
    pub loaded_sets: BTreeMap<String, TargetSet>,
}

impl GameState {
    /// Start at the main menu with the stored profile
    pub fn new(seed: u64, tuning: Tuning, services: &mut Services) -> Self {
        let session = load_session(services.store.as_mut(), &tuning);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            session,
            world: World::default(),
            player: PlayerBody::spawn(),
            time_ms: 0.0,
            ticks: 0,
            last_shot_ms: None,
            camera_x: 0.0,
            pending_assets: None,
            loaded_sets: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.session.mode
    }

    /// Apply a mode event. Returns the mode afterwards.
    pub fn dispatch(&mut self, event: ModeEvent, services: &mut Services) -> GameMode {
        let from = self.session.mode;

        if let ModeEvent::CategoryHit(id) = &event {
            if !self.session.is_category_unlocked(id) {
                log::warn!("Ignoring start of locked or unknown category '{}'", id);
                return from;
            }
        }

        let to = transition(from, &event);
        if to == from {
            return from;
        }
        log::info!("Mode {:?} -> {:?} ({:?})", from, to, event);
        self.session.mode = to;

        match (to, &event) {
            (GameMode::CategorySelect, _) => self.enter_menu_world(),
            (GameMode::Playing, ModeEvent::CategoryHit(id)) => {
                let id = id.clone();
                self.start_level(&id, services);
            }
            (GameMode::Playing, ModeEvent::RetryPressed) => match self.session.category.clone() {
                Some(category) => self.start_level(&category, services),
                None => {
                    log::warn!("Retry without a category, back to the main menu");
                    self.session.mode = GameMode::MainMenu;
                    self.clear_world();
                }
            },
            (GameMode::LevelComplete, _) => {
                let summary = self.session.complete_level(&self.tuning, &mut self.rng);
                log::info!(
                    "Level '{}' complete: score {}, {} points earned",
                    summary.category,
                    summary.score,
                    summary.points_earned
                );
                services.play(SoundEvent::LevelComplete);
                self.persist(services);
            }
            (GameMode::LevelFailed, _) => {
                log::info!("Level failed with score {}", self.session.score);
                services.play(SoundEvent::LevelFailed);
            }
            (GameMode::MainMenu, _) => self.clear_world(),
            _ => {}
        }

        self.session.mode
    }

    /// Escape key: pause while playing, resume while paused
    pub fn toggle_pause(&mut self, services: &mut Services) -> GameMode {
        match self.session.mode {
            GameMode::Playing => self.dispatch(ModeEvent::EscapePressed, services),
            GameMode::Paused => self.dispatch(ModeEvent::ResumePressed, services),
            mode => mode,
        }
    }

    /// Pause on focus loss. Only a running level is affected.
    pub fn auto_pause(&mut self, services: &mut Services) {
        if self.session.mode == GameMode::Playing {
            log::info!("Focus lost, pausing");
            self.dispatch(ModeEvent::EscapePressed, services);
        }
    }

    fn enter_menu_world(&mut self) {
        let session = &self.session;
        self.world = build_menu(
            &self.tuning,
            |id| session.is_category_unlocked(id),
            &session.high_scores,
            &mut self.rng,
        );
        self.reset_player();
    }

    fn start_level(&mut self, category: &str, services: &mut Services) {
        let cached = self.loaded_sets.get(category).cloned();
        let set = cached
            .clone()
            .unwrap_or_else(|| TargetSet::builtin(category));

        self.world = build_level(category, &set, &mut self.rng);
        self.reset_player();
        self.session
            .begin_level(category, self.world.targets.len(), &self.tuning);

        if cached.is_none() {
            services.assets.request(category);
            self.pending_assets = Some(category.to_string());
        } else {
            self.pending_assets = None;
        }
    }

    fn clear_world(&mut self) {
        self.world = World::default();
        self.reset_player();
    }

    fn reset_player(&mut self) {
        self.player = PlayerBody::spawn();
        self.last_shot_ms = None;
        self.camera_x = 0.0;
    }

    /// Collect a finished image load and swap it into the running level
    pub fn poll_assets(&mut self, services: &mut Services) {
        let Some(category) = self.pending_assets.clone() else {
            return;
        };
        let Some(result) = services.assets.poll(&category) else {
            return;
        };
        self.pending_assets = None;

        match result {
            Ok(set) if !set.is_empty() => {
                if self.world.category() == Some(category.as_str()) {
                    let swapped = apply_visuals(&mut self.world, &set);
                    log::info!("Images for '{}' loaded, {} targets updated", category, swapped);
                }
                self.loaded_sets.insert(category, set);
            }
            Ok(_) => log::warn!("No images for '{}', keeping placeholders", category),
            Err(e) => log::warn!("{}, keeping placeholders", e),
        }
    }

    /// Write the economy to the store
    pub fn persist(&self, services: &mut Services) {
        save_session(services.store.as_mut(), &self.session);
    }

    pub fn last_summary(&self) -> Option<&LevelSummary> {
        self.session.last_summary.as_ref()
    }

    pub fn buy_upgrade(&mut self, key: UpgradeKey, services: &mut Services) -> Result<u32, ShopError> {
        let level = self.session.buy_upgrade(key, &self.tuning)?;
        self.persist(services);
        Ok(level)
    }

    pub fn buy_weapon(&mut self, index: usize, services: &mut Services) -> Result<(), ShopError> {
        self.session.buy_weapon(index, &self.tuning)?;
        self.persist(services);
        Ok(())
    }

    pub fn select_weapon(&mut self, index: usize, services: &mut Services) -> Result<(), ShopError> {
        self.session.select_weapon(index, &self.tuning)?;
        self.persist(services);
        Ok(())
    }

    pub fn unlock_category(&mut self, id: &str, services: &mut Services) -> Result<(), ShopError> {
        self.session.unlock_category(id, &self.tuning)?;
        self.persist(services);
        Ok(())
    }

    pub fn unlock_next_category(&mut self, services: &mut Services) -> Result<String, ShopError> {
        let id = self.session.unlock_next_category(&self.tuning)?;
        self.persist(services);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetProvider, TargetImage};
    use crate::audio::RecordingAudio;
    use crate::error::AssetError;
    use crate::persistence::{MemoryStore, SaveData, SaveStore};
    use crate::sim::world::{Classification, WorldKind};

    fn fresh() -> (GameState, Services) {
        let mut services = Services::headless();
        let state = GameState::new(42, Tuning::default(), &mut services);
        (state, services)
    }

    /// Resolves every request on the next poll with a fixed set
    struct FixedAssets {
        set: TargetSet,
        pending: Option<String>,
    }

    impl AssetProvider for FixedAssets {
        fn request(&mut self, category: &str) {
            self.pending = Some(category.to_string());
        }

        fn poll(&mut self, category: &str) -> Option<Result<TargetSet, AssetError>> {
            if self.pending.as_deref() == Some(category) {
                self.pending = None;
                Some(Ok(self.set.clone()))
            } else {
                None
            }
        }
    }

    /// Fails every requested load on the next poll
    #[derive(Default)]
    struct FailingAssets {
        pending: Option<String>,
    }

    impl AssetProvider for FailingAssets {
        fn request(&mut self, category: &str) {
            self.pending = Some(category.to_string());
        }

        fn poll(&mut self, category: &str) -> Option<Result<TargetSet, AssetError>> {
            if self.pending.as_deref() == Some(category) {
                self.pending = None;
                Some(Err(AssetError::Fetch {
                    category: category.to_string(),
                    reason: "HTTP 404".into(),
                }))
            } else {
                None
            }
        }
    }

    /// Start a dogs level, poll once, and check the placeholders survived
    fn assert_keeps_placeholders(assets: Box<dyn AssetProvider>) {
        let mut services = Services::headless();
        services.assets = assets;
        let mut state = GameState::new(8, Tuning::default(), &mut services);
        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("dogs".into()), &mut services);
        let before: Vec<String> = state
            .world
            .targets
            .iter()
            .map(|t| t.visual.display_text.clone())
            .collect();

        state.poll_assets(&mut services);
        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.pending_assets, None);
        assert!(state.loaded_sets.is_empty());
        let after: Vec<String> = state
            .world
            .targets
            .iter()
            .map(|t| t.visual.display_text.clone())
            .collect();
        assert_eq!(after.len(), 10);
        assert_eq!(after, before);

        // Nothing was cached, so the next visit asks again
        state.dispatch(ModeEvent::EscapePressed, &mut services);
        state.dispatch(ModeEvent::RetryPressed, &mut services);
        assert_eq!(state.pending_assets.as_deref(), Some("dogs"));
    }

    #[test]
    fn test_failed_load_keeps_placeholders() {
        assert_keeps_placeholders(Box::new(FailingAssets::default()));
    }

    #[test]
    fn test_empty_load_keeps_placeholders() {
        assert_keeps_placeholders(Box::new(FixedAssets {
            set: TargetSet::default(),
            pending: None,
        }));
    }

    #[test]
    fn test_starts_at_main_menu_with_saved_points() {
        let mut services = Services::headless();
        services.store = Box::new(MemoryStore::with_json(r#"{"points": 77}"#));
        let state = GameState::new(1, Tuning::default(), &mut services);
        assert_eq!(state.mode(), GameMode::MainMenu);
        assert_eq!(state.session.points, 77);
    }

    #[test]
    fn test_start_builds_menu_world() {
        let (mut state, mut services) = fresh();
        state.dispatch(ModeEvent::StartPressed, &mut services);
        assert_eq!(state.mode(), GameMode::CategorySelect);
        assert_eq!(state.world.kind, WorldKind::Menu);
        assert_eq!(state.world.tiles.len(), 16);
    }

    #[test]
    fn test_category_hit_starts_level() {
        let (mut state, mut services) = fresh();
        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("cats".into()), &mut services);

        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.world.category(), Some("cats"));
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.max_health, 6 + 10 * 5);
        assert_eq!(state.pending_assets.as_deref(), Some("cats"));
    }

    #[test]
    fn test_locked_category_is_ignored() {
        let (mut state, mut services) = fresh();
        state.dispatch(ModeEvent::StartPressed, &mut services);
        let mode = state.dispatch(ModeEvent::CategoryHit("space".into()), &mut services);
        assert_eq!(mode, GameMode::CategorySelect);
        assert_eq!(state.world.kind, WorldKind::Menu);
    }

    #[test]
    fn test_retry_rebuilds_same_category() {
        let (mut state, mut services) = fresh();
        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("food".into()), &mut services);
        state.session.score = 20;
        state.dispatch(ModeEvent::HealthDepleted, &mut services);
        assert_eq!(state.mode(), GameMode::LevelFailed);

        state.dispatch(ModeEvent::RetryPressed, &mut services);
        assert_eq!(state.mode(), GameMode::Playing);
        assert_eq!(state.world.category(), Some("food"));
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.health, state.session.max_health);
    }

    #[test]
    fn test_completion_settles_and_saves() {
        let recorder = RecordingAudio::new();
        let mut services = Services::headless();
        services.audio = Box::new(recorder.clone());
        let mut state = GameState::new(5, Tuning::default(), &mut services);

        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("dogs".into()), &mut services);
        state.session.score = 20;
        state.dispatch(ModeEvent::LevelCleared, &mut services);

        assert_eq!(state.mode(), GameMode::LevelComplete);
        let summary = state.last_summary().expect("summary");
        assert_eq!(summary.bonus_points, 4);
        assert_eq!(recorder.count(SoundEvent::LevelComplete), 1);

        let saved = services.store.load().unwrap().expect("saved");
        assert_eq!(saved.points, 4);
        assert_eq!(saved.high_scores.best("dogs"), 20);
    }

    #[test]
    fn test_menu_clears_world() {
        let (mut state, mut services) = fresh();
        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("dogs".into()), &mut services);
        state.dispatch(ModeEvent::EscapePressed, &mut services);
        state.dispatch(ModeEvent::MenuPressed, &mut services);
        assert_eq!(state.mode(), GameMode::MainMenu);
        assert!(state.world.targets.is_empty());
        assert!(state.world.platforms.is_empty());
    }

    #[test]
    fn test_auto_pause_only_when_playing() {
        let (mut state, mut services) = fresh();
        state.auto_pause(&mut services);
        assert_eq!(state.mode(), GameMode::MainMenu);

        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("dogs".into()), &mut services);
        state.auto_pause(&mut services);
        assert_eq!(state.mode(), GameMode::Paused);
        state.toggle_pause(&mut services);
        assert_eq!(state.mode(), GameMode::Playing);
    }

    #[test]
    fn test_hot_swap_keeps_layout() {
        let loaded = TargetSet {
            real: vec![TargetImage::with_url("pup", "images/dogs/real/pup.jpg", Classification::Real)],
            ai: vec![TargetImage::with_url("blob", "images/dogs/ai/blob.png", Classification::Ai)],
        };
        let mut services = Services::headless();
        services.assets = Box::new(FixedAssets {
            set: loaded,
            pending: None,
        });
        let mut state = GameState::new(8, Tuning::default(), &mut services);
        state.dispatch(ModeEvent::StartPressed, &mut services);
        state.dispatch(ModeEvent::CategoryHit("dogs".into()), &mut services);
        let count = state.world.targets.len();

        state.poll_assets(&mut services);
        assert_eq!(state.pending_assets, None);
        assert_eq!(state.world.targets.len(), count);
        assert_eq!(state.world.targets[0].visual.display_text, "pup");
        assert!(state.loaded_sets.contains_key("dogs"));

        // Second visit uses the cached set straight away
        state.dispatch(ModeEvent::EscapePressed, &mut services);
        state.dispatch(ModeEvent::RetryPressed, &mut services);
        assert_eq!(state.pending_assets, None);
        assert_eq!(state.world.targets.len(), 2);
    }

    #[test]
    fn test_shop_actions_persist() {
        let mut services = Services::headless();
        services.store = Box::new(MemoryStore::with_json(r#"{"points": 200}"#));
        let mut state = GameState::new(3, Tuning::default(), &mut services);

        assert_eq!(state.buy_upgrade(UpgradeKey::Speed, &mut services), Ok(1));
        assert_eq!(state.buy_weapon(1, &mut services), Ok(()));
        assert_eq!(state.select_weapon(1, &mut services), Ok(()));

        let saved: SaveData = services.store.load().unwrap().expect("saved");
        assert_eq!(saved.points, 200 - 17 - 100);
        assert_eq!(saved.selected_weapon, 1);
        assert_eq!(saved.upgrades.get("speed"), Some(&1));
    }

    #[test]
    fn test_failed_purchase_writes_nothing() {
        let mut store = MemoryStore::new();
        store.save(&SaveData::default()).unwrap();
        let mut services = Services::headless();
        services.store = Box::new(store);
        let mut state = GameState::new(3, Tuning::default(), &mut services);

        assert!(state.buy_upgrade(UpgradeKey::Speed, &mut services).is_err());
        assert!(state.unlock_next_category(&mut services).is_err());
        assert_eq!(services.store.load().unwrap(), Some(SaveData::default()));
    }
}
