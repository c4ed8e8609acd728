//! Game session: mode state machine plus the economy
//!
//! [`transition`] is the whole mode table. Everything that changes score,
//! points, health or ownership goes through a [`Session`] method so the
//! invariants (health bounds, upgrade caps, no partial purchases) hold in one
//! place.

use std::collections::BTreeSet;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stats::{self, PlayerStats, UpgradeLevels, WeaponStats};
use crate::error::ShopError;
use crate::highscores::HighScores;
use crate::tuning::{Tuning, UpgradeKey, WeaponConfig};

/// Exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    MainMenu,
    CategorySelect,
    Playing,
    Paused,
    LevelComplete,
    LevelFailed,
    UpgradeShop,
}

impl GameMode {
    /// Modes in which the world simulates
    pub fn is_live(self) -> bool {
        matches!(self, GameMode::Playing | GameMode::CategorySelect)
    }
}

/// Inputs to the mode table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeEvent {
    StartPressed,
    ShopPressed,
    /// Unlocked category tile shot in the menu world
    CategoryHit(String),
    StoreHit,
    EscapePressed,
    ResumePressed,
    HealthDepleted,
    /// All targets collected or end zone reached
    LevelCleared,
    MenuPressed,
    RetryPressed,
}

/// Mode table. Pairs not listed leave the mode unchanged.
pub fn transition(mode: GameMode, event: &ModeEvent) -> GameMode {
    use GameMode::*;
    use ModeEvent::*;

    match (mode, event) {
        (MainMenu, StartPressed) => CategorySelect,
        (MainMenu, ShopPressed) => UpgradeShop,
        (CategorySelect, CategoryHit(_)) => Playing,
        (CategorySelect, StoreHit) => UpgradeShop,
        (Playing, EscapePressed) => Paused,
        (Paused, EscapePressed | ResumePressed) => Playing,
        (Playing, HealthDepleted) => LevelFailed,
        (Playing, LevelCleared) => LevelComplete,
        (LevelComplete | LevelFailed | Paused | UpgradeShop, MenuPressed) => MainMenu,
        // These three only follow a level, so there is always a category to retry
        (LevelComplete | LevelFailed | Paused, RetryPressed) => Playing,
        (UpgradeShop, RetryPressed) => MainMenu,
        (mode, _) => mode,
    }
}

/// End-of-level report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub category: String,
    pub score: u32,
    /// `score / 10`, already credited during play
    pub gameplay_points: u32,
    /// `score / 5`, credited on completion
    pub bonus_points: u32,
    pub points_earned: u32,
    pub new_high_score: bool,
    pub unlocked_category: Option<String>,
    pub message: String,
}

/// Mode, per-level numbers and the persistent economy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub mode: GameMode,
    /// Current level only
    pub score: u32,
    /// Persistent currency
    pub points: u32,
    pub health: u32,
    pub max_health: u32,
    /// Category of the level being played (or last played)
    pub category: Option<String>,
    pub upgrades: UpgradeLevels,
    pub unlocked_weapons: BTreeSet<usize>,
    /// Kept in unlock order
    pub unlocked_categories: Vec<String>,
    pub selected_weapon: usize,
    pub high_scores: HighScores,
    pub last_summary: Option<LevelSummary>,
}

impl Session {
    /// Fresh profile
    pub fn new(tuning: &Tuning) -> Self {
        let base = stats::player_stats(tuning, &UpgradeLevels::new()).base_max_health;
        Self {
            mode: GameMode::MainMenu,
            score: 0,
            points: 0,
            health: base,
            max_health: base,
            category: None,
            upgrades: UpgradeLevels::new(),
            unlocked_weapons: tuning.default_unlocked_weapons().into_iter().collect(),
            unlocked_categories: tuning.default_unlocked_categories(),
            selected_weapon: 0,
            high_scores: HighScores::new(),
            last_summary: None,
        }
    }

    pub fn upgrade_level(&self, key: UpgradeKey) -> u32 {
        stats::upgrade_level(&self.upgrades, key)
    }

    pub fn is_category_unlocked(&self, id: &str) -> bool {
        self.unlocked_categories.iter().any(|c| c == id)
    }

    pub fn is_weapon_unlocked(&self, index: usize) -> bool {
        self.unlocked_weapons.contains(&index)
    }

    /// Selected weapon, falling back to weapon 0
    pub fn current_weapon<'a>(&self, tuning: &'a Tuning) -> Option<&'a WeaponConfig> {
        tuning
            .weapon(self.selected_weapon)
            .or_else(|| tuning.weapon(0))
    }

    pub fn weapon_stats(&self, tuning: &Tuning) -> Option<WeaponStats> {
        self.current_weapon(tuning)
            .map(|w| stats::weapon_stats(w, tuning, &self.upgrades))
    }

    pub fn player_stats(&self, tuning: &Tuning) -> PlayerStats {
        stats::player_stats(tuning, &self.upgrades)
    }

    /// Reset per-level numbers for a level with `targets` scoring targets
    pub fn begin_level(&mut self, category: &str, targets: usize, tuning: &Tuning) {
        let base = self.player_stats(tuning).base_max_health;
        self.score = 0;
        self.max_health = stats::level_health(base, targets, tuning.health.health_per_target);
        self.health = self.max_health;
        self.category = Some(category.to_string());
        self.last_summary = None;
    }

    /// Credit a correct action
    pub fn reward(&mut self, score: u32, tuning: &Tuning) {
        self.score += score;
        self.points += tuning.economy.points_per_correct;
    }

    /// Take the flat error damage. Returns true when health hit zero.
    pub fn penalize(&mut self, tuning: &Tuning) -> bool {
        self.health = self.health.saturating_sub(tuning.health.damage_per_error);
        self.health == 0
    }

    /// Unlock a random locked category, if any
    pub fn unlock_random_category(&mut self, tuning: &Tuning, rng: &mut Pcg32) -> Option<String> {
        let locked: Vec<&str> = tuning
            .categories
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| !self.is_category_unlocked(id))
            .collect();
        if locked.is_empty() {
            return None;
        }
        let id = locked[rng.random_range(0..locked.len())].to_string();
        self.unlocked_categories.push(id.clone());
        log::info!("Unlocked bonus category '{}'", id);
        Some(id)
    }

    /// Settle a cleared level: high score, bonus unlock, completion bonus
    pub fn complete_level(&mut self, tuning: &Tuning, rng: &mut Pcg32) -> LevelSummary {
        let category = self.category.clone().unwrap_or_default();
        let new_high_score = self.high_scores.record(&category, self.score);

        let unlocked_category = if self.score > tuning.economy.unlock_threshold {
            self.unlock_random_category(tuning, rng)
        } else {
            None
        };

        let gameplay_points = self.score / 10;
        let bonus_points = self.score / 5;
        self.points += bonus_points;

        let message = if tuning.completion_messages.is_empty() {
            String::new()
        } else {
            let i = rng.random_range(0..tuning.completion_messages.len());
            tuning.completion_messages[i].clone()
        };

        let summary = LevelSummary {
            category,
            score: self.score,
            gameplay_points,
            bonus_points,
            points_earned: gameplay_points + bonus_points,
            new_high_score,
            unlocked_category,
            message,
        };
        self.last_summary = Some(summary.clone());
        summary
    }

    fn spend(&mut self, cost: u32) -> Result<(), ShopError> {
        if self.points < cost {
            return Err(ShopError::InsufficientPoints {
                cost,
                available: self.points,
            });
        }
        self.points -= cost;
        Ok(())
    }

    /// Buy the next level of an upgrade. Returns the new level.
    pub fn buy_upgrade(&mut self, key: UpgradeKey, tuning: &Tuning) -> Result<u32, ShopError> {
        let level = self.upgrade_level(key);
        let max_level = tuning.max_level(key);
        if level >= max_level {
            return Err(ShopError::MaxLevel { key, max_level });
        }
        let cost = stats::upgrade_cost(tuning, key, level)
            .ok_or(ShopError::MaxLevel { key, max_level })?;
        self.spend(cost)?;
        self.upgrades.insert(key, level + 1);
        log::debug!("Bought {} level {} for {}", key.as_str(), level + 1, cost);
        Ok(level + 1)
    }

    pub fn buy_weapon(&mut self, index: usize, tuning: &Tuning) -> Result<(), ShopError> {
        if tuning.weapon(index).is_none() {
            return Err(ShopError::UnknownWeapon { index });
        }
        if self.is_weapon_unlocked(index) {
            return Err(ShopError::AlreadyUnlocked);
        }
        self.spend(tuning.weapon_cost(index))?;
        self.unlocked_weapons.insert(index);
        log::debug!("Bought weapon {}", index);
        Ok(())
    }

    pub fn select_weapon(&mut self, index: usize, tuning: &Tuning) -> Result<(), ShopError> {
        if tuning.weapon(index).is_none() {
            return Err(ShopError::UnknownWeapon { index });
        }
        if !self.is_weapon_unlocked(index) {
            return Err(ShopError::WeaponLocked { index });
        }
        self.selected_weapon = index;
        Ok(())
    }

    pub fn unlock_category(&mut self, id: &str, tuning: &Tuning) -> Result<(), ShopError> {
        if tuning.category(id).is_none() {
            return Err(ShopError::UnknownCategory { id: id.to_string() });
        }
        if self.is_category_unlocked(id) {
            return Err(ShopError::AlreadyUnlocked);
        }
        self.spend(tuning.economy.category_cost)?;
        self.unlocked_categories.push(id.to_string());
        Ok(())
    }

    /// Unlock the first locked category in table order
    pub fn unlock_next_category(&mut self, tuning: &Tuning) -> Result<String, ShopError> {
        let id = tuning
            .categories
            .iter()
            .find(|c| !self.is_category_unlocked(&c.id))
            .map(|c| c.id.clone())
            .ok_or(ShopError::NothingLocked)?;
        self.unlock_category(&id, tuning)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn session_with_points(points: u32) -> (Session, Tuning) {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.points = points;
        (session, tuning)
    }

    #[test]
    fn test_mode_table() {
        use GameMode::*;
        assert_eq!(transition(MainMenu, &ModeEvent::StartPressed), CategorySelect);
        assert_eq!(transition(MainMenu, &ModeEvent::ShopPressed), UpgradeShop);
        assert_eq!(
            transition(CategorySelect, &ModeEvent::CategoryHit("dogs".into())),
            Playing
        );
        assert_eq!(transition(CategorySelect, &ModeEvent::StoreHit), UpgradeShop);
        assert_eq!(transition(Playing, &ModeEvent::EscapePressed), Paused);
        assert_eq!(transition(Paused, &ModeEvent::EscapePressed), Playing);
        assert_eq!(transition(Paused, &ModeEvent::ResumePressed), Playing);
        assert_eq!(transition(Playing, &ModeEvent::HealthDepleted), LevelFailed);
        assert_eq!(transition(Playing, &ModeEvent::LevelCleared), LevelComplete);
        assert_eq!(transition(LevelFailed, &ModeEvent::RetryPressed), Playing);
        assert_eq!(transition(UpgradeShop, &ModeEvent::RetryPressed), MainMenu);
        assert_eq!(transition(UpgradeShop, &ModeEvent::MenuPressed), MainMenu);
    }

    #[test]
    fn test_unlisted_pairs_are_ignored() {
        use GameMode::*;
        assert_eq!(transition(MainMenu, &ModeEvent::EscapePressed), MainMenu);
        assert_eq!(transition(LevelFailed, &ModeEvent::LevelCleared), LevelFailed);
        assert_eq!(transition(Playing, &ModeEvent::StartPressed), Playing);
        assert_eq!(transition(Playing, &ModeEvent::MenuPressed), Playing);
    }

    #[test]
    fn test_three_errors_fail_base_level() {
        let mut tuning = Tuning::default();
        tuning.health.health_per_target = 0;
        let mut session = Session::new(&tuning);
        session.begin_level("dogs", 10, &tuning);
        assert_eq!(session.health, 6);
        assert!(!session.penalize(&tuning));
        assert!(!session.penalize(&tuning));
        assert!(session.penalize(&tuning));
        assert_eq!(session.health, 0);
        // Clamped at zero
        assert!(session.penalize(&tuning));
        assert_eq!(session.health, 0);
    }

    #[test]
    fn test_level_health_includes_target_bonus() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.score = 99;
        session.begin_level("cats", 10, &tuning);
        assert_eq!(session.max_health, 56);
        assert_eq!(session.health, 56);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_buy_upgrade_costs() {
        let (mut session, tuning) = session_with_points(100);
        assert_eq!(session.buy_upgrade(UpgradeKey::Speed, &tuning), Ok(1));
        assert_eq!(session.points, 83);
        assert_eq!(session.buy_upgrade(UpgradeKey::Speed, &tuning), Ok(2));
        assert_eq!(session.points, 49);
    }

    #[test]
    fn test_buy_upgrade_at_max_rejected() {
        let (mut session, tuning) = session_with_points(1000);
        assert_eq!(session.buy_upgrade(UpgradeKey::DoubleJump, &tuning), Ok(1));
        let points = session.points;
        assert_eq!(
            session.buy_upgrade(UpgradeKey::DoubleJump, &tuning),
            Err(ShopError::MaxLevel {
                key: UpgradeKey::DoubleJump,
                max_level: 1
            })
        );
        assert_eq!(session.points, points);
    }

    #[test]
    fn test_insufficient_points_is_noop() {
        let (mut session, tuning) = session_with_points(10);
        assert!(matches!(
            session.buy_upgrade(UpgradeKey::Shield, &tuning),
            Err(ShopError::InsufficientPoints { cost: 40, available: 10 })
        ));
        assert_eq!(session.points, 10);
        assert_eq!(session.upgrade_level(UpgradeKey::Shield), 0);
    }

    #[test]
    fn test_weapon_purchase_and_select() {
        let (mut session, tuning) = session_with_points(150);
        assert_eq!(
            session.select_weapon(2, &tuning),
            Err(ShopError::WeaponLocked { index: 2 })
        );
        assert_eq!(session.buy_weapon(2, &tuning), Ok(()));
        assert_eq!(session.points, 0);
        assert_eq!(session.buy_weapon(2, &tuning), Err(ShopError::AlreadyUnlocked));
        assert_eq!(session.select_weapon(2, &tuning), Ok(()));
        assert_eq!(session.current_weapon(&tuning).map(|w| w.id.as_str()), Some("rapid"));
        assert_eq!(
            session.buy_weapon(42, &tuning),
            Err(ShopError::UnknownWeapon { index: 42 })
        );
    }

    #[test]
    fn test_unlock_next_category_in_table_order() {
        let (mut session, tuning) = session_with_points(250);
        assert_eq!(session.unlock_next_category(&tuning), Ok("buildings".to_string()));
        assert_eq!(session.unlock_next_category(&tuning), Ok("people".to_string()));
        assert!(matches!(
            session.unlock_next_category(&tuning),
            Err(ShopError::InsufficientPoints { .. })
        ));
        assert_eq!(session.points, 50);
    }

    #[test]
    fn test_unlock_category_errors() {
        let (mut session, tuning) = session_with_points(500);
        assert_eq!(
            session.unlock_category("dogs", &tuning),
            Err(ShopError::AlreadyUnlocked)
        );
        assert!(matches!(
            session.unlock_category("ghosts", &tuning),
            Err(ShopError::UnknownCategory { .. })
        ));
        assert_eq!(session.points, 500);
    }

    #[test]
    fn test_complete_level_rewards() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut session = Session::new(&tuning);
        session.begin_level("dogs", 10, &tuning);
        session.score = 35;
        session.points = 7;

        let summary = session.complete_level(&tuning, &mut rng);
        assert_eq!(summary.gameplay_points, 3);
        assert_eq!(summary.bonus_points, 7);
        assert_eq!(summary.points_earned, 10);
        assert_eq!(session.points, 14);
        assert!(summary.new_high_score);
        assert_eq!(session.high_scores.best("dogs"), 35);
        assert!(!summary.message.is_empty());

        let unlocked = summary.unlocked_category.expect("bonus unlock");
        assert!(session.is_category_unlocked(&unlocked));
        assert_eq!(session.unlocked_categories.len(), 6);
    }

    #[test]
    fn test_bonus_unlock_needs_score_above_threshold() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(12);
        let mut session = Session::new(&tuning);
        session.begin_level("dogs", 10, &tuning);
        session.score = 30;
        let summary = session.complete_level(&tuning, &mut rng);
        assert_eq!(summary.unlocked_category, None);
        assert_eq!(session.unlocked_categories.len(), 5);
    }

    #[test]
    fn test_bonus_unlock_noop_when_all_unlocked() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(13);
        let mut session = Session::new(&tuning);
        session.unlocked_categories = tuning.categories.iter().map(|c| c.id.clone()).collect();
        session.begin_level("dogs", 10, &tuning);
        session.score = 80;
        let summary = session.complete_level(&tuning, &mut rng);
        assert_eq!(summary.unlocked_category, None);
        assert_eq!(session.unlocked_categories.len(), 15);
    }

    fn any_key() -> impl Strategy<Value = UpgradeKey> {
        prop::sample::select(UpgradeKey::ALL.to_vec())
    }

    fn any_event() -> impl Strategy<Value = ModeEvent> {
        prop_oneof![
            Just(ModeEvent::StartPressed),
            Just(ModeEvent::ShopPressed),
            Just(ModeEvent::CategoryHit("dogs".into())),
            Just(ModeEvent::StoreHit),
            Just(ModeEvent::EscapePressed),
            Just(ModeEvent::ResumePressed),
            Just(ModeEvent::HealthDepleted),
            Just(ModeEvent::LevelCleared),
            Just(ModeEvent::MenuPressed),
            Just(ModeEvent::RetryPressed),
        ]
    }

    proptest! {
        #[test]
        fn prop_purchases_respect_caps(points in 0u32..2000, keys in prop::collection::vec(any_key(), 0..40)) {
            let (mut session, tuning) = session_with_points(points);
            for key in keys {
                let before_level = session.upgrade_level(key);
                let before_points = session.points;
                match session.buy_upgrade(key, &tuning) {
                    Ok(level) => {
                        let cost = stats::upgrade_cost(&tuning, key, before_level).unwrap();
                        prop_assert_eq!(level, before_level + 1);
                        prop_assert_eq!(session.points, before_points - cost);
                    }
                    Err(_) => {
                        prop_assert_eq!(session.points, before_points);
                        prop_assert_eq!(session.upgrade_level(key), before_level);
                    }
                }
                prop_assert!(session.upgrade_level(key) <= tuning.max_level(key));
            }
        }

        #[test]
        fn prop_health_stays_in_bounds(targets in 0usize..20, errors in 0usize..40) {
            let tuning = Tuning::default();
            let mut session = Session::new(&tuning);
            session.begin_level("dogs", targets, &tuning);
            for _ in 0..errors {
                let dead = session.penalize(&tuning);
                prop_assert!(session.health <= session.max_health);
                prop_assert_eq!(dead, session.health == 0);
            }
        }

        #[test]
        fn prop_level_failed_only_leaves_by_menu_or_retry(events in prop::collection::vec(any_event(), 0..30)) {
            let mut mode = GameMode::LevelFailed;
            for event in &events {
                let next = transition(mode, event);
                if mode == GameMode::LevelFailed && next != mode {
                    prop_assert!(matches!(event, ModeEvent::MenuPressed | ModeEvent::RetryPressed));
                }
                mode = next;
            }
        }
    }
}
