//! Save/load of the persistent economy
//!
//! Features:
//! - Versioned JSON envelope
//! - Sanitising on load (unknown ids dropped, levels clamped)
//! - Pluggable storage: LocalStorage on web, in-memory elsewhere
//!
//! The save is read once at startup and rewritten in full after every
//! economic change. Missing or unreadable saves fall back to a fresh profile.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::highscores::HighScores;
use crate::sim::session::Session;
use crate::tuning::{Tuning, UpgradeKey};

/// Current save format
pub const SAVE_VERSION: u32 = 1;

/// LocalStorage key
pub const SAVE_KEY: &str = "slop_shooter_save";

/// Everything that survives a page reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    pub points: u32,
    pub unlocked_weapons: Vec<usize>,
    pub unlocked_categories: Vec<String>,
    /// Keyed by upgrade id so unknown ids can be skipped instead of failing
    pub upgrades: BTreeMap<String, u32>,
    pub high_scores: HighScores,
    pub selected_weapon: usize,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            points: 0,
            unlocked_weapons: vec![0],
            unlocked_categories: Vec::new(),
            upgrades: BTreeMap::new(),
            high_scores: HighScores::new(),
            selected_weapon: 0,
        }
    }
}

impl SaveData {
    /// Snapshot the persistent part of a session
    pub fn capture(session: &Session) -> Self {
        Self {
            version: SAVE_VERSION,
            points: session.points,
            unlocked_weapons: session.unlocked_weapons.iter().copied().collect(),
            unlocked_categories: session.unlocked_categories.clone(),
            upgrades: session
                .upgrades
                .iter()
                .map(|(key, level)| (key.as_str().to_string(), *level))
                .collect(),
            high_scores: session.high_scores.clone(),
            selected_weapon: session.selected_weapon,
        }
    }

    /// Build a session from this save, repairing anything the current tables
    /// don't allow: unknown weapons, categories and upgrades are dropped,
    /// levels are clamped, and the starter weapon plus default categories
    /// are always owned.
    pub fn restore(&self, tuning: &Tuning) -> Session {
        let mut session = Session::new(tuning);
        session.points = self.points;

        let mut weapons: BTreeSet<usize> = self
            .unlocked_weapons
            .iter()
            .copied()
            .filter(|i| tuning.weapon(*i).is_some())
            .collect();
        weapons.extend(tuning.default_unlocked_weapons());
        session.unlocked_weapons = weapons;

        let mut categories = tuning.default_unlocked_categories();
        for id in &self.unlocked_categories {
            if tuning.category(id).is_some() && !categories.contains(id) {
                categories.push(id.clone());
            }
        }
        session.unlocked_categories = categories;

        for (id, level) in &self.upgrades {
            match UpgradeKey::from_id(id) {
                Some(key) => {
                    let level = (*level).min(tuning.max_level(key));
                    if level > 0 {
                        session.upgrades.insert(key, level);
                    }
                }
                None => log::warn!("Dropping unknown upgrade '{}' from save", id),
            }
        }

        let mut high_scores = self.high_scores.clone();
        high_scores.retain_known(|id| tuning.category(id).is_some());
        session.high_scores = high_scores;

        if session.is_weapon_unlocked(self.selected_weapon) {
            session.selected_weapon = self.selected_weapon;
        }

        session
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let data: SaveData = serde_json::from_str(json)?;
        if data.version > SAVE_VERSION {
            log::warn!(
                "Save version {} is newer than {}, loading what we understand",
                data.version,
                SAVE_VERSION
            );
        }
        Ok(data)
    }
}

/// Storage backend for [`SaveData`]
pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&mut self) -> Result<Option<SaveData>, StoreError>;

    fn save(&mut self, data: &SaveData) -> Result<(), StoreError>;
}

/// In-memory store holding the serialised JSON, for native runs and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub json: Option<String>,
    /// Number of successful saves
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: &str) -> Self {
        Self {
            json: Some(json.to_string()),
            writes: 0,
        }
    }
}

impl SaveStore for MemoryStore {
    fn load(&mut self) -> Result<Option<SaveData>, StoreError> {
        self.json.as_deref().map(SaveData::from_json).transpose()
    }

    fn save(&mut self, data: &SaveData) -> Result<(), StoreError> {
        self.json = Some(data.to_json()?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{SAVE_KEY, SaveData, SaveStore};
    use crate::error::StoreError;

    /// Browser LocalStorage under [`SAVE_KEY`]
    #[derive(Debug, Default)]
    pub struct LocalStorageStore;

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("no LocalStorage".to_string()))
    }

    impl SaveStore for LocalStorageStore {
        fn load(&mut self) -> Result<Option<SaveData>, StoreError> {
            let json = storage()?
                .get_item(SAVE_KEY)
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
            json.as_deref().map(SaveData::from_json).transpose()
        }

        fn save(&mut self, data: &SaveData) -> Result<(), StoreError> {
            let json = data.to_json()?;
            storage()?
                .set_item(SAVE_KEY, &json)
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
        }
    }
}

/// Read the save once at startup. Never fails: problems are logged and a
/// fresh profile is used.
pub fn load_session(store: &mut dyn SaveStore, tuning: &Tuning) -> Session {
    match store.load() {
        Ok(Some(data)) => {
            let session = data.restore(tuning);
            log::info!(
                "Loaded save: {} points, {} categories unlocked",
                session.points,
                session.unlocked_categories.len()
            );
            session
        }
        Ok(None) => {
            log::info!("No save found, starting fresh");
            Session::new(tuning)
        }
        Err(e) => {
            log::warn!("Could not load save ({}), starting fresh", e);
            Session::new(tuning)
        }
    }
}

/// Write the full save. Failures are logged, never propagated into play.
pub fn save_session(store: &mut dyn SaveStore, session: &Session) {
    if let Err(e) = store.save(&SaveData::capture(session)) {
        log::warn!("Saving failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.points = 500;
        session.buy_upgrade(UpgradeKey::Speed, &tuning).unwrap();
        session.buy_upgrade(UpgradeKey::FireRate, &tuning).unwrap();
        session.buy_weapon(3, &tuning).unwrap();
        session.select_weapon(3, &tuning).unwrap();
        session.unlock_category("space", &tuning).unwrap();
        session.high_scores.record("dogs", 45);

        let mut store = MemoryStore::new();
        save_session(&mut store, &session);
        assert_eq!(store.writes, 1);

        let restored = load_session(&mut store, &tuning);
        assert_eq!(restored.points, session.points);
        assert_eq!(restored.unlocked_weapons, session.unlocked_weapons);
        assert_eq!(restored.unlocked_categories, session.unlocked_categories);
        assert_eq!(restored.upgrades, session.upgrades);
        assert_eq!(restored.selected_weapon, 3);
        assert_eq!(restored.high_scores.best("dogs"), 45);
    }

    #[test]
    fn test_missing_save_is_fresh_profile() {
        let tuning = Tuning::default();
        let session = load_session(&mut MemoryStore::new(), &tuning);
        assert_eq!(session.points, 0);
        assert_eq!(session.unlocked_categories.len(), 5);
    }

    #[test]
    fn test_corrupt_save_is_fresh_profile() {
        let tuning = Tuning::default();
        let mut store = MemoryStore::with_json("{\"points\": \"lots\"");
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        let session = load_session(&mut store, &tuning);
        assert_eq!(session.points, 0);
    }

    #[test]
    fn test_restore_sanitizes() {
        let tuning = Tuning::default();
        let json = r#"{
            "version": 1,
            "points": 12,
            "unlocked_weapons": [4, 99],
            "unlocked_categories": ["space", "ghosts", "space"],
            "upgrades": {"speed": 40, "teleport": 2, "shield": 0},
            "high_scores": {"dogs": 10, "ghosts": 70},
            "selected_weapon": 99
        }"#;
        let session = SaveData::from_json(json).unwrap().restore(&tuning);

        assert_eq!(session.unlocked_weapons.iter().copied().collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(session.unlocked_categories.len(), 6);
        assert!(session.is_category_unlocked("dogs"));
        assert!(session.is_category_unlocked("space"));
        assert!(!session.is_category_unlocked("ghosts"));
        assert_eq!(session.upgrade_level(UpgradeKey::Speed), 5);
        assert_eq!(session.upgrades.len(), 1);
        assert_eq!(session.high_scores.best("ghosts"), 0);
        assert_eq!(session.selected_weapon, 0);
    }

    #[test]
    fn test_partial_save_uses_defaults() {
        let tuning = Tuning::default();
        let session = SaveData::from_json(r#"{"points": 3}"#).unwrap().restore(&tuning);
        assert_eq!(session.points, 3);
        assert!(session.is_weapon_unlocked(0));
        assert_eq!(session.unlocked_categories.len(), 5);
    }
}
