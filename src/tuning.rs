//! Game balance tables
//!
//! Categories, weapons, upgrades and the base physics/health/economy numbers.
//! [`Tuning::default`] carries the built-in tables; [`Tuning::from_json`] lets
//! a JSON override replace any subset of them. Missing fields fall back to the
//! defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Purchasable player/weapon upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKey {
    Speed,
    JumpHeight,
    DoubleJump,
    Reachability,
    FireRate,
    Damage,
    BulletSpeed,
    MaxHealth,
    Shield,
}

impl UpgradeKey {
    /// Shop order
    pub const ALL: [UpgradeKey; 9] = [
        UpgradeKey::Speed,
        UpgradeKey::JumpHeight,
        UpgradeKey::DoubleJump,
        UpgradeKey::Reachability,
        UpgradeKey::FireRate,
        UpgradeKey::Damage,
        UpgradeKey::BulletSpeed,
        UpgradeKey::MaxHealth,
        UpgradeKey::Shield,
    ];

    /// Stable id used in save files and DOM data attributes
    pub fn as_str(self) -> &'static str {
        match self {
            UpgradeKey::Speed => "speed",
            UpgradeKey::JumpHeight => "jumpHeight",
            UpgradeKey::DoubleJump => "doubleJump",
            UpgradeKey::Reachability => "reachability",
            UpgradeKey::FireRate => "fireRate",
            UpgradeKey::Damage => "damage",
            UpgradeKey::BulletSpeed => "bulletSpeed",
            UpgradeKey::MaxHealth => "maxHealth",
            UpgradeKey::Shield => "shield",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == id)
    }

    /// Shop label
    pub fn label(self) -> &'static str {
        match self {
            UpgradeKey::Speed => "Speed",
            UpgradeKey::JumpHeight => "Jump Height",
            UpgradeKey::DoubleJump => "Double Jump",
            UpgradeKey::Reachability => "Reachability",
            UpgradeKey::FireRate => "Fire Rate",
            UpgradeKey::Damage => "Damage",
            UpgradeKey::BulletSpeed => "Bullet Speed",
            UpgradeKey::MaxHealth => "Max Health",
            UpgradeKey::Shield => "Shield",
        }
    }
}

/// One image category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    pub name: String,
    /// Unlocked on a fresh save
    pub unlocked: bool,
}

/// Base stats of one weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub id: String,
    pub name: String,
    /// Unlocked on a fresh save
    pub unlocked: bool,
    /// Minimum time between shots (ms)
    pub fire_rate_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    /// Total fan angle in degrees
    pub spread: f32,
    pub bullets: u32,
    /// Platform reflections before a projectile stops bouncing
    pub max_bounces: u32,
    pub description: String,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            unlocked: false,
            fire_rate_ms: 300.0,
            damage: 1.0,
            bullet_speed: 8.0,
            spread: 0.0,
            bullets: 1,
            max_bounces: 0,
            description: String::new(),
        }
    }
}

/// Price and per-level effect of an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Base cost; level `n -> n + 1` costs `cost * (n + 1)`
    pub cost: u32,
    pub max_level: u32,
    /// Signed effect added once per level
    pub effect: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub friction: f32,
    pub player_speed: f32,
    /// Ground jump impulse (negative is up)
    pub jump_force: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            friction: 0.85,
            player_speed: 6.0,
            jump_force: -18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub base_health: u32,
    /// Flat health loss per wrong action
    pub damage_per_error: u32,
    /// Extra max health per target in a level
    pub health_per_target: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            base_health: 6,
            damage_per_error: 2,
            health_per_target: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Score for shooting an AI target
    pub hit_score: u32,
    /// Score for touching a real target
    pub touch_score: u32,
    /// Points for any correct action
    pub points_per_correct: u32,
    /// Weapon `i` costs `weapon_cost_step * (i + 1)`
    pub weapon_cost_step: u32,
    pub category_cost: u32,
    /// Level score strictly above this unlocks a random category
    pub unlock_threshold: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            hit_score: 10,
            touch_score: 5,
            points_per_correct: 1,
            weapon_cost_step: 50,
            category_cost: 100,
            unlock_threshold: 30,
        }
    }
}

/// All balance data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub categories: Vec<CategoryConfig>,
    pub weapons: Vec<WeaponConfig>,
    pub upgrades: BTreeMap<UpgradeKey, UpgradeConfig>,
    pub physics: PhysicsConfig,
    pub health: HealthConfig,
    pub economy: EconomyConfig,
    /// One is picked at random for each level summary
    pub completion_messages: Vec<String>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            weapons: default_weapons(),
            upgrades: default_upgrades(),
            physics: PhysicsConfig::default(),
            health: HealthConfig::default(),
            economy: EconomyConfig::default(),
            completion_messages: COMPLETION_MESSAGES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Tuning {
    /// Parse an override. Empty category or weapon tables are replaced by the
    /// built-in ones so weapon 0 and a playable category always exist.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        if tuning.weapons.is_empty() {
            log::warn!("Tuning override has no weapons, using built-in table");
            tuning.weapons = default_weapons();
        }
        if tuning.categories.is_empty() {
            log::warn!("Tuning override has no categories, using built-in table");
            tuning.categories = default_categories();
        }
        Ok(tuning)
    }

    pub fn category(&self, id: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_index(&self, id: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.id == id)
    }

    pub fn weapon(&self, index: usize) -> Option<&WeaponConfig> {
        self.weapons.get(index)
    }

    pub fn upgrade(&self, key: UpgradeKey) -> Option<&UpgradeConfig> {
        self.upgrades.get(&key)
    }

    /// Max level for `key`, 0 if the table doesn't list it
    pub fn max_level(&self, key: UpgradeKey) -> u32 {
        self.upgrade(key).map_or(0, |u| u.max_level)
    }

    pub fn weapon_cost(&self, index: usize) -> u32 {
        self.economy.weapon_cost_step * (index as u32 + 1)
    }

    /// Weapons owned on a fresh save (weapon 0 always included)
    pub fn default_unlocked_weapons(&self) -> Vec<usize> {
        let mut unlocked: Vec<usize> = self
            .weapons
            .iter()
            .enumerate()
            .filter(|(i, w)| w.unlocked || *i == 0)
            .map(|(i, _)| i)
            .collect();
        unlocked.dedup();
        unlocked
    }

    /// Categories open on a fresh save
    pub fn default_unlocked_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| c.unlocked)
            .map(|c| c.id.clone())
            .collect()
    }
}

const CATEGORIES: [(&str, bool); 15] = [
    ("dogs", true),
    ("cats", true),
    ("cars", true),
    ("food", true),
    ("nature", true),
    ("buildings", false),
    ("people", false),
    ("animals", false),
    ("art", false),
    ("music", false),
    ("fashion", false),
    ("space", false),
    ("fantasy", false),
    ("abstract", false),
    ("minimalist", false),
];

const COMPLETION_MESSAGES: [&str; 10] = [
    "Another AI slop pile defeated!",
    "You're getting good at spotting the fakes!",
    "The machines are learning... but you're learning faster!",
    "AI art has nothing on your aim!",
    "You've identified more fakes than a reverse image search!",
    "The algorithm is crying in binary!",
    "You've become the ultimate AI detector!",
    "Even the chatbots would be impressed!",
    "You've mastered the art of spotting artificial art!",
    "The AI uprising has been postponed indefinitely!",
];

/// "nature" -> "Nature"
pub fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    CATEGORIES
        .iter()
        .map(|(id, unlocked)| CategoryConfig {
            id: id.to_string(),
            name: display_name(id),
            unlocked: *unlocked,
        })
        .collect()
}

fn weapon(
    id: &str,
    name: &str,
    (fire_rate_ms, damage, bullet_speed, spread, bullets): (f32, f32, f32, f32, u32),
    description: &str,
) -> WeaponConfig {
    WeaponConfig {
        id: id.to_string(),
        name: name.to_string(),
        unlocked: id == "pistol",
        fire_rate_ms,
        damage,
        bullet_speed,
        spread,
        bullets,
        // Single-barrel, zero-spread guns ricochet
        max_bounces: if bullets == 1 && spread == 0.0 { 3 } else { 0 },
        description: description.to_string(),
    }
}

fn default_weapons() -> Vec<WeaponConfig> {
    vec![
        weapon("pistol", "Basic Pistol", (300.0, 1.0, 8.0, 0.0, 1), "Standard issue weapon"),
        weapon("spread", "Spread Shot", (500.0, 0.7, 6.0, 15.0, 3), "Fires multiple bullets"),
        weapon("rapid", "Rapid Fire", (100.0, 0.5, 10.0, 5.0, 1), "High fire rate, low damage"),
        weapon("laser", "Laser Beam", (50.0, 2.0, 15.0, 0.0, 1), "Powerful continuous beam"),
        weapon("bounce", "Bouncing Bullets", (400.0, 1.2, 7.0, 0.0, 1), "Bullets ricochet off surfaces"),
        weapon("explosive", "Explosive Rounds", (600.0, 3.0, 5.0, 0.0, 1), "Explodes on impact"),
    ]
}

fn default_upgrades() -> BTreeMap<UpgradeKey, UpgradeConfig> {
    let table = [
        (UpgradeKey::Speed, 17, 5, 0.8),
        (UpgradeKey::JumpHeight, 25, 3, 2.0),
        (UpgradeKey::DoubleJump, 33, 1, 1.0),
        (UpgradeKey::Reachability, 30, 4, 3.0),
        (UpgradeKey::FireRate, 20, 5, -50.0),
        (UpgradeKey::Damage, 27, 5, 0.2),
        (UpgradeKey::BulletSpeed, 13, 5, 1.0),
        (UpgradeKey::MaxHealth, 30, 3, 20.0),
        (UpgradeKey::Shield, 40, 1, 1.0),
    ];
    table
        .into_iter()
        .map(|(key, cost, max_level, effect)| {
            (
                key,
                UpgradeConfig {
                    cost,
                    max_level,
                    effect,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let tuning = Tuning::default();
        assert_eq!(tuning.categories.len(), 15);
        assert_eq!(tuning.default_unlocked_categories().len(), 5);
        assert_eq!(tuning.category("nature").map(|c| c.name.as_str()), Some("Nature"));
        assert_eq!(tuning.weapons.len(), 6);
        assert_eq!(tuning.default_unlocked_weapons(), vec![0]);
        assert_eq!(tuning.upgrades.len(), UpgradeKey::ALL.len());
        assert_eq!(tuning.max_level(UpgradeKey::Reachability), 4);
    }

    #[test]
    fn test_bounce_only_on_single_barrel_weapons() {
        let tuning = Tuning::default();
        let bounces: Vec<u32> = tuning.weapons.iter().map(|w| w.max_bounces).collect();
        // pistol, spread, rapid, laser, bounce, explosive
        assert_eq!(bounces, vec![3, 0, 0, 3, 3, 3]);
    }

    #[test]
    fn test_weapon_cost_steps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.weapon_cost(1), 100);
        assert_eq!(tuning.weapon_cost(5), 300);
    }

    #[test]
    fn test_upgrade_key_ids_round_trip() {
        for key in UpgradeKey::ALL {
            assert_eq!(UpgradeKey::from_id(key.as_str()), Some(key));
        }
        assert_eq!(UpgradeKey::from_id("teleport"), None);
    }

    #[test]
    fn test_from_json_partial_override() {
        let tuning = Tuning::from_json(r#"{"health": {"base_health": 10}, "weapons": []}"#).unwrap();
        assert_eq!(tuning.health.base_health, 10);
        assert_eq!(tuning.health.damage_per_error, 2);
        // Empty weapon table falls back to built-ins
        assert_eq!(tuning.weapons.len(), 6);
        assert_eq!(tuning.categories.len(), 15);
    }

    #[test]
    fn test_from_json_upgrade_keys_are_camel_case() {
        let json = r#"{"upgrades": {"fireRate": {"cost": 1, "max_level": 2, "effect": -10.0}}}"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.upgrades.len(), 1);
        assert_eq!(tuning.upgrade(UpgradeKey::FireRate).map(|u| u.effect), Some(-10.0));
        assert_eq!(tuning.max_level(UpgradeKey::Speed), 0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Tuning::from_json("{not json").is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("minimalist"), "Minimalist");
        assert_eq!(display_name(""), "");
    }
}
