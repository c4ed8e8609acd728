//! Effective stats from base config plus upgrade levels
//!
//! Pure functions, recomputed on every query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tuning::{Tuning, UpgradeKey, WeaponConfig};

/// Upgrade key -> purchased level
pub type UpgradeLevels = BTreeMap<UpgradeKey, u32>;

/// Fastest any weapon may fire (ms between shots)
pub const MIN_FIRE_RATE_MS: f32 = 50.0;

/// Resolved weapon numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub fire_rate_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    pub spread: f32,
    pub bullets: u32,
    pub max_bounces: u32,
}

/// Resolved player numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub speed: f32,
    /// Ground jump velocity (negative is up)
    pub jump_velocity: f32,
    pub double_jump: bool,
    /// Max health before the per-target level bonus
    pub base_max_health: u32,
    pub shield: bool,
}

pub fn upgrade_level(levels: &UpgradeLevels, key: UpgradeKey) -> u32 {
    levels.get(&key).copied().unwrap_or(0)
}

/// Total signed effect of `key` at its current level
pub fn upgrade_bonus(tuning: &Tuning, levels: &UpgradeLevels, key: UpgradeKey) -> f32 {
    tuning
        .upgrade(key)
        .map_or(0.0, |u| u.effect * upgrade_level(levels, key) as f32)
}

pub fn weapon_stats(weapon: &WeaponConfig, tuning: &Tuning, levels: &UpgradeLevels) -> WeaponStats {
    WeaponStats {
        fire_rate_ms: (weapon.fire_rate_ms + upgrade_bonus(tuning, levels, UpgradeKey::FireRate))
            .max(MIN_FIRE_RATE_MS),
        damage: weapon.damage + upgrade_bonus(tuning, levels, UpgradeKey::Damage),
        bullet_speed: weapon.bullet_speed + upgrade_bonus(tuning, levels, UpgradeKey::BulletSpeed),
        spread: weapon.spread,
        bullets: weapon.bullets.max(1),
        max_bounces: weapon.max_bounces,
    }
}

pub fn player_stats(tuning: &Tuning, levels: &UpgradeLevels) -> PlayerStats {
    let physics = &tuning.physics;
    let health_bonus = upgrade_bonus(tuning, levels, UpgradeKey::MaxHealth).max(0.0);
    PlayerStats {
        speed: physics.player_speed + upgrade_bonus(tuning, levels, UpgradeKey::Speed),
        jump_velocity: physics.jump_force
            - upgrade_bonus(tuning, levels, UpgradeKey::JumpHeight)
            - upgrade_bonus(tuning, levels, UpgradeKey::Reachability),
        double_jump: upgrade_level(levels, UpgradeKey::DoubleJump) > 0,
        base_max_health: tuning.health.base_health + health_bonus.round() as u32,
        shield: upgrade_level(levels, UpgradeKey::Shield) > 0,
    }
}

/// Max health for a level with `targets` scoring targets
pub fn level_health(base_max_health: u32, targets: usize, health_per_target: u32) -> u32 {
    base_max_health.max(base_max_health + targets as u32 * health_per_target)
}

/// Price of the next level of `key`, `None` when the table doesn't list it
pub fn upgrade_cost(tuning: &Tuning, key: UpgradeKey, current_level: u32) -> Option<u32> {
    tuning.upgrade(key).map(|u| u.cost * (current_level + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn levels(pairs: &[(UpgradeKey, u32)]) -> UpgradeLevels {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_fire_rate_upgrade_reduces_delay() {
        let tuning = Tuning::default();
        let pistol = &tuning.weapons[0];
        let stats = weapon_stats(pistol, &tuning, &levels(&[(UpgradeKey::FireRate, 2)]));
        assert_eq!(stats.fire_rate_ms, 200.0);
    }

    #[test]
    fn test_fire_rate_floor() {
        let tuning = Tuning::default();
        let laser = &tuning.weapons[3];
        let stats = weapon_stats(laser, &tuning, &levels(&[(UpgradeKey::FireRate, 5)]));
        assert_eq!(stats.fire_rate_ms, MIN_FIRE_RATE_MS);
    }

    #[test]
    fn test_damage_and_bullet_speed_are_additive() {
        let tuning = Tuning::default();
        let pistol = &tuning.weapons[0];
        let stats = weapon_stats(
            pistol,
            &tuning,
            &levels(&[(UpgradeKey::Damage, 5), (UpgradeKey::BulletSpeed, 3)]),
        );
        assert!((stats.damage - 2.0).abs() < 1e-5);
        assert_eq!(stats.bullet_speed, 11.0);
    }

    #[test]
    fn test_base_player_stats() {
        let tuning = Tuning::default();
        let stats = player_stats(&tuning, &UpgradeLevels::new());
        assert_eq!(stats.speed, 6.0);
        assert_eq!(stats.jump_velocity, -18.0);
        assert!(!stats.double_jump);
        assert_eq!(stats.base_max_health, 6);
        assert!(!stats.shield);
    }

    #[test]
    fn test_upgraded_player_stats() {
        let tuning = Tuning::default();
        let stats = player_stats(
            &tuning,
            &levels(&[
                (UpgradeKey::Speed, 5),
                (UpgradeKey::JumpHeight, 3),
                (UpgradeKey::Reachability, 4),
                (UpgradeKey::DoubleJump, 1),
                (UpgradeKey::MaxHealth, 2),
                (UpgradeKey::Shield, 1),
            ]),
        );
        assert!((stats.speed - 10.0).abs() < 1e-5);
        assert_eq!(stats.jump_velocity, -18.0 - 6.0 - 12.0);
        assert!(stats.double_jump);
        assert_eq!(stats.base_max_health, 46);
        assert!(stats.shield);
    }

    #[test]
    fn test_level_health() {
        assert_eq!(level_health(6, 10, 5), 56);
        assert_eq!(level_health(6, 0, 5), 6);
        assert_eq!(level_health(6, 10, 0), 6);
    }

    #[test]
    fn test_upgrade_cost_scales_with_level() {
        let tuning = Tuning::default();
        assert_eq!(upgrade_cost(&tuning, UpgradeKey::Speed, 0), Some(17));
        assert_eq!(upgrade_cost(&tuning, UpgradeKey::Speed, 2), Some(51));
    }

    proptest! {
        #[test]
        fn prop_fire_rate_never_below_floor(weapon in 0usize..6, level in 0u32..20) {
            let tuning = Tuning::default();
            let stats = weapon_stats(
                &tuning.weapons[weapon],
                &tuning,
                &levels(&[(UpgradeKey::FireRate, level)]),
            );
            prop_assert!(stats.fire_rate_ms >= MIN_FIRE_RATE_MS);
        }

        #[test]
        fn prop_jump_only_gets_stronger(jump in 0u32..4, reach in 0u32..5) {
            let tuning = Tuning::default();
            let stats = player_stats(
                &tuning,
                &levels(&[(UpgradeKey::JumpHeight, jump), (UpgradeKey::Reachability, reach)]),
            );
            prop_assert!(stats.jump_velocity <= tuning.physics.jump_force);
        }
    }
}
