//! Projectiles
//!
//! Straight-line movers with no gravity. A projectile is flagged inactive when
//! it leaves the play area or is consumed by a target, and removed from the
//! world at the end of the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Rect};
use super::stats::WeaponStats;
use crate::consts::*;
use crate::degrees_to_direction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    pub bounces: u32,
    pub max_bounces: u32,
    pub active: bool,
}

impl Projectile {
    /// `angle` in degrees, mirrored horizontally by `facing` (+1 / -1)
    pub fn new(id: u32, origin: Vec2, angle: f32, facing: f32, stats: &WeaponStats) -> Self {
        let dir = degrees_to_direction(angle);
        Self {
            id,
            pos: origin,
            vel: Vec2::new(dir.x * facing, dir.y) * stats.bullet_speed,
            size: Vec2::splat(PROJECTILE_SIZE),
            damage: stats.damage,
            bounces: 0,
            max_bounces: stats.max_bounces,
            active: true,
        }
    }

    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    pub fn out_of_bounds(&self) -> bool {
        self.pos.x < PROJECTILE_MIN_X
            || self.pos.x > PROJECTILE_MAX_X
            || self.pos.y < PROJECTILE_MIN_Y
            || self.pos.y > PROJECTILE_MAX_Y
    }

    pub fn can_bounce(&self) -> bool {
        self.bounces < self.max_bounces
    }
}

impl Aabb for Projectile {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// Per-bullet angles for one trigger pull, evenly spread across `spread`
/// degrees centred on `aim`
pub fn fan_angles(aim: f32, spread: f32, bullets: u32) -> Vec<f32> {
    if bullets <= 1 {
        return vec![aim];
    }
    let step = spread / (bullets - 1) as f32;
    let start = aim - spread / 2.0;
    (0..bullets).map(|i| start + step * i as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pistol() -> WeaponStats {
        WeaponStats {
            fire_rate_ms: 300.0,
            damage: 1.0,
            bullet_speed: 8.0,
            spread: 0.0,
            bullets: 1,
            max_bounces: 3,
        }
    }

    #[test]
    fn test_velocity_from_angle_and_facing() {
        let p = Projectile::new(1, Vec2::ZERO, 0.0, -1.0, &pistol());
        assert!((p.vel.x + 8.0).abs() < 1e-5);
        assert!(p.vel.y.abs() < 1e-5);

        // Positive angles aim downward regardless of facing
        let p = Projectile::new(2, Vec2::ZERO, 90.0, -1.0, &pistol());
        assert!((p.vel.y - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_fan_angles() {
        assert_eq!(fan_angles(10.0, 0.0, 1), vec![10.0]);
        assert_eq!(fan_angles(0.0, 15.0, 3), vec![-7.5, 0.0, 7.5]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut p = Projectile::new(1, Vec2::new(3490.0, 100.0), 0.0, 1.0, &pistol());
        assert!(!p.out_of_bounds());
        p.integrate();
        p.integrate();
        assert!(p.out_of_bounds());

        let p = Projectile::new(2, Vec2::new(100.0, -60.0), 0.0, 1.0, &pistol());
        assert!(p.out_of_bounds());
    }
}
