//! Collision response against static platforms
//!
//! Single-axis, minimum-penetration resolution. Fast bodies can tunnel
//! through thin platforms; nothing here sweeps.

use super::aabb::{Aabb, Rect, overlaps};
use super::body::PlayerBody;
use super::projectile::Projectile;
use super::world::Platform;

/// Side of the platform the body is pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Shallowest side of `a` inside `b`. Ties go top, bottom, left, right.
pub fn shallowest_side(a: &Rect, b: &Rect) -> Side {
    let left = a.right() - b.left();
    let right = b.right() - a.left();
    let top = a.bottom() - b.top();
    let bottom = b.bottom() - a.top();
    let min = left.min(right).min(top).min(bottom);

    if min == top {
        Side::Top
    } else if min == bottom {
        Side::Bottom
    } else if min == left {
        Side::Left
    } else {
        Side::Right
    }
}

/// Push the player out of every overlapping platform, in platform order.
/// Returns true if the body landed on something this pass.
pub fn resolve_player(body: &mut PlayerBody, platforms: &[Platform]) -> bool {
    body.grounded = false;

    for platform in platforms {
        if !overlaps(body, platform) {
            continue;
        }
        let b = platform.bounds();
        match shallowest_side(&body.bounds(), &b) {
            Side::Top if body.vel.y > 0.0 => {
                body.pos.y = b.top() - body.size.y;
                body.vel.y = 0.0;
                body.grounded = true;
                body.double_jump_used = false;
            }
            Side::Bottom if body.vel.y < 0.0 => {
                body.pos.y = b.bottom();
                body.vel.y = 0.0;
            }
            Side::Left => {
                body.pos.x = b.left() - body.size.x;
                body.vel.x = 0.0;
            }
            Side::Right => {
                body.pos.x = b.right();
                body.vel.x = 0.0;
            }
            // Top or bottom contact while moving away: leave it
            _ => {}
        }
    }

    body.grounded
}

/// Reflect horizontal velocity once per overlapping platform while bounces
/// remain. Returns the number of reflections this tick.
pub fn bounce_projectile(projectile: &mut Projectile, platforms: &[Platform]) -> u32 {
    let mut reflected = 0;
    for platform in platforms {
        if !projectile.can_bounce() {
            break;
        }
        if overlaps(projectile, platform) {
            projectile.vel.x = -projectile.vel.x;
            projectile.bounces += 1;
            reflected += 1;
        }
    }
    reflected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stats::WeaponStats;
    use glam::Vec2;

    fn ledge() -> Platform {
        Platform::new(0.0, 500.0, 200.0, 20.0)
    }

    #[test]
    fn test_landing_same_tick() {
        let mut body = PlayerBody::spawn();
        body.pos = Vec2::new(50.0, 440.0);
        body.vel = Vec2::new(0.0, 12.0);
        body.integrate(0.8);
        assert!(overlaps(&body, &ledge()));

        let landed = resolve_player(&mut body, &[ledge()]);
        assert!(landed);
        assert!(body.grounded);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.pos.y, 500.0 - body.size.y);
    }

    #[test]
    fn test_landing_resets_double_jump() {
        let mut body = PlayerBody::spawn();
        body.double_jump_used = true;
        body.pos = Vec2::new(50.0, 455.0);
        body.vel = Vec2::new(0.0, 5.0);
        resolve_player(&mut body, &[ledge()]);
        assert!(!body.double_jump_used);
    }

    #[test]
    fn test_head_bump() {
        let mut body = PlayerBody::spawn();
        body.pos = Vec2::new(50.0, 515.0);
        body.vel = Vec2::new(0.0, -10.0);
        resolve_player(&mut body, &[ledge()]);
        assert_eq!(body.pos.y, 520.0);
        assert_eq!(body.vel.y, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_side_push() {
        let wall = Platform::new(300.0, 0.0, 50.0, 800.0);
        let mut body = PlayerBody::spawn();
        body.pos = Vec2::new(265.0, 300.0);
        body.vel = Vec2::new(6.0, 0.0);
        resolve_player(&mut body, &[wall]);
        assert_eq!(body.pos.x, 260.0);
        assert_eq!(body.vel.x, 0.0);

        body.pos = Vec2::new(345.0, 300.0);
        body.vel = Vec2::new(-6.0, 0.0);
        resolve_player(&mut body, &[wall]);
        assert_eq!(body.pos.x, 350.0);
    }

    #[test]
    fn test_grounded_cleared_when_airborne() {
        let mut body = PlayerBody::spawn();
        body.grounded = true;
        body.pos = Vec2::new(50.0, 100.0);
        assert!(!resolve_player(&mut body, &[ledge()]));
        assert!(!body.grounded);
    }

    #[test]
    fn test_tie_prefers_top() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(shallowest_side(&a, &b), Side::Top);
    }

    #[test]
    fn test_bounce_limit() {
        let stats = WeaponStats {
            fire_rate_ms: 400.0,
            damage: 1.2,
            bullet_speed: 7.0,
            spread: 0.0,
            bullets: 1,
            max_bounces: 3,
        };
        let mut p = Projectile::new(1, Vec2::new(10.0, 505.0), 0.0, 1.0, &stats);
        let stacked = [ledge(), ledge(), ledge(), ledge()];
        assert_eq!(bounce_projectile(&mut p, &stacked), 3);
        assert_eq!(p.bounces, 3);
        assert!((p.vel.x + 7.0).abs() < 1e-5);
        // Out of bounces: keeps flying
        assert_eq!(bounce_projectile(&mut p, &stacked), 0);
    }

    #[test]
    fn test_no_bounce_weapon_passes_through() {
        let stats = WeaponStats {
            fire_rate_ms: 500.0,
            damage: 0.7,
            bullet_speed: 6.0,
            spread: 15.0,
            bullets: 3,
            max_bounces: 0,
        };
        let mut p = Projectile::new(1, Vec2::new(10.0, 505.0), 0.0, 1.0, &stats);
        assert_eq!(bounce_projectile(&mut p, &[ledge()]), 0);
        assert!(p.vel.x > 0.0);
    }
}
