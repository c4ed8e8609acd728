//! Player body integration
//!
//! One call per tick in this order: [`PlayerBody::steer`], [`PlayerBody::aim`],
//! [`PlayerBody::try_jump`], [`PlayerBody::integrate`], then platform
//! resolution (see `collision`) and [`PlayerBody::clamp_to_world`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Rect};
use super::stats::PlayerStats;
use crate::consts::*;

/// Result of a jump input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Ground,
    Double,
}

/// The player's box and motion state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub double_jump_used: bool,
    pub facing_right: bool,
    /// Vertical aim in degrees (negative is up)
    pub aim_angle: f32,
    /// Extra rotation in degrees, added to `aim_angle`
    pub gun_rotation: f32,
    /// Ticks of post-penalty flashing left
    pub invulnerable_ticks: u32,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self::spawn()
    }
}

impl PlayerBody {
    pub fn spawn() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            grounded: false,
            double_jump_used: false,
            facing_right: true,
            aim_angle: 0.0,
            gun_rotation: 0.0,
            invulnerable_ticks: 0,
        }
    }

    /// +1 facing right, -1 facing left
    pub fn facing(&self) -> f32 {
        if self.facing_right { 1.0 } else { -1.0 }
    }

    /// Horizontal control. Without input the body coasts under friction.
    pub fn steer(&mut self, move_dir: i8, speed: f32, friction: f32) {
        match move_dir.signum() {
            -1 => {
                self.vel.x = -speed;
                self.facing_right = false;
            }
            1 => {
                self.vel.x = speed;
                self.facing_right = true;
            }
            _ => self.vel.x *= friction,
        }
    }

    /// `aim_dir`: -1 up, +1 down. `rotate_dir`: -1 back, +1 forward, both
    /// relative to the facing direction.
    pub fn aim(&mut self, aim_dir: i8, rotate_dir: i8) {
        if aim_dir != 0 {
            self.aim_angle = (self.aim_angle + AIM_STEP * aim_dir.signum() as f32)
                .clamp(-AIM_LIMIT, AIM_LIMIT);
        }
        if rotate_dir != 0 {
            let step = AIM_STEP * rotate_dir.signum() as f32 * self.facing();
            self.gun_rotation = (self.gun_rotation + step).clamp(-AIM_LIMIT, AIM_LIMIT);
        }
    }

    /// `pressed` is a new press this tick, `held` the key being down. Holding
    /// jumps again on every landing; the double jump needs a fresh press
    /// while airborne, so the ground jump and the double jump never both
    /// fire in one call.
    pub fn try_jump(&mut self, pressed: bool, held: bool, stats: &PlayerStats) -> Option<Jump> {
        if self.grounded && (pressed || held) {
            self.vel.y = stats.jump_velocity;
            self.grounded = false;
            self.double_jump_used = false;
            Some(Jump::Ground)
        } else if pressed && !self.grounded && stats.double_jump && !self.double_jump_used {
            self.vel.y = stats.jump_velocity * DOUBLE_JUMP_FACTOR;
            self.double_jump_used = true;
            Some(Jump::Double)
        } else {
            None
        }
    }

    /// Gravity then position, before any collision
    pub fn integrate(&mut self, gravity: f32) {
        self.vel.y += gravity;
        self.pos += self.vel;
    }

    /// Left wall and the floor of the canvas
    pub fn clamp_to_world(&mut self) {
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = 0.0;
        }
        if self.pos.y > CANVAS_HEIGHT {
            self.pos.y = CANVAS_HEIGHT - self.size.y;
            self.vel.y = 0.0;
            self.grounded = true;
        }
    }

    pub fn tick_invulnerability(&mut self) {
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }

    pub fn start_invulnerability(&mut self) {
        self.invulnerable_ticks = INVULNERABILITY_TICKS;
    }

    /// Hidden on alternating 5-tick windows while invulnerable
    pub fn flash_hidden(&self) -> bool {
        self.invulnerable_ticks > 0 && (self.invulnerable_ticks / 5) % 2 == 1
    }

    /// Firing angle in degrees
    pub fn firing_angle(&self) -> f32 {
        self.aim_angle + self.gun_rotation
    }

    /// Projectile spawn point
    pub fn muzzle(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

impl Aabb for PlayerBody {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}
