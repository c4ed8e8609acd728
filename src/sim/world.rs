//! Entity registry
//!
//! Everything that lives in the current world (menu or level): static
//! platforms, image targets, category tiles, projectiles and particles.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Rect};
use super::projectile::Projectile;
use crate::assets::TargetImage;
use crate::consts::*;

/// Static platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Platform {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

impl Aabb for Platform {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// What an image target really is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Real,
    Ai,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Real => "REAL",
            Classification::Ai => "AI",
        }
    }
}

/// How a target was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Shot,
    Touch,
}

/// Outcome of a scoring interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Shot an AI image or touched a real one
    Correct,
    /// Shot a real image or touched an AI one
    Wrong,
}

/// An image to shoot or touch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub classification: Classification,
    pub visual: TargetImage,
    /// Set once by a scoring interaction, never cleared
    pub collected: bool,
    pub hit: bool,
    pub hit_ticks: u32,
    pub glow_ticks: u32,
    pub text_ticks: u32,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, classification: Classification, visual: TargetImage) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(TARGET_WIDTH, TARGET_HEIGHT),
            classification,
            visual,
            collected: false,
            hit: false,
            hit_ticks: 0,
            glow_ticks: 0,
            text_ticks: 0,
        }
    }

    /// Apply a shot or touch. Returns `None` once the target is collected.
    ///
    /// Shooting a real image is wrong but leaves it in play; every other
    /// scoring interaction collects the target.
    pub fn resolve(&mut self, channel: Channel) -> Option<Verdict> {
        if self.collected {
            return None;
        }
        match channel {
            Channel::Shot => {
                self.hit = true;
                self.hit_ticks = HIT_FLASH_TICKS;
                match self.classification {
                    Classification::Ai => {
                        self.collect(true);
                        Some(Verdict::Correct)
                    }
                    Classification::Real => Some(Verdict::Wrong),
                }
            }
            Channel::Touch => match self.classification {
                Classification::Real => {
                    self.collect(true);
                    Some(Verdict::Correct)
                }
                Classification::Ai => {
                    self.collect(false);
                    Some(Verdict::Wrong)
                }
            },
        }
    }

    fn collect(&mut self, glow: bool) {
        self.collected = true;
        self.text_ticks = TEXT_DISPLAY_TICKS;
        if glow {
            self.glow_ticks = GLOW_TICKS;
        }
    }

    /// Count down feedback timers
    pub fn update_feedback(&mut self) {
        if self.hit {
            self.hit_ticks = self.hit_ticks.saturating_sub(1);
            if self.hit_ticks == 0 {
                self.hit = false;
            }
        }
        self.glow_ticks = self.glow_ticks.saturating_sub(1);
        self.text_ticks = self.text_ticks.saturating_sub(1);
    }

    /// Reveal text alpha: fades in over the first 20 ticks, out over the last 40
    pub fn text_opacity(&self) -> f32 {
        let t = self.text_ticks as f32;
        let total = TEXT_DISPLAY_TICKS as f32;
        if self.text_ticks == 0 {
            0.0
        } else if t > total - 20.0 {
            ((total - t) / 20.0).min(1.0)
        } else {
            (t / (total - 20.0)).max(0.0)
        }
    }
}

impl Aabb for Target {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// What a menu tile leads to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Category(String),
    Store,
}

/// Result of shooting a menu tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileHit {
    Category(String),
    Store,
    /// Locked category, nothing happens
    Locked,
}

/// Shootable tile in the category-select world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTile {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: TileKind,
    pub name: String,
    pub unlocked: bool,
    pub high_score: u32,
    pub hit: bool,
    pub hit_ticks: u32,
}

impl CategoryTile {
    pub fn new(pos: Vec2, kind: TileKind, name: &str, unlocked: bool, high_score: u32) -> Self {
        Self {
            pos,
            size: Vec2::new(TILE_WIDTH, TILE_HEIGHT),
            kind,
            name: name.to_string(),
            unlocked,
            high_score,
            hit: false,
            hit_ticks: 0,
        }
    }

    pub fn on_hit(&mut self) -> TileHit {
        if !self.unlocked {
            return TileHit::Locked;
        }
        self.hit = true;
        self.hit_ticks = HIT_FLASH_TICKS;
        match &self.kind {
            TileKind::Category(id) => TileHit::Category(id.clone()),
            TileKind::Store => TileHit::Store,
        }
    }

    pub fn update_feedback(&mut self) {
        if self.hit {
            self.hit_ticks = self.hit_ticks.saturating_sub(1);
            if self.hit_ticks == 0 {
                self.hit = false;
            }
        }
    }
}

impl Aabb for CategoryTile {
    fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// Particle draw style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Square,
    /// Frowny face glyph
    Frown,
}

/// Visual-only particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Default spark: random velocity in a 10x10 box, 30 ticks
    pub fn spark(rng: &mut Pcg32, pos: Vec2, color: u32) -> Self {
        Self {
            pos,
            vel: Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)),
            gravity: 0.0,
            life: 30,
            max_life: 30,
            size: rng.random_range(2.0..6.0),
            color,
            kind: ParticleKind::Square,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.vel *= 0.98;
        self.life = self.life.saturating_sub(1);
    }

    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Cap on live particles; oldest are dropped first
pub const MAX_PARTICLES: usize = 512;

pub const GREEN: u32 = 0x2ecc71;
pub const RED: u32 = 0xe74c3c;
const COIN: u32 = 0xfff37a;
const SPARKLE: u32 = 0xa3ff9b;
const FROWN: u32 = 0xff4d4d;
const DROPLET: u32 = 0xff2b2b;

/// Which world is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldKind {
    /// Category select
    Menu,
    Level { category: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub kind: WorldKind,
    pub width: f32,
    pub platforms: Vec<Platform>,
    pub targets: Vec<Target>,
    pub tiles: Vec<CategoryTile>,
    pub projectiles: Vec<Projectile>,
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Player x at which the level completes
    pub level_end_x: Option<f32>,
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldKind::Menu, MENU_WIDTH)
    }
}

impl World {
    pub fn new(kind: WorldKind, width: f32) -> Self {
        Self {
            kind,
            width,
            platforms: Vec::new(),
            targets: Vec::new(),
            tiles: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            level_end_x: None,
            next_id: 1,
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            WorldKind::Level { category } => Some(category),
            WorldKind::Menu => None,
        }
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn remaining_targets(&self) -> usize {
        self.targets.iter().filter(|t| !t.collected).count()
    }

    /// Every target in the level has been collected
    pub fn all_collected(&self) -> bool {
        self.has_targets() && self.remaining_targets() == 0
    }

    pub fn reached_end(&self, player_x: f32) -> bool {
        self.level_end_x.is_some_and(|end| player_x >= end)
    }

    pub fn spawn_projectile(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        self.projectiles.push(projectile);
    }

    /// Drop projectiles flagged inactive this tick
    pub fn sweep_projectiles(&mut self) {
        self.projectiles.retain(|p| p.active);
    }

    pub fn update_particles(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| p.life > 0);
    }

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Ten sparks of one color
    pub fn burst(&mut self, rng: &mut Pcg32, at: Vec2, color: u32) {
        for _ in 0..10 {
            self.push_particle(Particle::spark(rng, at, color));
        }
    }

    /// Gold coins flying up plus a few green sparkles
    pub fn coin_burst(&mut self, rng: &mut Pcg32, at: Vec2) {
        for _ in 0..20 {
            let mut p = Particle::spark(rng, at, COIN);
            p.vel = Vec2::new(rng.random_range(-6.0..6.0), -rng.random_range(8.0..20.0));
            p.size = rng.random_range(4.0..10.0);
            p.life = rng.random_range(55..70);
            p.max_life = p.life;
            self.push_particle(p);
        }
        for _ in 0..8 {
            let mut p = Particle::spark(rng, at, SPARKLE);
            p.vel = Vec2::new(rng.random_range(-5.0..5.0), -rng.random_range(6.0..16.0));
            p.size = rng.random_range(2.0..5.0);
            p.life = 45;
            p.max_life = 45;
            self.push_particle(p);
        }
    }

    /// Frowns and red droplets falling from a wrong pick
    pub fn sad_drip(&mut self, rng: &mut Pcg32, at: Vec2) {
        for _ in 0..14 {
            let origin = at + Vec2::new(rng.random_range(-30.0..30.0), 0.0);
            let mut p = Particle::spark(rng, origin, FROWN);
            p.kind = ParticleKind::Frown;
            p.vel = Vec2::new(rng.random_range(-1.25..1.25), rng.random_range(2.0..6.0));
            p.gravity = 0.35;
            p.size = rng.random_range(3.0..7.0);
            p.life = rng.random_range(60..80);
            p.max_life = p.life;
            self.push_particle(p);
        }
        for _ in 0..10 {
            let origin = at + Vec2::new(rng.random_range(-25.0..25.0), 0.0);
            let mut p = Particle::spark(rng, origin, DROPLET);
            p.vel = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(3.0..8.0));
            p.gravity = 0.4;
            p.size = rng.random_range(2.0..5.0);
            p.life = 50;
            p.max_life = 50;
            self.push_particle(p);
        }
    }

    /// Feedback effects for a scoring interaction at a target
    pub fn celebrate(&mut self, rng: &mut Pcg32, at: Vec2, verdict: Verdict) {
        match verdict {
            Verdict::Correct => {
                self.burst(rng, at, GREEN);
                self.coin_burst(rng, at);
            }
            Verdict::Wrong => {
                self.burst(rng, at, RED);
                self.sad_drip(rng, at);
            }
        }
    }
}
