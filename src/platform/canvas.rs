//! Canvas 2D renderer
//!
//! Draws a [`FrameSnapshot`] in world space translated by the camera, then the
//! screen-space help panel on the category-select world.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::css_color;
use crate::consts::*;
use crate::degrees_to_direction;
use crate::frame::FrameRenderer;
use crate::sim::world::ParticleKind;
use crate::sim::{
    CategoryTile, Classification, FrameSnapshot, GameMode, Particle, PlayerBody, Target, TileKind,
};

const SKY: &str = "#9fdcf5";
const CLOUD: &str = "rgba(255, 255, 255, 0.8)";
const PLATFORM: &str = "#8b4513";
const PLATFORM_TOP: &str = "#a0522d";
const END_ZONE: &str = "rgba(46, 204, 113, 0.3)";
const END_LABEL: &str = "#2ecc71";
const BULLET: &str = "#ffe66d";
const PLAYER: &str = "#ff8c00";
const STEM: &str = "#228b22";
const GUN: &str = "#2c2c2c";

const CLOUDS: [(f64, f64, f64); 8] = [
    (100.0, 80.0, 60.0),
    (400.0, 120.0, 80.0),
    (700.0, 60.0, 70.0),
    (1000.0, 100.0, 90.0),
    (1300.0, 70.0, 65.0),
    (1600.0, 110.0, 75.0),
    (1900.0, 85.0, 85.0),
    (2200.0, 95.0, 70.0),
];

const HELP: [&str; 5] = [
    "AI Slop Shooter",
    "Shoot categories to select them",
    "Arrow keys: Move, Up: Jump",
    "W/S: Aim up/down, A/D: Rotate gun",
    "Space: Shoot, ESC: Pause",
];

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    /// Keyed by url; elements load in the background
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            width: CANVAS_WIDTH as f64,
            height: CANVAS_HEIGHT as f64,
            images: HashMap::new(),
        })
    }

    /// Loaded image for `url`, starting the load on first use
    fn image(&mut self, url: &str) -> Option<HtmlImageElement> {
        if !self.images.contains_key(url) {
            let img = HtmlImageElement::new().ok()?;
            img.set_src(url);
            self.images.insert(url.to_string(), img);
        }
        self.images
            .get(url)
            .filter(|img| img.complete() && img.natural_width() > 0)
            .cloned()
    }

    fn rect(&self, pos: Vec2, size: Vec2, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn text(&self, text: &str, x: f64, y: f64, font: &str, color: &str, align: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align(align);
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn draw_background(&self, world_width: f32) {
        self.ctx.set_fill_style_str(SKY);
        self.ctx.fill_rect(0.0, 0.0, world_width as f64, self.height);

        self.ctx.set_fill_style_str(CLOUD);
        for (x, y, size) in CLOUDS {
            self.ctx.begin_path();
            for (dx, dy, r) in [
                (0.0, 0.0, 0.4),
                (0.3, 0.0, 0.5),
                (0.6, 0.0, 0.4),
                (0.2, -0.2, 0.3),
                (0.5, -0.15, 0.35),
            ] {
                let cx = x + size * dx;
                let cy = y + size * dy;
                self.ctx.move_to(cx + size * r, cy);
                let _ = self
                    .ctx
                    .arc(cx, cy, size * r, 0.0, std::f64::consts::TAU);
            }
            self.ctx.fill();
        }
    }

    /// Gold banner that drifts with the camera
    fn draw_banner(&self, text: &str, camera_x: f32) {
        let x = self.width / 2.0 + camera_x as f64 * 0.6;
        let y = 250.0;
        let font = "bold 48px Arial";
        self.text(text, x + 2.0, y + 2.0, font, "rgba(0, 0, 0, 0.3)", "center");
        self.text(text, x, y, font, "#ffd700", "center");
    }

    fn draw_target(&mut self, target: &Target) {
        let (pos, size) = (target.pos, target.size);
        let drawn = match target.visual.image_url.as_deref() {
            Some(url) => match self.image(url) {
                Some(img) => {
                    let _ = self
                        .ctx
                        .draw_image_with_html_image_element_and_dw_and_dh(
                            &img,
                            pos.x as f64,
                            pos.y as f64,
                            size.x as f64,
                            size.y as f64,
                        );
                    true
                }
                None => false,
            },
            None => false,
        };
        if !drawn {
            self.rect(pos, size, &target.visual.color);
            self.text(
                &target.visual.display_text,
                (pos.x + size.x / 2.0) as f64,
                (pos.y + size.y / 2.0) as f64,
                "12px Arial",
                "#fff",
                "center",
            );
        }

        if target.glow_ticks > 0 {
            self.ctx.set_stroke_style_str(END_LABEL);
            self.ctx.set_line_width(4.0);
            self.ctx
                .stroke_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
        }
        if target.hit {
            self.rect(pos, size, "rgba(255, 255, 255, 0.5)");
        }
        let opacity = target.text_opacity();
        if opacity > 0.0 {
            let color = match target.classification {
                Classification::Real => END_LABEL,
                Classification::Ai => "#e74c3c",
            };
            self.ctx.set_global_alpha(opacity as f64);
            self.text(
                target.classification.label(),
                (pos.x + size.x / 2.0) as f64,
                (pos.y - 10.0) as f64,
                "bold 48px Arial, sans-serif",
                color,
                "center",
            );
            self.ctx.set_global_alpha(1.0);
        } else if target.collected {
            self.rect(pos, size, "rgba(0, 0, 0, 0.4)");
        }
    }

    fn draw_tile(&self, tile: &CategoryTile) {
        let color = match (&tile.kind, tile.unlocked) {
            (TileKind::Store, _) => "#ffe66d",
            (_, false) => "#666",
            (_, true) if tile.high_score > 0 => "#ffe66d",
            (_, true) => "#4ecdc4",
        };
        self.rect(tile.pos, tile.size, color);
        self.ctx
            .set_stroke_style_str(if tile.unlocked { "#2c3e50" } else { "#444" });
        self.ctx.set_line_width(3.0);
        self.ctx.stroke_rect(
            tile.pos.x as f64,
            tile.pos.y as f64,
            tile.size.x as f64,
            tile.size.y as f64,
        );

        let cx = (tile.pos.x + tile.size.x / 2.0) as f64;
        let cy = (tile.pos.y + tile.size.y / 2.0) as f64;
        self.text(&tile.name, cx, cy, "600 20px Verdana, sans-serif", "#fff", "center");
        if !tile.unlocked {
            self.text("LOCKED", cx, cy + 24.0, "20px Arial", "#fff", "center");
        } else if tile.high_score > 0 {
            self.text(
                &format!("Best: {}", tile.high_score),
                cx,
                cy + 22.0,
                "600 14px Verdana, sans-serif",
                "#fff",
                "center",
            );
        }
        if tile.hit {
            self.rect(tile.pos, tile.size, "rgba(255, 255, 255, 0.5)");
        }
    }

    fn draw_particle(&self, particle: &Particle) {
        self.ctx.set_global_alpha(particle.alpha() as f64);
        let color = css_color(particle.color);
        match particle.kind {
            ParticleKind::Square => {
                self.rect(
                    particle.pos - particle.size / 2.0,
                    Vec2::splat(particle.size),
                    &color,
                );
            }
            ParticleKind::Frown => {
                let font = format!("{}px Arial", 18.0 + particle.size * 3.0);
                self.text(
                    ":(",
                    particle.pos.x as f64,
                    particle.pos.y as f64,
                    &font,
                    &color,
                    "center",
                );
            }
        }
        self.ctx.set_global_alpha(1.0);
    }

    fn draw_player(&self, player: &PlayerBody) {
        self.rect(player.pos, player.size, PLAYER);
        self.rect(
            player.pos + Vec2::new(player.size.x / 2.0 - 4.0, -8.0),
            Vec2::new(8.0, 10.0),
            STEM,
        );

        let muzzle = player.muzzle();
        let dir = degrees_to_direction(player.firing_angle());
        let tip = muzzle + Vec2::new(dir.x * player.facing(), dir.y) * 30.0;
        self.ctx.set_stroke_style_str(GUN);
        self.ctx.set_line_width(6.0);
        self.ctx.begin_path();
        self.ctx.move_to(muzzle.x as f64, muzzle.y as f64);
        self.ctx.line_to(tip.x as f64, tip.y as f64);
        self.ctx.stroke();
    }

    fn draw_world(&mut self, frame: &FrameSnapshot<'_>) {
        let world = frame.world;
        self.ctx.save();
        let _ = self.ctx.translate(-frame.camera_x as f64, 0.0);

        self.draw_background(world.width);
        match &frame.hud.category {
            Some(name) => self.draw_banner(&name.to_uppercase(), frame.camera_x),
            None => self.draw_banner("SHOOT THE LEVEL YOU WANT TO PLAY", frame.camera_x),
        }

        for platform in &world.platforms {
            self.rect(platform.pos, platform.size, PLATFORM);
            self.rect(platform.pos, Vec2::new(platform.size.x, 4.0), PLATFORM_TOP);
        }

        if let Some(end_x) = world.level_end_x {
            self.rect(
                Vec2::new(end_x, 0.0),
                Vec2::new(LEVEL_END_MARGIN, CANVAS_HEIGHT),
                END_ZONE,
            );
            self.text(
                "LEVEL END",
                (end_x + LEVEL_END_MARGIN / 2.0) as f64,
                self.height / 2.0,
                "bold 24px Arial",
                END_LABEL,
                "center",
            );
        }

        for target in &world.targets {
            self.draw_target(target);
        }
        for tile in &world.tiles {
            self.draw_tile(tile);
        }
        if let Some(player) = frame.player {
            self.draw_player(player);
        }
        for projectile in &world.projectiles {
            self.rect(projectile.pos, projectile.size, BULLET);
        }
        for particle in &world.particles {
            self.draw_particle(particle);
        }

        self.ctx.restore();
    }

    fn draw_help(&self) {
        self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
        self.ctx.fill_rect(10.0, 10.0, 400.0, 120.0);
        for (i, line) in HELP.iter().enumerate() {
            self.text(line, 20.0, 30.0 + i as f64 * 20.0, "16px Arial", "#fff", "left");
        }
    }
}

impl FrameRenderer for CanvasRenderer {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);

        match frame.mode {
            GameMode::CategorySelect => {
                self.draw_world(frame);
                self.draw_help();
            }
            GameMode::Playing | GameMode::Paused => self.draw_world(frame),
            // DOM overlays cover everything else
            _ => {
                self.ctx.set_fill_style_str(SKY);
                self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
            }
        }
    }
}
