//! Per-frame simulation tick
//!
//! Fixed order: pause toggle, image hot-swap, player body, shooting,
//! projectile motion, projectile hits, body touches, feedback timers,
//! fail/complete check, projectile cleanup, particles.

use super::aabb::{Aabb, overlaps};
use super::collision::{bounce_projectile, resolve_player};
use super::projectile::{Projectile, fan_angles};
use super::session::{GameMode, ModeEvent};
use super::state::GameState;
use super::world::{Channel, TileHit, Verdict};
use crate::audio::SoundEvent;
use crate::consts::MAX_FRAME_MS;
use crate::services::Services;
use crate::camera_offset;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// -1 left, +1 right
    pub move_dir: i8,
    /// Jump pressed this frame (edge)
    pub jump: bool,
    /// Jump key down. Re-jumps on landing, never double jumps.
    pub jump_held: bool,
    /// -1 aim up, +1 aim down
    pub aim_dir: i8,
    /// -1 rotate back, +1 rotate forward
    pub rotate_dir: i8,
    /// Fire pressed; still gated by the weapon's fire rate
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by one tick. `dt_ms` only drives the fire-rate clock.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64, services: &mut Services) {
    // Pausing ends the tick; resuming runs it
    if input.pause && state.toggle_pause(services) == GameMode::Paused {
        return;
    }

    // Loads land even while paused or in an overlay
    state.poll_assets(services);

    if !state.session.mode.is_live() {
        return;
    }

    state.ticks += 1;
    state.time_ms += dt_ms.clamp(0.0, MAX_FRAME_MS);

    step_player(state, input, services);

    if input.shoot {
        fire(state, services);
    }

    move_projectiles(state);

    match state.session.mode {
        GameMode::CategorySelect => {
            menu_hits(state, services);
            for tile in &mut state.world.tiles {
                tile.update_feedback();
            }
        }
        GameMode::Playing => level_step(state, services),
        _ => {}
    }

    state.world.sweep_projectiles();
    state.world.update_particles();
}

fn step_player(state: &mut GameState, input: &TickInput, services: &mut Services) {
    let stats = state.session.player_stats(&state.tuning);
    let physics = state.tuning.physics;
    let player = &mut state.player;

    player.steer(input.move_dir, stats.speed, physics.friction);
    player.aim(input.aim_dir, input.rotate_dir);
    if player.try_jump(input.jump, input.jump_held, &stats).is_some() {
        services.play(SoundEvent::Jump);
    }
    player.integrate(physics.gravity);
    resolve_player(player, &state.world.platforms);
    player.clamp_to_world();
    player.tick_invulnerability();

    state.camera_x = camera_offset(player.pos.x, state.world.width);
}

/// One trigger pull if the weapon is ready
fn fire(state: &mut GameState, services: &mut Services) {
    let Some(weapon) = state.session.weapon_stats(&state.tuning) else {
        return;
    };
    if let Some(last) = state.last_shot_ms {
        if state.time_ms - last < weapon.fire_rate_ms as f64 {
            return;
        }
    }
    state.last_shot_ms = Some(state.time_ms);

    let origin = state.player.muzzle();
    let facing = state.player.facing();
    for angle in fan_angles(state.player.firing_angle(), weapon.spread, weapon.bullets) {
        state
            .world
            .spawn_projectile(Projectile::new(0, origin, angle, facing, &weapon));
    }
    services.play(SoundEvent::Shoot);
}

fn move_projectiles(state: &mut GameState) {
    let world = &mut state.world;
    for projectile in world.projectiles.iter_mut().filter(|p| p.active) {
        projectile.integrate();
        bounce_projectile(projectile, &world.platforms);
        if projectile.out_of_bounds() {
            projectile.active = false;
        }
    }
}

/// Projectiles against category and store tiles. Any tile consumes the
/// projectile; the first unlocked hit picks the next mode.
fn menu_hits(state: &mut GameState, services: &mut Services) {
    let mut event = None;
    let world = &mut state.world;

    for projectile in world.projectiles.iter_mut().filter(|p| p.active) {
        let Some(tile) = world.tiles.iter_mut().find(|t| overlaps(&*projectile, &**t)) else {
            continue;
        };
        projectile.active = false;
        match tile.on_hit() {
            TileHit::Category(id) => {
                event.get_or_insert(ModeEvent::CategoryHit(id));
            }
            TileHit::Store => {
                event.get_or_insert(ModeEvent::StoreHit);
            }
            TileHit::Locked => log::debug!("Shot a locked tile: {}", tile.name),
        }
    }

    if let Some(event) = event {
        state.dispatch(event, services);
    }
}

fn level_step(state: &mut GameState, services: &mut Services) {
    // Projectile hits, first target only
    for i in 0..state.world.projectiles.len() {
        if !state.world.projectiles[i].active {
            continue;
        }
        let projectile = &state.world.projectiles[i];
        let hit = state
            .world
            .targets
            .iter()
            .position(|t| !t.collected && overlaps(projectile, t));
        if let Some(index) = hit {
            state.world.projectiles[i].active = false;
            interact(state, index, Channel::Shot, services);
        }
    }

    // Body touches
    for index in 0..state.world.targets.len() {
        let target = &state.world.targets[index];
        if !target.collected && overlaps(&state.player, target) {
            interact(state, index, Channel::Touch, services);
        }
    }

    for target in &mut state.world.targets {
        target.update_feedback();
    }

    // A failed tick can't also complete
    if state.session.health == 0 {
        state.dispatch(ModeEvent::HealthDepleted, services);
    } else if state.world.all_collected() || state.world.reached_end(state.player.pos.x) {
        state.dispatch(ModeEvent::LevelCleared, services);
    }
}

/// Resolve one scoring interaction and apply its economy, sound and effects
fn interact(state: &mut GameState, index: usize, channel: Channel, services: &mut Services) {
    let target = &mut state.world.targets[index];
    let Some(verdict) = target.resolve(channel) else {
        return;
    };
    let at = target.bounds().center();
    log::debug!(
        "{:?} {:?} target {} -> {:?}",
        channel,
        target.classification,
        target.id,
        verdict
    );

    match verdict {
        Verdict::Correct => {
            let score = match channel {
                Channel::Shot => state.tuning.economy.hit_score,
                Channel::Touch => state.tuning.economy.touch_score,
            };
            state.session.reward(score, &state.tuning);
            services.play(SoundEvent::Correct);
            state.persist(services);
        }
        Verdict::Wrong => {
            state.session.penalize(&state.tuning);
            state.player.start_invulnerability();
            services.play(SoundEvent::Incorrect);
        }
    }

    state.world.celebrate(&mut state.rng, at, verdict);
}
