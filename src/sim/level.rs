//! World layouts
//!
//! Builds the category-select world and the per-category levels. Platform
//! heights are given as distance above the canvas floor.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::world::{CategoryTile, Classification, Platform, Target, TileKind, World, WorldKind};
use crate::assets::{TargetImage, TargetSet};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::tuning::Tuning;

/// (x, height above floor, width)
type Ledge = (f32, f32, f32);

const MENU_LEDGES: [Ledge; 11] = [
    (200.0, 140.0, 120.0),
    (400.0, 200.0, 100.0),
    (600.0, 170.0, 110.0),
    (800.0, 220.0, 90.0),
    (1000.0, 180.0, 120.0),
    (1200.0, 240.0, 100.0),
    (1400.0, 160.0, 110.0),
    (1600.0, 200.0, 90.0),
    (1800.0, 220.0, 120.0),
    (2000.0, 180.0, 100.0),
    (2200.0, 210.0, 110.0),
];

/// Main route through a level
const PATH_LEDGES: [Ledge; 14] = [
    (250.0, 120.0, 120.0),
    (500.0, 140.0, 100.0),
    (750.0, 120.0, 120.0),
    (1000.0, 170.0, 100.0),
    (1250.0, 140.0, 120.0),
    (1500.0, 120.0, 100.0),
    (1750.0, 200.0, 100.0),
    (2000.0, 140.0, 120.0),
    (2250.0, 120.0, 100.0),
    (2500.0, 220.0, 100.0),
    (2750.0, 140.0, 120.0),
    (3000.0, 120.0, 100.0),
    (3250.0, 170.0, 120.0),
    (3500.0, 120.0, 100.0),
];

/// Optional high ledges off the main route
const SIDE_LEDGES: [Ledge; 6] = [
    (400.0, 220.0, 80.0),
    (900.0, 270.0, 80.0),
    (1400.0, 240.0, 80.0),
    (1900.0, 300.0, 80.0),
    (2400.0, 270.0, 80.0),
    (2900.0, 240.0, 80.0),
];

pub const STORE_TILE_POS: Vec2 = Vec2::new(100.0, 100.0);
/// Horizontal room reserved for a tile when scattering it along a ledge
const TILE_FOOTPRINT: f32 = 80.0;
const TILE_GAP: f32 = 10.0;

/// Fallback targets when a level would otherwise lack a class
pub const EMERGENCY_REAL_POS: Vec2 = Vec2::new(300.0, CANVAS_HEIGHT - 150.0);
pub const EMERGENCY_AI_POS: Vec2 = Vec2::new(500.0, CANVAS_HEIGHT - 150.0);

fn ground(width: f32) -> Platform {
    Platform::new(0.0, CANVAS_HEIGHT - GROUND_HEIGHT, width, GROUND_HEIGHT)
}

fn ledge((x, height, width): Ledge) -> Platform {
    Platform::new(x, CANVAS_HEIGHT - height, width, PLATFORM_THICKNESS)
}

/// Category-select world: ground, ledges, one tile per category and the
/// store tile
pub fn build_menu(
    tuning: &Tuning,
    is_unlocked: impl Fn(&str) -> bool,
    high_scores: &HighScores,
    rng: &mut Pcg32,
) -> World {
    let mut world = World::new(WorldKind::Menu, MENU_WIDTH);
    world.platforms.push(ground(MENU_WIDTH));
    world.platforms.extend(MENU_LEDGES.iter().copied().map(ledge));

    world.tiles.push(CategoryTile::new(
        STORE_TILE_POS,
        TileKind::Store,
        "STORE",
        true,
        0,
    ));

    let last = world.platforms.len() - 1;
    for (index, category) in tuning.categories.iter().enumerate() {
        let platform = world.platforms[index.min(last)];
        let x = platform.pos.x + rng.random::<f32>() * (platform.size.x - TILE_FOOTPRINT);
        let y = platform.pos.y - TILE_HEIGHT - TILE_GAP;
        world.tiles.push(CategoryTile::new(
            Vec2::new(x, y),
            TileKind::Category(category.id.clone()),
            &category.name,
            is_unlocked(&category.id),
            high_scores.best(&category.id),
        ));
    }

    world
}

/// Level world for `category`, populated from `set`
pub fn build_level(category: &str, set: &TargetSet, rng: &mut Pcg32) -> World {
    let mut world = World::new(
        WorldKind::Level {
            category: category.to_string(),
        },
        LEVEL_WIDTH,
    );
    world.platforms.push(ground(LEVEL_WIDTH));
    world.platforms.extend(PATH_LEDGES.iter().copied().map(ledge));
    world.platforms.extend(SIDE_LEDGES.iter().copied().map(ledge));
    world.level_end_x = Some(LEVEL_WIDTH - LEVEL_END_MARGIN);

    place_targets(&mut world, set, rng);
    ensure_both_classes(&mut world);

    log::info!(
        "Level '{}' laid out: {} targets on {} platforms",
        category,
        world.targets.len(),
        world.platforms.len()
    );
    world
}

/// Real images first, then AI images, each on a random platform. A spot
/// is rejected if it's too close to a placed target; after the retry budget
/// the last candidate spot is taken anyway.
pub fn place_targets(world: &mut World, set: &TargetSet, rng: &mut Pcg32) {
    if world.platforms.is_empty() {
        return;
    }
    for classification in [Classification::Real, Classification::Ai] {
        for image in set.list(classification) {
            let pos = find_spot(world, rng);
            let id = world.next_entity_id();
            world
                .targets
                .push(Target::new(id, pos, classification, image.clone()));
        }
    }
}

fn find_spot(world: &World, rng: &mut Pcg32) -> Vec2 {
    let mut candidate = random_spot(&world.platforms, rng);
    for _ in 0..PLACEMENT_ATTEMPTS {
        if !crowded(&world.targets, candidate) {
            return candidate;
        }
        candidate = random_spot(&world.platforms, rng);
    }
    candidate
}

fn random_spot(platforms: &[Platform], rng: &mut Pcg32) -> Vec2 {
    let platform = platforms[rng.random_range(0..platforms.len())];
    Vec2::new(
        platform.pos.x + rng.random::<f32>() * (platform.size.x - TARGET_WIDTH),
        platform.pos.y - TARGET_HEIGHT,
    )
}

fn crowded(targets: &[Target], spot: Vec2) -> bool {
    targets.iter().any(|t| {
        (spot.x - t.pos.x).abs() < PLACEMENT_GAP_X && (spot.y - t.pos.y).abs() < PLACEMENT_GAP_Y
    })
}

/// Guarantee at least one real and one AI target
fn ensure_both_classes(world: &mut World) {
    let has = |world: &World, c: Classification| world.targets.iter().any(|t| t.classification == c);

    if !has(world, Classification::Real) {
        log::warn!("No real targets placed, adding emergency placeholder");
        let id = world.next_entity_id();
        world.targets.push(Target::new(
            id,
            EMERGENCY_REAL_POS,
            Classification::Real,
            TargetImage::placeholder("Emergency", Classification::Real),
        ));
    }
    if !has(world, Classification::Ai) {
        log::warn!("No AI targets placed, adding emergency placeholder");
        let id = world.next_entity_id();
        world.targets.push(Target::new(
            id,
            EMERGENCY_AI_POS,
            Classification::Ai,
            TargetImage::placeholder("Emergency", Classification::Ai),
        ));
    }
}

/// Swap in loaded visuals, matching targets to images by classification
/// in placement order. Count, positions and flags are untouched. Returns
/// how many targets changed.
pub fn apply_visuals(world: &mut World, set: &TargetSet) -> usize {
    let mut swapped = 0;
    for classification in [Classification::Real, Classification::Ai] {
        let images = set.list(classification);
        let targets = world
            .targets
            .iter_mut()
            .filter(|t| t.classification == classification);
        for (target, image) in targets.zip(images) {
            if target.visual != *image {
                target.visual = image.clone();
                swapped += 1;
            }
        }
    }
    swapped
}
