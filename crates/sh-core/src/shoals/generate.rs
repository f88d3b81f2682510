//! Shoals level layout
//!
//! A Shoals level starts as a flat sea floor just under shallow water.
//! Islands and cliff ridges are stamped onto the height field, the result is
//! smoothed and classified into terrain, and the water away from the shore
//! is pushed deeper so the tide only ever exposes the coastline.

use crate::dungeon::{Coord, Feature, HeightField, IslandPlan, Level, rectangle};
use crate::rng::{GameRng, IntRange, RngStream, RngStreams};
use crate::{GXM, GYM};

use super::terrain::{SHT_SHALLOW_WATER, feature_by_height};

/// Distance islands keep from the map edge
pub const SHOALS_MARGIN: i32 = 6;
/// Height lost by the two cells inside each map edge
const EDGE_DEEPENING: i32 = 800;
/// Height lost per step of distance from the shallows
const DEEPENING_PER_STEP: i32 = 7;

/// Generate the terrain and height field of a Shoals level.
///
/// Returns the island plan; its remaining centres are candidate sites for
/// huts and other set pieces.
///
/// # Panics
/// If the level already has a height field.
pub fn build_shoals_level(level: &mut Level, rngs: &mut RngStreams) -> IslandPlan {
    let mut rng = rngs.scoped(RngStream::LevelGen);
    let depth = level.id.depth - 1;

    level.replace_area(
        Coord::new(0, 0),
        Coord::new(GXM - 1, GYM - 1),
        Feature::RockWall,
        Feature::OpenSea,
    );

    let mut field = HeightField::new(GXM, GYM, SHT_SHALLOW_WATER - 3);
    let mut plan = IslandPlan::default();
    let nislands = (20 - depth * 2).max(0) as usize;
    plan.build(nislands, &mut field, &mut rng);
    build_cliffs(&mut field, &mut rng);
    field.smooth_heights(1, 1);

    apply_level(level, &field);
    deepen_water(level, &mut field);
    deepen_edges(&mut field);
    smooth_water(&mut field);
    level.set_heightmap(field);

    log::info!(
        "built {} with {} islands, heights {}..={}",
        level.id,
        plan.islands.len(),
        level.heightmap.as_ref().map_or(0, HeightField::min_height),
        level.heightmap.as_ref().map_or(0, HeightField::max_height),
    );
    plan
}

/// Take one of the plan's island centres for a set piece
pub fn pick_vault_island(plan: &mut IslandPlan, rng: &mut GameRng) -> Option<Coord> {
    plan.pick_and_remove_random_island(rng)
}

/// A ridge of bumps along a random line
fn build_cliff(field: &mut HeightField, rng: &mut GameRng) {
    let cliffc = field.random_point_in_margin(SHOALS_MARGIN * 2, rng);
    let length = rng.range(6, 15);
    let angle = f64::from(rng.random2(360)).to_radians();
    let n_cliff_points = IntRange::new(40, 60);
    let cliff_point_radius = 3;
    let cliff_height_increment = IntRange::new(100, 130);

    for i in (0..length).step_by(3) {
        let distance = f64::from(i - length / 2);
        let mut place = cliffc
            + Coord::new(
                (distance * angle.cos()) as i32,
                (distance * angle.sin()) as i32,
            );
        place += Coord::new(rng.range(-2, 2), rng.range(-2, 2));
        let n_points = rng.resolve(n_cliff_points);
        field.island_centred_at(
            place,
            n_points,
            cliff_point_radius,
            cliff_height_increment,
            SHOALS_MARGIN,
            false,
            rng,
        );
    }
}

fn build_cliffs(field: &mut HeightField, rng: &mut GameRng) {
    let ncliffs = rng.range_avg(0, 6, 2);
    for _ in 0..ncliffs {
        build_cliff(field, rng);
    }
}

fn apply_level(level: &mut Level, field: &HeightField) {
    for c in rectangle(1) {
        level.set_feat(c, feature_by_height(field[c]));
    }
}

/// Deep water cells with shallow water next to them
fn water_depth_change_points(level: &Level) -> Vec<Coord> {
    rectangle(1)
        .filter(|&c| {
            level.feat(c) == Feature::DeepWater && level.has_adjacent_feat(c, Feature::ShallowWater)
        })
        .collect()
}

/// Lower deep water the further it lies from the shallows
fn deepen_water(level: &Level, field: &mut HeightField) {
    let mut current = water_depth_change_points(level);
    let mut next = Vec::new();
    let mut seen = vec![false; (GXM * GYM) as usize];
    let idx = |c: Coord| (c.y * GXM + c.x) as usize;
    for &c in &current {
        seen[idx(c)] = true;
    }

    let mut distance = 0;
    while !current.is_empty() {
        for &c in &current {
            if distance > 0 {
                field[c] -= distance * DEEPENING_PER_STEP;
            }
            // Orthogonal steps only
            for adj in c.adjacent().filter(|&adj| (adj - c).abs() == 1) {
                if !seen[idx(adj)] && level.feat(adj) == Feature::DeepWater {
                    next.push(adj);
                    seen[idx(adj)] = true;
                }
            }
        }
        current.clear();
        std::mem::swap(&mut current, &mut next);
        distance += 1;
    }
}

/// Water at the screen edge is too deep for any tide to expose
fn deepen_edges(field: &mut HeightField) {
    let edge = 2;
    for y in 1..GYM - 2 {
        for x in 1..=edge {
            field[Coord::new(x, y)] -= EDGE_DEEPENING;
            field[Coord::new(GXM - 1 - x, y)] -= EDGE_DEEPENING;
        }
    }
    for x in 1..GXM - 2 {
        for y in 1..=edge {
            field[Coord::new(x, y)] -= EDGE_DEEPENING;
            field[Coord::new(x, GYM - 1 - y)] -= EDGE_DEEPENING;
        }
    }
}

fn smooth_water(field: &mut HeightField) {
    for c in rectangle(0) {
        field.smooth_height_at(c, 1, Some(SHT_SHALLOW_WATER - 1));
    }
}
