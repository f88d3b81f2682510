//! Raising land bridges between disconnected spots and the nearest floor

use crate::dungeon::{
    Coord, Feature, HeightField, Level, flood_find_nearest, join_the_dots, rectangle_between,
};
use crate::rng::{GameRng, IntRange};

use super::terrain::{SHT_FLOOR, SHT_ROCK, feature_by_height};

/// Mean height a route neighbourhood should reach
pub const CONNECT_TARGET_HEIGHT: i32 = SHT_FLOOR + 10;

const SAMPLE_RADIUS: i32 = 3;
const PATCH_RADIUS: i32 = 2;

fn patch_around(field: &HeightField, p: Coord) -> impl Iterator<Item = Coord> + '_ {
    let r = Coord::new(PATCH_RADIUS, PATCH_RADIUS);
    rectangle_between(p - r, p + r).filter(move |&q| field.in_bounds(q))
}

/// Connect `point` to the nearest floor by raising the land between them.
///
/// Only cells whose feature passes `overwriteable` are redrawn afterwards.
/// Returns false if the level has no height field or no route exists.
pub fn connect_point(
    level: &mut Level,
    point: Coord,
    overwriteable: impl Fn(Feature) -> bool,
    rng: &mut GameRng,
) -> bool {
    if level.heightmap.is_none() {
        return false;
    }
    let Some(target) = flood_find_nearest(level, point, Feature::Floor) else {
        log::debug!("no floor reachable from {point}");
        return false;
    };
    let Some(route) = join_the_dots(level, point, target) else {
        log::debug!("no route from {point} to {target}");
        return false;
    };
    let Some(mut field) = level.heightmap.take() else {
        return false;
    };

    for &p in &route {
        let (total, count) = field.sum_around(p, SAMPLE_RADIUS);
        if count == 0 {
            continue;
        }
        let mean = (total / i64::from(count)) as i32;
        if mean >= CONNECT_TARGET_HEIGHT {
            continue;
        }
        // Bigger gaps get more bumps and taller ones.
        let deficit = CONNECT_TARGET_HEIGHT - mean;
        let n_points = (20 + deficit / 10).min(80);
        let increment = (deficit / 8 + 1).max(1);
        field.island_centred_at(
            p,
            n_points,
            2,
            IntRange::new(increment, increment + 20),
            3,
            false,
            rng,
        );
    }

    for &p in &route {
        let patch: Vec<Coord> = patch_around(&field, p).collect();
        for q in patch {
            field.smooth_height_at(q, 1, None);
        }
    }
    // No new rock or stone along the bridge
    for &p in &route {
        let patch: Vec<Coord> = patch_around(&field, p).collect();
        for q in patch {
            if field[q] >= SHT_ROCK {
                field[q] = SHT_ROCK - 1;
            }
        }
    }
    for &p in &route {
        if field.in_bounds(p) && field[p] < SHT_FLOOR {
            field[p] = SHT_FLOOR;
        }
    }

    for &p in &route {
        for q in patch_around(&field, p) {
            if overwriteable(level.feat(q)) {
                level.set_feat(q, feature_by_height(field[q]));
            }
        }
    }

    log::debug!("connected {point} to {target} over {} cells", route.len());
    level.heightmap = Some(field);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Branch, LevelId, rectangle};

    fn strait_level() -> Level {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 2));
        level.init_heightmap(-60);
        for c in rectangle(1) {
            level.set_feat(c, Feature::DeepWater);
        }
        // Two islands with a deep strait between them
        let field = level.heightmap.as_mut().unwrap();
        for c in rectangle_between(Coord::new(10, 20), Coord::new(14, 24))
            .chain(rectangle_between(Coord::new(30, 20), Coord::new(34, 24)))
        {
            field[c] = 20;
        }
        for c in rectangle_between(Coord::new(10, 20), Coord::new(14, 24))
            .chain(rectangle_between(Coord::new(30, 20), Coord::new(34, 24)))
        {
            level.set_feat(c, Feature::Floor);
        }
        level
    }

    fn overwriteable(feat: Feature) -> bool {
        matches!(
            feat,
            Feature::Floor | Feature::ShallowWater | Feature::DeepWater
        )
    }

    #[test]
    fn test_route_becomes_floor() {
        let mut level = strait_level();
        let mut rng = GameRng::new(8);
        let start = Coord::new(22, 22);
        let target = flood_find_nearest(&level, start, Feature::Floor).unwrap();
        let route = join_the_dots(&level, start, target).unwrap();

        assert!(connect_point(&mut level, start, overwriteable, &mut rng));

        let field = level.heightmap.as_ref().unwrap();
        for p in route {
            assert_eq!(level.feat(p), Feature::Floor, "{p} is not floor");
            assert!(field[p] >= SHT_FLOOR && field[p] < SHT_ROCK);
        }
    }

    #[test]
    fn test_no_walls_raised() {
        let mut level = strait_level();
        let mut rng = GameRng::new(21);
        assert!(connect_point(&mut level, Coord::new(22, 22), overwriteable, &mut rng));
        assert!(rectangle(1).all(|c| !level.feat(c).is_wall()));
    }

    #[test]
    fn test_without_floor_nothing_happens() {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 2));
        level.init_heightmap(-60);
        for c in rectangle(1) {
            level.set_feat(c, Feature::DeepWater);
        }
        let before = level.heightmap.clone();
        let mut rng = GameRng::new(1);

        assert!(!connect_point(&mut level, Coord::new(22, 22), overwriteable, &mut rng));
        assert_eq!(level.heightmap, before);
    }

    #[test]
    fn test_without_heightmap() {
        let mut level = strait_level();
        level.discard_heightmap();
        let mut rng = GameRng::new(1);
        assert!(!connect_point(&mut level, Coord::new(22, 22), overwriteable, &mut rng));
    }
}
