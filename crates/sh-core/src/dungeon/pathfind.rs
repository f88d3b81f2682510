//! Grid searches used by terrain fix-up passes

use pathfinding::prelude::{astar, bfs};

use super::cell::Feature;
use super::coord::{Coord, in_bounds};
use super::level::Level;

/// In-bounds neighbours of `c` that lie outside vault masks
fn unforbidden_neighbours(level: &Level, c: Coord) -> impl Iterator<Item = Coord> + '_ {
    c.adjacent()
        .filter(move |&p| in_bounds(p) && !level.cell(p).in_vault())
}

/// Nearest cell with `feat`, other than `start`, reachable without
/// crossing vault-masked cells. `start` itself may lie in a vault.
pub fn flood_find_nearest(level: &Level, start: Coord, feat: Feature) -> Option<Coord> {
    bfs(
        &start,
        |&c| unforbidden_neighbours(level, c).collect::<Vec<_>>(),
        |&c| c != start && level.feat(c) == feat,
    )
    .and_then(|path| path.last().copied())
}

/// Shortest 8-way route from `from` to `to` that stays out of vaults
/// except at its two ends. Includes both endpoints.
pub fn join_the_dots(level: &Level, from: Coord, to: Coord) -> Option<Vec<Coord>> {
    if from == to {
        return Some(vec![from]);
    }

    astar(
        &from,
        |&c| {
            c.adjacent()
                .filter(|&p| in_bounds(p) && (p == to || !level.cell(p).in_vault()))
                .map(|p| (p, 1u32))
                .collect::<Vec<_>>()
        },
        |&c| c.grid_distance(to) as u32,
        |&c| c == to,
    )
    .map(|(path, _cost)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Branch, LevelId, MapMask};

    fn open_level() -> Level {
        let mut level = Level::new(LevelId::new(Branch::Shoals, 1));
        level.replace_area(
            Coord::new(1, 1),
            Coord::new(30, 30),
            Feature::RockWall,
            Feature::DeepWater,
        );
        level
    }

    #[test]
    fn test_flood_find_skips_start() {
        let mut level = open_level();
        level.set_feat(Coord::new(5, 5), Feature::Floor);
        level.set_feat(Coord::new(9, 5), Feature::Floor);

        assert_eq!(
            flood_find_nearest(&level, Coord::new(5, 5), Feature::Floor),
            Some(Coord::new(9, 5))
        );
    }

    #[test]
    fn test_flood_find_respects_vaults() {
        let mut level = open_level();
        level.set_feat(Coord::new(9, 5), Feature::Floor);
        level.cell_mut(Coord::new(9, 5)).map_mask.insert(MapMask::VAULT);
        assert_eq!(
            flood_find_nearest(&level, Coord::new(5, 5), Feature::Floor),
            None
        );
    }

    #[test]
    fn test_join_the_dots_avoids_vaults() {
        let mut level = open_level();
        // A vault wall between the endpoints with no gap inside rows 2..=20
        for y in 1..=20 {
            level.cell_mut(Coord::new(10, y)).map_mask.insert(MapMask::VAULT);
        }
        let path = join_the_dots(&level, Coord::new(5, 5), Coord::new(15, 5)).unwrap();

        assert_eq!(path.first(), Some(&Coord::new(5, 5)));
        assert_eq!(path.last(), Some(&Coord::new(15, 5)));
        assert!(path.iter().all(|p| !level.cell(*p).in_vault()));
        assert!(path.windows(2).all(|w| w[0].grid_distance(w[1]) == 1));
    }
}
