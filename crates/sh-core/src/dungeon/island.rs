//! Island placement on a height field
//!
//! An island plan describes how many bumps make up each island and how far
//! apart islands must be. Building it stamps the bumps and remembers the
//! accepted centres so later passes can put set pieces on them.

use serde::{Deserialize, Serialize};

use crate::rng::{GameRng, IntRange};

use super::coord::Coord;
use super::height::HeightField;

/// Candidate centres tried before settling for the least crowded one
pub const MAX_ISLAND_SPOT_ATTEMPTS: usize = 10_000;

/// Parameters for procedurally placing a group of islands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandPlan {
    /// Distance to keep from the map edge
    pub level_border_depth: i32,

    /// Number of secondary centres per island
    pub n_aux_centres: IntRange,
    /// How far secondary centres sit from the primary one
    pub aux_centre_offset_range: IntRange,

    /// Percent chance that a bump is shaped as an atoll
    pub atoll_roll: u32,
    /// Minimum squared distance between island centres
    pub island_separation_dist2: i32,

    pub n_island_centre_delta_points: IntRange,
    pub island_centre_radius_range: IntRange,
    pub island_centre_point_height_increment: IntRange,

    pub n_island_aux_delta_points: IntRange,
    pub island_aux_radius_range: IntRange,
    pub island_aux_point_height_increment: IntRange,

    /// Centres accepted so far
    pub islands: Vec<Coord>,
}

impl Default for IslandPlan {
    fn default() -> Self {
        Self {
            level_border_depth: 6,
            n_aux_centres: IntRange::new(0, 3),
            aux_centre_offset_range: IntRange::new(2, 10),
            atoll_roll: 10,
            island_separation_dist2: 25,
            n_island_centre_delta_points: IntRange::new(50, 60),
            island_centre_radius_range: IntRange::new(3, 10),
            island_centre_point_height_increment: IntRange::new(80, 110),
            n_island_aux_delta_points: IntRange::new(25, 45),
            island_aux_radius_range: IntRange::new(2, 7),
            island_aux_point_height_increment: IntRange::new(50, 65),
            islands: Vec::new(),
        }
    }
}

impl IslandPlan {
    /// Place `n_islands` islands on `field`
    pub fn build(&mut self, n_islands: usize, field: &mut HeightField, rng: &mut GameRng) {
        for _ in 0..n_islands {
            self.build_island(field, rng);
        }
    }

    fn build_island(&mut self, field: &mut HeightField, rng: &mut GameRng) {
        let c = self.pick_island_spot(field, rng);

        let make_atoll = rng.percent(self.atoll_roll);
        field.island_centred_at(
            c,
            rng.resolve(self.n_island_centre_delta_points),
            rng.resolve(self.island_centre_radius_range),
            self.island_centre_point_height_increment,
            self.level_border_depth,
            make_atoll,
            rng,
        );

        let additional_heights = rng.resolve(self.n_aux_centres);
        for _ in 0..additional_heights {
            let offset = rng.resolve(self.aux_centre_offset_range);
            let offsetc = c + Coord::new(
                rng.range(-offset, offset),
                rng.range(-offset, offset),
            );
            let make_atoll = rng.percent(self.atoll_roll);
            field.island_centred_at(
                offsetc,
                rng.resolve(self.n_island_aux_delta_points),
                rng.resolve(self.island_aux_radius_range),
                self.island_aux_point_height_increment,
                self.level_border_depth,
                make_atoll,
                rng,
            );
        }
    }

    /// Squared distance from `c` to the nearest accepted centre
    fn crowding(&self, c: Coord) -> i32 {
        self.islands
            .iter()
            .map(|island| island.distance2(c))
            .min()
            .unwrap_or(i32::MAX)
    }

    /// Choose and record a centre far enough from every accepted one.
    ///
    /// Gives up after [`MAX_ISLAND_SPOT_ATTEMPTS`] and takes the candidate
    /// that was least crowded.
    pub fn pick_island_spot(&mut self, field: &HeightField, rng: &mut GameRng) -> Coord {
        let mut best = Coord::origin();
        let mut best_dist2 = -1;
        for _ in 0..MAX_ISLAND_SPOT_ATTEMPTS {
            let candidate = field.random_point_in_margin(self.level_border_depth, rng);
            let dist2 = self.crowding(candidate);
            if dist2 >= self.island_separation_dist2 {
                self.islands.push(candidate);
                return candidate;
            }
            if dist2 > best_dist2 {
                best = candidate;
                best_dist2 = dist2;
            }
        }

        log::warn!(
            "island placement exhausted {MAX_ISLAND_SPOT_ATTEMPTS} attempts; \
             accepting {best} at distance² {best_dist2} (wanted {})",
            self.island_separation_dist2
        );
        self.islands.push(best);
        best
    }

    /// Take a random accepted centre out of the plan
    pub fn pick_and_remove_random_island(&mut self, rng: &mut GameRng) -> Option<Coord> {
        if self.islands.is_empty() {
            return None;
        }
        let i = rng.rn2(self.islands.len() as u32) as usize;
        Some(self.islands.swap_remove(i))
    }
}
