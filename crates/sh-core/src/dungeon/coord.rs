//! Map coordinates and iteration helpers

use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::{GXM, GYM, X_BOUND_1, X_BOUND_2, Y_BOUND_1, Y_BOUND_2};

/// A map position. `(0, 0)` doubles as the "no position" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    pub const fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Squared euclidean length
    pub const fn abs(&self) -> i32 {
        self.x * self.x + self.y * self.y
    }

    /// Squared euclidean distance to `other`
    pub fn distance2(&self, other: Coord) -> i32 {
        (*self - other).abs()
    }

    /// Chebyshev (king-move) distance to `other`
    pub fn grid_distance(&self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The eight surrounding positions, unfiltered
    pub fn adjacent(self) -> impl Iterator<Item = Coord> {
        const OFFSETS: [(i32, i32); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        OFFSETS
            .into_iter()
            .map(move |(dx, dy)| Coord::new(self.x + dx, self.y + dy))
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inside the playable area (excludes the permanent outer ring)
pub const fn in_bounds(c: Coord) -> bool {
    c.x >= X_BOUND_1 && c.x <= X_BOUND_2 && c.y >= Y_BOUND_1 && c.y <= Y_BOUND_2
}

/// Anywhere on the map grid
pub const fn map_bounds(c: Coord) -> bool {
    c.x >= 0 && c.x < GXM && c.y >= 0 && c.y < GYM
}

/// Every map position at least `border` cells from the edge, in raster order
pub fn rectangle(border: i32) -> impl Iterator<Item = Coord> {
    rectangle_between(
        Coord::new(border, border),
        Coord::new(GXM - 1 - border, GYM - 1 - border),
    )
}

/// Every position in the inclusive box `tl..=br`, in raster order
pub fn rectangle_between(tl: Coord, br: Coord) -> impl Iterator<Item = Coord> {
    (tl.y..=br.y).flat_map(move |y| (tl.x..=br.x).map(move |x| Coord::new(x, y)))
}
