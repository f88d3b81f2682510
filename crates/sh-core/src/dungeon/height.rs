//! Height field used to build terrain from scalar elevations
//!
//! Heights are plain signed integers; classification into terrain happens
//! elsewhere. Islands are grown by adding random increments to many single
//! cells near a centre and letting smoothing round them off.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::rng::{GameRng, IntRange};

use super::coord::{Coord, rectangle_between};

/// Attempts made by [`HeightField::random_point_from`] before giving up
const RANDOM_POINT_TRIES: usize = 70;

/// A dense grid of signed heights, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightField {
    data: Vec<i32>,
    width: i32,
    height: i32,
}

impl HeightField {
    /// Create a height field with every cell set to `initial_height`
    pub fn new(width: i32, height: i32, initial_height: i32) -> Self {
        assert!(width > 2 && height > 2, "height field too small: {width}x{height}");
        Self {
            data: vec![initial_height; (width * height) as usize],
            width,
            height,
        }
    }

    /// Anywhere on the grid
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    /// Inside the grid, excluding the outermost ring
    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 1 && c.x <= self.width - 2 && c.y >= 1 && c.y <= self.height - 2
    }

    #[inline]
    fn offset(&self, c: Coord) -> usize {
        assert!(self.contains(c), "height access out of bounds at {c}");
        (c.y * self.width + c.x) as usize
    }

    #[inline]
    pub fn get(&self, c: Coord) -> i32 {
        self.data[self.offset(c)]
    }

    #[inline]
    pub fn set(&mut self, c: Coord, val: i32) {
        let i = self.offset(c);
        self.data[i] = val;
    }

    pub fn max_height(&self) -> i32 {
        self.data.iter().copied().max().unwrap_or_default()
    }

    pub fn min_height(&self) -> i32 {
        self.data.iter().copied().min().unwrap_or_default()
    }

    /// Sum and count of in-bounds heights in the square of `radius` around `c`
    pub fn sum_around(&self, c: Coord, radius: i32) -> (i64, i32) {
        let mut total = 0i64;
        let mut count = 0;
        for p in square(c, radius) {
            if self.in_bounds(p) {
                total += i64::from(self[p]);
                count += 1;
            }
        }
        (total, count)
    }

    /// Replace the height at `c` with a weighted mean of its neighbourhood.
    ///
    /// Cells above `max_height` neither contribute nor get smoothed; `None`
    /// means no cap. Neighbours are weighted by closeness, the centre most.
    pub fn smooth_height_at(&mut self, c: Coord, radius: i32, max_height: Option<i32>) {
        let height = self[c];
        if let Some(max) = max_height
            && height > max
        {
            return;
        }

        let max_delta = radius * radius * 2 + 2;
        let mut divisor = 0i64;
        let mut total = 0i64;
        for p in square(c, radius) {
            if !self.in_bounds(p) {
                continue;
            }
            let nheight = self[p];
            if let Some(max) = max_height
                && nheight > max
            {
                continue;
            }
            let weight = i64::from(max_delta - (c - p).abs());
            divisor += weight;
            total += i64::from(nheight) * weight;
        }
        if divisor > 0 {
            self[c] = (total / divisor) as i32;
        }
    }

    /// Smooth every in-bounds cell in place, raster order, `npasses` times
    pub fn smooth_heights(&mut self, radius: i32, npasses: usize) {
        for _ in 0..npasses {
            for y in 1..=self.height - 2 {
                for x in 1..=self.width - 2 {
                    self.smooth_height_at(Coord::new(x, y), radius, None);
                }
            }
        }
    }

    /// Uniform random point at least `margin` cells from every edge
    pub fn random_point_in_margin(&self, margin: i32, rng: &mut GameRng) -> Coord {
        Coord::new(
            rng.range(margin, self.width - margin - 1),
            rng.range(margin, self.height - margin - 1),
        )
    }

    /// Random point `radius` away from `c` that respects `margin`.
    ///
    /// Returns the origin if no such point was found.
    pub fn random_point_from(
        &self,
        c: Coord,
        radius: i32,
        margin: i32,
        rng: &mut GameRng,
    ) -> Coord {
        for _ in 0..RANDOM_POINT_TRIES {
            let angle = f64::from(rng.random2(360)).to_radians();
            let res = c + Coord::new(
                (f64::from(radius) * angle.cos()) as i32,
                (f64::from(radius) * angle.sin()) as i32,
            );
            if res.x >= margin
                && res.x < self.width - margin
                && res.y >= margin
                && res.y < self.height - margin
            {
                return res;
            }
        }
        Coord::origin()
    }

    /// Raise `n_points` random cells around `c`.
    ///
    /// Each sample adds a value from `height_delta_range` to one cell.
    /// Atolls sample near `radius` instead of inside the whole disc, giving
    /// a raised ring around a low centre.
    #[allow(clippy::too_many_arguments)]
    pub fn island_centred_at(
        &mut self,
        c: Coord,
        n_points: i32,
        radius: i32,
        height_delta_range: IntRange,
        border_margin: i32,
        make_atoll: bool,
        rng: &mut GameRng,
    ) {
        for _ in 0..n_points {
            let thisrad = if make_atoll {
                radius - 1 + rng.random2(3)
            } else {
                rng.random2(radius + 1)
            };
            let p = self.random_point_from(c, thisrad, border_margin, rng);
            if !p.is_origin() {
                let delta = rng.resolve(height_delta_range);
                self[p] += delta;
            }
        }
    }
}

impl Index<Coord> for HeightField {
    type Output = i32;

    fn index(&self, c: Coord) -> &i32 {
        &self.data[self.offset(c)]
    }
}

impl IndexMut<Coord> for HeightField {
    fn index_mut(&mut self, c: Coord) -> &mut i32 {
        let i = self.offset(c);
        &mut self.data[i]
    }
}

/// The square of `radius` around `c`, unfiltered
fn square(c: Coord, radius: i32) -> impl Iterator<Item = Coord> {
    rectangle_between(
        c - Coord::new(radius, radius),
        c + Coord::new(radius, radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GXM, GYM};

    fn field() -> HeightField {
        HeightField::new(GXM, GYM, 0)
    }

    #[test]
    fn test_initialise_fills() {
        let hf = HeightField::new(10, 8, -33);
        assert_eq!(hf.min_height(), -33);
        assert_eq!(hf.max_height(), -33);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_bounds_panics() {
        let hf = field();
        hf.get(Coord::new(GXM, 0));
    }

    #[test]
    fn test_smoothing_converges() {
        let spike = Coord::new(40, 35);
        let mut previous = 1000;
        for npasses in [1, 2, 4, 8, 16] {
            let mut hf = field();
            hf.set(spike, 1000);
            hf.smooth_heights(1, npasses);
            let max = hf.max_height();
            assert!(max <= previous, "{npasses} passes: {max} > {previous}");
            previous = max;
        }
        assert!(previous < 1000 / 4);
    }

    #[test]
    fn test_smooth_respects_cap() {
        let mut hf = field();
        let c = Coord::new(10, 10);
        hf.set(c, 500);
        hf.smooth_height_at(c, 1, Some(100));
        assert_eq!(hf.get(c), 500);

        // A capped neighbour does not leak into the average.
        let n = Coord::new(11, 10);
        hf.smooth_height_at(n, 1, Some(100));
        assert_eq!(hf.get(n), 0);
    }

    #[test]
    fn test_random_point_from_respects_margin() {
        let hf = field();
        let mut rng = GameRng::new(3);
        for _ in 0..500 {
            let p = hf.random_point_from(Coord::new(8, 8), 5, 6, &mut rng);
            if !p.is_origin() {
                assert!(p.x >= 6 && p.x < GXM - 6 && p.y >= 6 && p.y < GYM - 6);
            }
        }
        // Nothing fits when the whole circle is inside the margin.
        let p = hf.random_point_from(Coord::new(1, 1), 0, 6, &mut rng);
        assert!(p.is_origin());
    }

    #[test]
    fn test_random_point_in_margin() {
        let hf = field();
        let mut rng = GameRng::new(11);
        for _ in 0..500 {
            let p = hf.random_point_in_margin(6, &mut rng);
            assert!(p.x >= 6 && p.x <= GXM - 7 && p.y >= 6 && p.y <= GYM - 7);
        }
    }

    #[test]
    fn test_atoll_has_low_centre() {
        let mut hf = field();
        let mut rng = GameRng::new(2024);
        let c = Coord::new(40, 35);
        hf.island_centred_at(c, 200, 10, IntRange::new(80, 110), 6, true, &mut rng);

        let ring: Vec<i32> = rectangle_between(c - Coord::new(11, 11), c + Coord::new(11, 11))
            .filter(|p| {
                let d2 = (*p - c).abs();
                (81..=121).contains(&d2)
            })
            .map(|p| hf.get(p))
            .collect();
        let ring_mean = ring.iter().sum::<i32>() / ring.len() as i32;

        assert!(hf.get(c) < ring_mean, "centre {} ring {}", hf.get(c), ring_mean);
    }

    #[test]
    fn test_dome_raises_total() {
        let mut hf = field();
        let mut rng = GameRng::new(5);
        let c = Coord::new(30, 30);
        hf.island_centred_at(c, 50, 4, IntRange::exactly(10), 6, false, &mut rng);
        let (total, _) = hf.sum_around(c, 5);
        assert_eq!(total, 500);
    }
}
