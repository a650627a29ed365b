//! Integral image over the occupancy grid.
//!
//! A prefix-sum image in which cell `(x, y)` holds the number of blocked
//! pixels in the rectangle from the origin to `(x, y)` inclusive. After
//! O(area) preprocessing, "how many blocked pixels does this box
//! contain?" is answered in O(1) by four-corner inclusion-exclusion,
//! which is what makes the repeated free-box searches of the placement
//! engine affordable.
//!
//! The index must reflect every committed placement before the next word
//! is processed; [`IntegralImage::update`] recomputes only the quadrant
//! at and below/right of the changed region instead of rebuilding the
//! whole image.

use rand::Rng;

use crate::grid::OccupancyGrid;
use crate::types::Dimensions;

/// Prefix sums of blocked-pixel counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegralImage {
    dimensions: Dimensions,
    sums: Vec<u64>,
}

impl IntegralImage {
    /// Build the integral image for the current state of `grid`.
    #[must_use]
    pub fn build(grid: &OccupancyGrid) -> Self {
        let dimensions = grid.dimensions();
        let mut integral = Self {
            dimensions,
            sums: vec![0; dimensions.area()],
        };
        integral.update(grid, 0, 0);
        integral
    }

    /// Recompute sums after `grid` changed at or below/right of
    /// `(x0, y0)`.
    ///
    /// Cells above or left of the changed region keep their sums: a
    /// prefix sum at `(x, y)` only covers pixels with both coordinates
    /// `<=` its own, so only the quadrant `x >= x0 && y >= y0` can be
    /// affected by a change at `(x0, y0)` or beyond.
    pub fn update(&mut self, grid: &OccupancyGrid, x0: u32, y0: u32) {
        for y in y0..self.dimensions.height {
            for x in x0..self.dimensions.width {
                let value = u64::from(grid.is_blocked(x, y));
                let left = if x > 0 { self.sum_at(x - 1, y) } else { 0 };
                let above = if y > 0 { self.sum_at(x, y - 1) } else { 0 };
                let corner = if x > 0 && y > 0 {
                    self.sum_at(x - 1, y - 1)
                } else {
                    0
                };
                let i = self.index(x, y);
                self.sums[i] = value + left + above - corner;
            }
        }
    }

    /// Number of blocked pixels inside the `w`×`h` rectangle with
    /// top-left `(x, y)`. The rectangle is clipped to the image bounds;
    /// a zero-area rectangle sums to zero.
    #[must_use]
    pub fn region_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let x_end = x.saturating_add(w).min(self.dimensions.width);
        let y_end = y.saturating_add(h).min(self.dimensions.height);
        if x >= x_end || y >= y_end {
            return 0;
        }

        // Inclusive bottom-right corner; the x == 0 / y == 0 edges have
        // no "left" or "above" neighbor and contribute zero.
        let xi = x_end - 1;
        let yi = y_end - 1;
        let total = self.sum_at(xi, yi);
        let left = if x > 0 { self.sum_at(x - 1, yi) } else { 0 };
        let above = if y > 0 { self.sum_at(xi, y - 1) } else { 0 };
        let corner = if x > 0 && y > 0 {
            self.sum_at(x - 1, y - 1)
        } else {
            0
        };
        total + corner - left - above
    }

    /// Pick a uniformly random position whose `w`×`h` box is entirely
    /// free, or `None` if no such position exists.
    ///
    /// Counts the free positions in one pass, draws an index from `rng`,
    /// then rescans to the drawn position. Zero-sized or oversized boxes
    /// have no valid position.
    pub fn sample_free_rect<R: Rng>(&self, w: u32, h: u32, rng: &mut R) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.dimensions.width || h > self.dimensions.height {
            return None;
        }
        let x_max = self.dimensions.width - w;
        let y_max = self.dimensions.height - h;

        let mut free: u64 = 0;
        for y in 0..=y_max {
            for x in 0..=x_max {
                if self.region_sum(x, y, w, h) == 0 {
                    free += 1;
                }
            }
        }
        if free == 0 {
            return None;
        }

        let target = rng.random_range(0..free);
        let mut seen: u64 = 0;
        for y in 0..=y_max {
            for x in 0..=x_max {
                if self.region_sum(x, y, w, h) == 0 {
                    if seen == target {
                        return Some((x, y));
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    fn sum_at(&self, x: u32, y: u32) -> u64 {
        self.sums[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DIMS: Dimensions = Dimensions {
        width: 4,
        height: 4,
    };

    /// 4×4 grid with a 2×2 blocked square at the origin.
    fn corner_blocked_grid() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new_free(DIMS);
        grid.block_rect(0, 0, 2, 2);
        grid
    }

    #[test]
    fn blocked_square_sums_to_exact_count() {
        let integral = IntegralImage::build(&corner_blocked_grid());
        assert_eq!(integral.region_sum(0, 0, 2, 2), 4);
        assert_eq!(integral.region_sum(0, 0, 4, 4), 4);
        assert_eq!(integral.region_sum(0, 0, 1, 1), 1);
        assert_eq!(integral.region_sum(1, 1, 1, 1), 1);
    }

    #[test]
    fn rectangle_outside_blocked_region_sums_to_zero() {
        let integral = IntegralImage::build(&corner_blocked_grid());
        assert_eq!(integral.region_sum(2, 0, 2, 4), 0);
        assert_eq!(integral.region_sum(0, 2, 4, 2), 0);
        assert_eq!(integral.region_sum(2, 2, 2, 2), 0);
    }

    #[test]
    fn straddling_rectangle_counts_only_blocked_pixels() {
        let integral = IntegralImage::build(&corner_blocked_grid());
        // Covers one blocked column of the square plus free space.
        assert_eq!(integral.region_sum(1, 0, 2, 2), 2);
        assert_eq!(integral.region_sum(1, 1, 3, 3), 1);
    }

    #[test]
    fn zero_area_rectangle_sums_to_zero() {
        let integral = IntegralImage::build(&corner_blocked_grid());
        assert_eq!(integral.region_sum(0, 0, 0, 3), 0);
        assert_eq!(integral.region_sum(0, 0, 3, 0), 0);
    }

    #[test]
    fn rectangle_is_clipped_to_bounds() {
        let integral = IntegralImage::build(&corner_blocked_grid());
        assert_eq!(integral.region_sum(0, 0, 100, 100), 4);
        assert_eq!(integral.region_sum(4, 4, 2, 2), 0);
    }

    #[test]
    fn partial_update_matches_full_rebuild() {
        let mut grid = corner_blocked_grid();
        let mut incremental = IntegralImage::build(&grid);

        grid.block_rect(2, 1, 2, 2);
        incremental.update(&grid, 2, 1);

        let rebuilt = IntegralImage::build(&grid);
        assert_eq!(incremental, rebuilt);
    }

    #[test]
    fn sequential_updates_reflect_prior_placements() {
        let mut grid = OccupancyGrid::new_free(DIMS);
        let mut integral = IntegralImage::build(&grid);

        grid.block_rect(0, 0, 2, 2);
        integral.update(&grid, 0, 0);
        assert_eq!(integral.region_sum(0, 0, 2, 2), 4);

        grid.block_rect(2, 2, 2, 2);
        integral.update(&grid, 2, 2);
        assert_eq!(integral.region_sum(2, 2, 2, 2), 4);
        assert_eq!(integral.region_sum(0, 0, 4, 4), 8);
    }

    #[test]
    fn sample_free_rect_finds_the_only_position() {
        // Block everything except a 2×2 hole at (2, 2).
        let mut grid = OccupancyGrid::new_free(DIMS);
        grid.block_rect(0, 0, 4, 2);
        grid.block_rect(0, 2, 2, 2);
        let integral = IntegralImage::build(&grid);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(integral.sample_free_rect(2, 2, &mut rng), Some((2, 2)));
    }

    #[test]
    fn sample_free_rect_returns_none_when_full() {
        let mut grid = OccupancyGrid::new_free(DIMS);
        grid.block_rect(0, 0, 4, 4);
        let integral = IntegralImage::build(&grid);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(integral.sample_free_rect(1, 1, &mut rng), None);
    }

    #[test]
    fn sample_free_rect_rejects_degenerate_boxes() {
        let integral = IntegralImage::build(&OccupancyGrid::new_free(DIMS));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(integral.sample_free_rect(0, 1, &mut rng), None);
        assert_eq!(integral.sample_free_rect(5, 1, &mut rng), None);
    }

    #[test]
    fn sample_free_rect_is_deterministic_for_a_seed() {
        let integral = IntegralImage::build(&OccupancyGrid::new_free(DIMS));
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(
            integral.sample_free_rect(2, 2, &mut a),
            integral.sample_free_rect(2, 2, &mut b),
        );
    }

    #[test]
    fn sampled_position_is_always_free() {
        let mut grid = corner_blocked_grid();
        grid.block_rect(3, 3, 1, 1);
        let integral = IntegralImage::build(&grid);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let (x, y) = integral.sample_free_rect(1, 1, &mut rng).unwrap();
            assert!(!grid.is_blocked(x, y), "sampled blocked pixel ({x}, {y})");
        }
    }
}
