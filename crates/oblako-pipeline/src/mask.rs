//! Mask builder: pattern image bytes to an occupancy grid.
//!
//! The silhouette decides where words may be placed. For images with an
//! alpha channel the fully opaque pixels are placeable; for everything
//! else the image is converted to grayscale and pure white is forbidden,
//! so the silhouette is defined by its non-white pixels.
//!
//! This is the first pipeline step: raw bytes in, [`OccupancyGrid`] out,
//! with the forbidden pixels pre-blocked.

use image::imageops::FilterType;

use crate::grid::OccupancyGrid;
use crate::types::{CloudError, Dimensions};

/// Alpha value marking a pattern pixel as placeable.
const FULLY_OPAQUE: u8 = 255;

/// Grayscale value marking a pattern pixel as forbidden.
const PURE_WHITE: u8 = 255;

/// Decode a pattern image and build the occupancy grid for it.
///
/// The pattern is scaled to exactly fill the canvas (nearest-neighbor,
/// no aspect-ratio letterboxing) so the grid always matches the canvas
/// dimensions.
///
/// # Errors
///
/// Returns [`CloudError::EmptyPattern`] if `pattern_bytes` is empty.
/// Returns [`CloudError::PatternDecode`] if the image cannot be decoded.
#[must_use = "returns the occupancy grid for the silhouette"]
pub fn build_occupancy_grid(
    pattern_bytes: &[u8],
    dimensions: Dimensions,
) -> Result<OccupancyGrid, CloudError> {
    if pattern_bytes.is_empty() {
        return Err(CloudError::EmptyPattern);
    }

    let decoded = image::load_from_memory(pattern_bytes)?;
    let has_alpha = decoded.color().has_alpha();
    let resized = decoded.resize_exact(dimensions.width, dimensions.height, FilterType::Nearest);

    let mut grid = OccupancyGrid::new_free(dimensions);
    if has_alpha {
        for (x, y, pixel) in resized.to_rgba8().enumerate_pixels() {
            if pixel.0[3] != FULLY_OPAQUE {
                grid.block(x, y);
            }
        }
    } else {
        for (x, y, pixel) in resized.to_luma8().enumerate_pixels() {
            if pixel.0[0] == PURE_WHITE {
                grid.block(x, y);
            }
        }
    }
    Ok(grid)
}
