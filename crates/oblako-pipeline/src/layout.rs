//! Placement engine: pack words into the free space of the mask.
//!
//! Words are processed in descending frequency order. Each word gets a
//! font size derived from its rank, an orientation roll, and a search
//! for a free margin-padded box via the integral-image index; if no box
//! fits, the font shrinks step by step before the word is dropped. A
//! committed box is stamped into the occupancy grid so every later query
//! sees it.
//!
//! A word that finds no position at any size is skipped silently; only
//! a render that places nothing at all is a failure.

use rand::Rng;
use tracing::debug;

use crate::grid::OccupancyGrid;
use crate::integral::IntegralImage;
use crate::palette;
use crate::shaper::TextShaper;
use crate::types::{
    CloudConfig, CloudError, CloudLayout, Placement, Rgb, Rotation, WordEntry,
};

/// A committed position awaiting its color.
struct PendingPlacement {
    word: String,
    font_size: u32,
    x: u32,
    y: u32,
    rotation: Rotation,
}

/// A free box found for one word at one font size.
struct Candidate {
    x: u32,
    y: u32,
    font_size: u32,
    rotation: Rotation,
    box_w: u32,
    box_h: u32,
}

/// Place the expanded word list inside the mask.
///
/// `grid` arrives with the forbidden silhouette pixels pre-blocked and
/// becomes the live canvas occupancy as boxes are committed. `words`
/// must be ordered most frequent first. Colors are assigned to the
/// committed placements at the end, all from the one `palette` chosen
/// for this render.
///
/// # Errors
///
/// Returns [`CloudError::EmptyWordList`] if `words` is empty and
/// [`CloudError::LayoutFailure`] if not a single word could be placed.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn place_words<S, R>(
    words: &[WordEntry],
    mut grid: OccupancyGrid,
    shaper: &S,
    palette: &[Rgb],
    config: &CloudConfig,
    rng: &mut R,
) -> Result<CloudLayout, CloudError>
where
    S: TextShaper + ?Sized,
    R: Rng,
{
    let dimensions = grid.dimensions();
    let max_frequency = words.first().map_or(0, |entry| entry.frequency);
    if max_frequency == 0 {
        return Err(CloudError::EmptyWordList);
    }

    let mut integral = IntegralImage::build(&grid);
    let mut pending: Vec<PendingPlacement> = Vec::new();
    let mut dropped = 0_usize;

    // The first word starts at the maximum size; every later word starts
    // from the previously committed size scaled by the frequency ratio.
    let mut font_size = config.max_font_size;
    let mut last_rel: Option<f64> = None;

    for entry in words {
        let rel = f64::from(entry.frequency) / f64::from(max_frequency);
        if let Some(last) = last_rel {
            if config.relative_scaling > 0.0 && last > 0.0 {
                let factor =
                    config.relative_scaling * (rel / last) + (1.0 - config.relative_scaling);
                font_size = (factor * f64::from(font_size)).round() as u32;
            }
        }
        font_size = font_size.clamp(config.min_font_size, config.max_font_size);

        match find_position(&entry.word, font_size, &integral, shaper, config, rng) {
            Some(found) => {
                grid.block_rect(found.x, found.y, found.box_w, found.box_h);
                integral.update(&grid, found.x, found.y);
                pending.push(PendingPlacement {
                    word: entry.word.clone(),
                    font_size: found.font_size,
                    x: found.x + config.margin / 2,
                    y: found.y + config.margin / 2,
                    rotation: found.rotation,
                });
                font_size = found.font_size;
                last_rel = Some(rel);
            }
            None => {
                dropped += 1;
                debug!(word = %entry.word, font_size, "no free position; word dropped");
            }
        }
    }

    if pending.is_empty() {
        return Err(CloudError::LayoutFailure);
    }

    let placements = pending
        .into_iter()
        .map(|p| Placement {
            word: p.word,
            font_size: p.font_size,
            x: p.x,
            y: p.y,
            rotation: p.rotation,
            color: palette::pick(palette, rng),
        })
        .collect();

    Ok(CloudLayout {
        placements,
        dimensions,
        dropped,
    })
}

/// Search for a free box, shrinking the font down to the minimum before
/// giving up. The orientation is re-rolled at every size attempt.
#[allow(clippy::cast_precision_loss)]
fn find_position<S, R>(
    word: &str,
    start_size: u32,
    integral: &IntegralImage,
    shaper: &S,
    config: &CloudConfig,
    rng: &mut R,
) -> Option<Candidate>
where
    S: TextShaper + ?Sized,
    R: Rng,
{
    let mut size = start_size;
    while size >= config.min_font_size {
        let rotation = if rng.random_bool(config.prefer_horizontal) {
            Rotation::Horizontal
        } else {
            Rotation::Vertical
        };
        let extent = match rotation {
            Rotation::Horizontal => shaper.measure(word, size as f32),
            Rotation::Vertical => shaper.measure(word, size as f32).rotated(),
        };

        if extent.width > 0 && extent.height > 0 {
            let box_w = extent.width + config.margin;
            let box_h = extent.height + config.margin;
            if let Some((x, y)) = integral.sample_free_rect(box_w, box_h, rng) {
                return Some(Candidate {
                    x,
                    y,
                    font_size: size,
                    rotation,
                    box_w,
                    box_h,
                });
            }
        }

        if size == config.min_font_size {
            break;
        }
        size -= 1;
    }
    None
}
