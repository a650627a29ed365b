//! Size-bounded PNG encoding.
//!
//! The canvas is encoded losslessly first; if the bytes exceed the
//! configured ceiling the encoder retries with the most aggressive
//! lossless compression, and as a last resort degrades the color
//! representation to a bounded indexed palette with binary transparency.
//! Placements are never altered; only the pixel encoding changes.

use std::collections::HashMap;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Alpha at or above which a pixel stays opaque through quantization.
const OPAQUE_THRESHOLD: u8 = 128;

/// Size-optimizer settings.
///
/// The quantization parameters are tuning defaults, not load-bearing
/// invariants; they only matter once both lossless stages miss the
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeLimits {
    /// Output byte-size ceiling.
    pub max_bytes: usize,
    /// Palette size bound for the indexed fallback stage, including the
    /// transparent slot.
    pub quant_colors: usize,
}

impl Default for EncodeLimits {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            quant_colors: 128,
        }
    }
}

impl EncodeLimits {
    /// Check the limits against their documented ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidLimits`] for a zero byte budget or
    /// a palette bound too small to hold the transparent slot plus one
    /// color.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.max_bytes == 0 {
            return Err(EncodeError::InvalidLimits(
                "max_bytes must be nonzero".to_string(),
            ));
        }
        if self.quant_colors < 2 || self.quant_colors > 256 {
            return Err(EncodeError::InvalidLimits(format!(
                "quant_colors must be in [2, 256], got {}",
                self.quant_colors,
            )));
        }
        Ok(())
    }
}

/// Errors that can occur while encoding the output image.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The PNG encoder rejected the data.
    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),

    /// Encode limits are out of range.
    #[error("invalid encode limits: {0}")]
    InvalidLimits(String),
}

/// Encode the canvas as a PNG no larger than the budget, degrading in
/// stages: fast lossless, best lossless, then indexed color with binary
/// transparency. If even the final stage exceeds the budget the
/// smallest encoding is returned and a warning is logged.
///
/// # Errors
///
/// Returns [`EncodeError`] if the limits are invalid or the encoder
/// fails; size pressure alone is never an error.
pub fn encode_png_bounded(
    image: &RgbaImage,
    limits: &EncodeLimits,
) -> Result<Vec<u8>, EncodeError> {
    limits.validate()?;

    let fast = encode_rgba(image, png::Compression::Fast)?;
    if fast.len() <= limits.max_bytes {
        return Ok(fast);
    }

    let best = encode_rgba(image, png::Compression::Best)?;
    if best.len() <= limits.max_bytes {
        return Ok(best);
    }

    let indexed = encode_indexed(image, limits.quant_colors)?;
    if indexed.len() > limits.max_bytes {
        warn!(
            bytes = indexed.len(),
            budget = limits.max_bytes,
            "output still exceeds the size budget after quantization",
        );
    }
    Ok(if indexed.len() <= best.len() {
        indexed
    } else {
        best
    })
}

fn encode_rgba(image: &RgbaImage, compression: png::Compression) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()?;
    Ok(buf)
}

fn encode_indexed(image: &RgbaImage, max_colors: usize) -> Result<Vec<u8>, EncodeError> {
    let (palette, indices) = quantize(image, max_colors);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for color in &palette {
        plte.extend_from_slice(color);
    }
    // Index 0 is the fully transparent slot; everything else is opaque.
    let mut trns = vec![255_u8; palette.len()];
    trns[0] = 0;

    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Best);
    encoder.set_palette(plte);
    encoder.set_trns(trns);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&indices)?;
    writer.finish()?;
    Ok(buf)
}

/// Reduce the canvas to at most `max_colors` palette entries (slot 0
/// reserved for transparency) and produce the per-pixel index data.
///
/// Exact colors are kept when they fit the budget; otherwise colors are
/// bucketed to 4 bits per channel and the most populous buckets survive,
/// averaged, with the rest mapped to their nearest surviving entry.
#[allow(clippy::cast_possible_truncation)]
fn quantize(image: &RgbaImage, max_colors: usize) -> (Vec<[u8; 3]>, Vec<u8>) {
    let slots = max_colors.saturating_sub(1).max(1);

    let mut counts: HashMap<[u8; 3], u64> = HashMap::new();
    for pixel in image.pixels() {
        if pixel.0[3] >= OPAQUE_THRESHOLD {
            *counts
                .entry([pixel.0[0], pixel.0[1], pixel.0[2]])
                .or_insert(0) += 1;
        }
    }

    let colors: Vec<[u8; 3]> = if counts.len() <= slots {
        let mut exact: Vec<([u8; 3], u64)> = counts.into_iter().collect();
        exact.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        exact.into_iter().map(|(color, _)| color).collect()
    } else {
        // Bucket to 4 bits per channel, keep the most populous buckets,
        // represent each by its average color.
        let mut buckets: HashMap<[u8; 3], (u64, [u64; 3])> = HashMap::new();
        for (&color, &count) in &counts {
            let key = [color[0] >> 4, color[1] >> 4, color[2] >> 4];
            let bucket = buckets.entry(key).or_insert((0, [0; 3]));
            bucket.0 += count;
            for channel in 0..3 {
                bucket.1[channel] += u64::from(color[channel]) * count;
            }
        }
        let mut ranked: Vec<([u8; 3], (u64, [u64; 3]))> = buckets.into_iter().collect();
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.0.cmp(&b.0)));
        ranked.truncate(slots);
        ranked
            .into_iter()
            .map(|(_, (count, sums))| {
                [
                    (sums[0] / count) as u8,
                    (sums[1] / count) as u8,
                    (sums[2] / count) as u8,
                ]
            })
            .collect()
    };

    let mut palette = Vec::with_capacity(colors.len() + 1);
    palette.push([0, 0, 0]);
    palette.extend_from_slice(&colors);

    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let indices = image
        .pixels()
        .map(|pixel| {
            if pixel.0[3] < OPAQUE_THRESHOLD {
                0
            } else {
                let key = [pixel.0[0], pixel.0[1], pixel.0[2]];
                *lookup
                    .entry(key)
                    .or_insert_with(|| nearest_color(&colors, key) + 1)
            }
        })
        .collect();

    (palette, indices)
}

/// Index of the palette color closest to `target` in squared RGB
/// distance; ties resolve to the earlier entry.
#[allow(clippy::cast_possible_truncation)]
fn nearest_color(colors: &[[u8; 3]], target: [u8; 3]) -> u8 {
    let mut best = 0_usize;
    let mut best_distance = u32::MAX;
    for (i, color) in colors.iter().enumerate() {
        let distance: u32 = (0..3)
            .map(|c| {
                let d = i32::from(color[c]) - i32::from(target[c]);
                (d * d) as u32
            })
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    #[test]
    fn small_canvas_round_trips_losslessly() {
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 50, 25, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let bytes = encode_png_bounded(&img, &EncodeLimits::default()).unwrap();
        assert!(bytes.len() <= EncodeLimits::default().max_bytes);
        assert_eq!(decode(&bytes), img);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let img = RgbaImage::new(4, 4);
        let limits = EncodeLimits {
            max_bytes: 0,
            quant_colors: 128,
        };
        assert!(matches!(
            encode_png_bounded(&img, &limits),
            Err(EncodeError::InvalidLimits(_)),
        ));
    }

    #[test]
    fn undersized_color_budget_is_rejected() {
        let limits = EncodeLimits {
            max_bytes: 100,
            quant_colors: 1,
        };
        assert!(matches!(limits.validate(), Err(EncodeError::InvalidLimits(_))));
    }

    #[test]
    fn tiny_budget_falls_through_to_indexed_encoding() {
        // Few distinct colors: the indexed stage preserves them exactly.
        let img = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([200, 50, 25, 255])
            } else {
                Rgba([10, 120, 210, 255])
            }
        });
        let limits = EncodeLimits {
            max_bytes: 1,
            quant_colors: 128,
        };
        let bytes = encode_png_bounded(&img, &limits).unwrap();
        let decoded = decode(&bytes);
        assert_eq!(decoded.get_pixel(0, 0).0, [200, 50, 25, 255]);
        assert_eq!(decoded.get_pixel(63, 0).0, [10, 120, 210, 255]);
    }

    #[test]
    fn quantization_binarizes_transparency() {
        let img = RgbaImage::from_fn(32, 32, |x, _| match x % 4 {
            0 => Rgba([90, 90, 90, 255]),
            1 => Rgba([90, 90, 90, 200]),
            2 => Rgba([90, 90, 90, 127]),
            _ => Rgba([90, 90, 90, 0]),
        });
        let limits = EncodeLimits {
            max_bytes: 1,
            quant_colors: 16,
        };
        let decoded = decode(&encode_png_bounded(&img, &limits).unwrap());
        assert_eq!(decoded.get_pixel(0, 0).0[3], 255);
        assert_eq!(decoded.get_pixel(1, 0).0[3], 255);
        assert_eq!(decoded.get_pixel(2, 0).0[3], 0);
        assert_eq!(decoded.get_pixel(3, 0).0[3], 0);
    }

    #[test]
    fn quantization_bounds_the_color_count() {
        // A 16x16 gradient has 256 distinct colors; the indexed stage
        // must cut that down to the configured bound.
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 77, 255])
        });
        let limits = EncodeLimits {
            max_bytes: 1,
            quant_colors: 64,
        };
        let decoded = decode(&encode_png_bounded(&img, &limits).unwrap());

        let mut unique = std::collections::HashSet::new();
        for pixel in decoded.pixels() {
            unique.insert(pixel.0);
        }
        assert!(
            unique.len() <= 64,
            "expected at most 64 colors, found {}",
            unique.len(),
        );
    }

    #[test]
    fn indexed_stage_shrinks_a_noisy_canvas() {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        });
        let fast = encode_rgba(&img, png::Compression::Fast).unwrap();
        let indexed = encode_indexed(&img, 128).unwrap();
        assert!(
            indexed.len() < fast.len(),
            "indexed ({}) should be smaller than fast RGBA ({})",
            indexed.len(),
            fast.len(),
        );
    }
}
