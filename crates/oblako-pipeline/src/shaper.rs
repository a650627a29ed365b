//! Text shaping: word extents and coverage bitmaps.
//!
//! The placement engine only needs box measurements; the compositor
//! additionally needs per-pixel coverage to tint. Both consume the
//! [`TextShaper`] trait so the shaping backend stays pluggable:
//! [`FontShaper`] wraps a real `fontdue` face, while [`BlockShaper`]
//! produces solid boxes and keeps layout tests and previews free of
//! font-file dependencies.

use fontdue::{Font, FontSettings, LineMetrics};

use crate::types::CloudError;

/// Measured bounding box of a word at some font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
}

impl TextExtent {
    /// The extent of the same text rotated 90°.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Anti-aliased coverage bitmap for one word, row-major, one byte per
/// pixel (0 = empty, 255 = fully covered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Coverage {
    /// An empty bitmap.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// The bitmap rotated 90° clockwise.
    #[must_use]
    pub fn rotate_cw(&self) -> Self {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut data = vec![0_u8; w * h];
        for y in 0..h {
            for x in 0..w {
                // Source (x, y) lands at (h - 1 - y, x) in the rotated frame.
                data[x * h + (h - 1 - y)] = self.data[y * w + x];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            data,
        }
    }
}

/// Measures and rasterizes words for the layout engine and compositor.
pub trait TextShaper {
    /// Bounding box of `text` drawn horizontally at `px`.
    fn measure(&self, text: &str, px: f32) -> TextExtent;

    /// Coverage bitmap of `text` drawn horizontally at `px`. The bitmap
    /// dimensions equal [`TextShaper::measure`] for the same inputs;
    /// glyph parts that overhang the advance box are clipped.
    fn rasterize(&self, text: &str, px: f32) -> Coverage;
}

/// Shaper backed by a parsed TrueType/OpenType face.
pub struct FontShaper {
    font: Font,
}

impl FontShaper {
    /// Parse a font from raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::FontParse`] if the bytes are not a usable
    /// font.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CloudError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| CloudError::FontParse(e.to_string()))?;
        Ok(Self { font })
    }

    fn line_metrics(&self, px: f32) -> LineMetrics {
        self.font
            .horizontal_line_metrics(px)
            .unwrap_or(LineMetrics {
                ascent: px * 0.8,
                descent: px * -0.2,
                line_gap: 0.0,
                new_line_size: px,
            })
    }
}

impl TextShaper for FontShaper {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn measure(&self, text: &str, px: f32) -> TextExtent {
        if text.is_empty() || px <= 0.0 {
            return TextExtent {
                width: 0,
                height: 0,
            };
        }
        let advance: f32 = text
            .chars()
            .map(|ch| self.font.metrics(ch, px).advance_width)
            .sum();
        TextExtent {
            width: advance.ceil().max(0.0) as u32,
            height: self.line_metrics(px).new_line_size.ceil().max(0.0) as u32,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn rasterize(&self, text: &str, px: f32) -> Coverage {
        let extent = self.measure(text, px);
        if extent.width == 0 || extent.height == 0 {
            return Coverage::empty();
        }
        let width = extent.width as usize;
        let height = extent.height as usize;
        let mut data = vec![0_u8; width * height];

        let baseline = self.line_metrics(px).ascent;
        let mut pen = 0.0_f32;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, px);
            let left = (pen + metrics.xmin as f32).round() as i64;
            let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let value = bitmap[gy * metrics.width + gx];
                    if value == 0 {
                        continue;
                    }
                    let x = left + gx as i64;
                    let y = top + gy as i64;
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        continue;
                    }
                    let i = y as usize * width + x as usize;
                    data[i] = data[i].max(value);
                }
            }
            pen += metrics.advance_width;
        }

        Coverage {
            width: extent.width,
            height: extent.height,
            data,
        }
    }
}

/// Deterministic, font-free shaper drawing each word as a solid box.
///
/// Every character advances by `advance` × font size and the box is one
/// font size tall. Used by tests and layout previews where real glyph
/// shapes are irrelevant.
#[derive(Debug, Clone, Copy)]
pub struct BlockShaper {
    /// Per-character advance as a fraction of the font size.
    pub advance: f32,
}

impl Default for BlockShaper {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextShaper for BlockShaper {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn measure(&self, text: &str, px: f32) -> TextExtent {
        if text.is_empty() || px <= 0.0 {
            return TextExtent {
                width: 0,
                height: 0,
            };
        }
        let chars = text.chars().count() as f32;
        TextExtent {
            width: (chars * self.advance * px).ceil().max(1.0) as u32,
            height: px.ceil().max(1.0) as u32,
        }
    }

    fn rasterize(&self, text: &str, px: f32) -> Coverage {
        let extent = self.measure(text, px);
        Coverage {
            width: extent.width,
            height: extent.height,
            data: vec![255; extent.width as usize * extent.height as usize],
        }
    }
}
