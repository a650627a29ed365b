//! Shared types for the oblako word-cloud layout pipeline.

use serde::{Deserialize, Serialize};

use crate::palette;

/// Re-export `RgbaImage` so downstream crates can reference the output
/// canvas type without depending on `image` directly.
pub use image::RgbaImage;

/// One entry of the ranked word-frequency table.
///
/// Rank is positional: index 0 of a `&[WordEntry]` slice is the most
/// frequent word. Entries are produced by the external tokenizer and are
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// The word as it will be drawn.
    pub word: String,
    /// Occurrence count in the source chat export. Always at least 1 for
    /// entries the tokenizer emits.
    pub frequency: u32,
}

impl WordEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        Self {
            word: word.into(),
            frequency,
        }
    }
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count, computed in `usize` to index flat buffers.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Orientation of a placed word.
///
/// The layout model only supports unrotated text and a single 90°
/// rotation; the horizontal bias is configurable because horizontal text
/// packs more densely against most silhouettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// Unrotated, left-to-right text.
    #[default]
    Horizontal,
    /// Rotated 90° clockwise, reading top-to-bottom.
    Vertical,
}

impl Rotation {
    /// Rotation angle in degrees.
    #[must_use]
    pub const fn degrees(self) -> u32 {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 90,
        }
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One word's committed position on the canvas.
///
/// Created by the placement engine, immutable once committed, consumed by
/// the compositor. `x`/`y` are the top-left corner of the text box in
/// canvas coordinates (the box excludes the collision margin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The word to draw.
    pub word: String,
    /// Committed font size in pixels.
    pub font_size: u32,
    /// Left edge of the text box.
    pub x: u32,
    /// Top edge of the text box.
    pub y: u32,
    /// Orientation of the text.
    pub rotation: Rotation,
    /// Fill color, drawn from the render's palette.
    pub color: Rgb,
}

/// Output of the placement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayout {
    /// Committed placements in commit order (a subset of the expanded
    /// word list; words that found no free position are absent).
    pub placements: Vec<Placement>,
    /// Canvas dimensions the placements were computed against.
    pub dimensions: Dimensions,
    /// Number of words dropped after exhausting all font sizes and
    /// positions. Informational; never a failure by itself.
    pub dropped: usize,
}

/// Configuration for a single word-cloud render.
///
/// Every recognized option is an explicit field with a default; values
/// are validated once at render start by [`CloudConfig::validate`] and
/// out-of-range values are rejected with [`CloudError::InvalidConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Smallest font size the engine will shrink to before dropping a
    /// word. Must be at least 1.
    pub min_font_size: u32,
    /// Font size of the most frequent word.
    pub max_font_size: u32,
    /// Collision margin in pixels added around each word's box.
    pub margin: u32,
    /// Probability of placing a word horizontally; the remainder use a
    /// 90° rotation. In `[0, 1]`.
    pub prefer_horizontal: f64,
    /// How strongly font size follows word frequency. 0 keeps all words
    /// nearly the same size; 1 makes size purely proportional to
    /// frequency. In `[0, 1]`.
    pub relative_scaling: f64,
    /// Minimum word-instance count the expander ensures before layout,
    /// so sparse vocabularies still fill the silhouette.
    pub density_target: usize,
    /// Seed for the render's random source. Orientation rolls, position
    /// sampling, palette choice, and colors all draw from one seeded
    /// generator, so identical inputs reproduce identical layouts.
    pub seed: u64,
    /// Palette set; one palette is chosen per render.
    pub palettes: Vec<Vec<Rgb>>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            min_font_size: 6,
            max_font_size: 100,
            margin: 1,
            prefer_horizontal: 0.8,
            relative_scaling: 0.5,
            density_target: 200,
            seed: 42,
            palettes: palette::default_palettes(),
        }
    }
}

impl CloudConfig {
    /// Canvas dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Check every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CloudError> {
        if self.width == 0 || self.height == 0 {
            return Err(CloudError::InvalidConfig(
                "canvas dimensions must be nonzero".to_string(),
            ));
        }
        if self.min_font_size == 0 {
            return Err(CloudError::InvalidConfig(
                "min_font_size must be at least 1".to_string(),
            ));
        }
        if self.min_font_size > self.max_font_size {
            return Err(CloudError::InvalidConfig(format!(
                "min_font_size ({}) exceeds max_font_size ({})",
                self.min_font_size, self.max_font_size,
            )));
        }
        if !(0.0..=1.0).contains(&self.prefer_horizontal) {
            return Err(CloudError::InvalidConfig(format!(
                "prefer_horizontal must be in [0, 1], got {}",
                self.prefer_horizontal,
            )));
        }
        if !(0.0..=1.0).contains(&self.relative_scaling) {
            return Err(CloudError::InvalidConfig(format!(
                "relative_scaling must be in [0, 1], got {}",
                self.relative_scaling,
            )));
        }
        if self.density_target == 0 {
            return Err(CloudError::InvalidConfig(
                "density_target must be at least 1".to_string(),
            ));
        }
        if self.palettes.is_empty() || self.palettes.iter().any(Vec::is_empty) {
            return Err(CloudError::InvalidConfig(
                "palette set must contain at least one non-empty palette".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during cloud layout.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The pattern image bytes were empty.
    #[error("pattern image data is empty")]
    EmptyPattern,

    /// Failed to decode the pattern image.
    #[error("failed to decode pattern image: {0}")]
    PatternDecode(#[from] image::ImageError),

    /// The input word list was empty (or contained no usable entries).
    #[error("no words to render")]
    EmptyWordList,

    /// Every word was dropped; zero placements were committed.
    #[error("could not fit any words inside the mask")]
    LayoutFailure,

    /// A configured font could not be parsed.
    #[error("failed to parse font: {0}")]
    FontParse(String),

    /// Render configuration is invalid.
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
}
