//! oblako-pipeline: Pure word-cloud layout pipeline (sans-IO).
//!
//! Turns a ranked word-frequency table and a silhouette pattern into a
//! committed set of word placements through:
//! mask building -> word list expansion -> frequency-ranked placement
//! (integral-image accelerated) -> color assignment.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Pattern files, fonts, and
//! output paths live in `oblako-io`; rasterization and encoding live in
//! `oblako-render`.

pub mod expand;
pub mod grid;
pub mod integral;
pub mod layout;
pub mod mask;
pub mod palette;
pub mod shaper;
pub mod types;

pub use shaper::{BlockShaper, Coverage, FontShaper, TextExtent, TextShaper};
pub use types::{
    CloudConfig, CloudError, CloudLayout, Dimensions, Placement, Rgb, Rotation, WordEntry,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Run the full layout pipeline.
///
/// Takes the tokenizer's ranked `(word, frequency)` entries (most
/// frequent first), the raw pattern image bytes, a text shaper, and a
/// validated-on-entry configuration, and produces a [`CloudLayout`]
/// ready for the compositor.
///
/// The function is a blocking, synchronous, pure function of its inputs
/// plus the configured seed: all randomness (expansion top-up, palette
/// choice, orientation rolls, position sampling, colors) flows through
/// one `ChaCha8Rng`, so identical inputs reproduce identical layouts.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Filter empty and zero-frequency entries
/// 3. Build the occupancy mask from the pattern silhouette
/// 4. Expand the vocabulary to the density target
/// 5. Choose the render's palette
/// 6. Place words, largest rank first
///
/// # Errors
///
/// Returns [`CloudError::InvalidConfig`] for out-of-range configuration,
/// [`CloudError::EmptyWordList`] if no usable entries remain (checked
/// before any mask or canvas work), [`CloudError::EmptyPattern`] /
/// [`CloudError::PatternDecode`] for a bad pattern image, and
/// [`CloudError::LayoutFailure`] if not a single word could be placed.
pub fn layout_cloud<S: TextShaper + ?Sized>(
    entries: &[WordEntry],
    pattern_bytes: &[u8],
    shaper: &S,
    config: &CloudConfig,
) -> Result<CloudLayout, CloudError> {
    // 1. Validate configuration.
    config.validate()?;

    // 2. Filter unusable entries. An empty list must fail before any
    //    mask or canvas work happens.
    let usable: Vec<WordEntry> = entries
        .iter()
        .filter(|e| !e.word.trim().is_empty() && e.frequency > 0)
        .cloned()
        .collect();
    if usable.is_empty() {
        return Err(CloudError::EmptyWordList);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    // 3. Occupancy mask from the silhouette.
    let grid = mask::build_occupancy_grid(pattern_bytes, config.dimensions())?;
    if grid.free_pixels() == 0 {
        debug!("mask has no placeable pixels");
        return Err(CloudError::LayoutFailure);
    }

    // 4. Expand the vocabulary to the density target.
    let expanded = expand::expand_word_list(&usable, config.density_target, &mut rng)?;

    // 5. One palette per render.
    let chosen = palette::choose(&config.palettes, &mut rng).ok_or_else(|| {
        CloudError::InvalidConfig("palette set must contain at least one non-empty palette".into())
    })?;

    // 6. Placement.
    layout::place_words(&expanded, grid, shaper, chosen, config, &mut rng)
}
