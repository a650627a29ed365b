//! Palette set and per-render color assignment.
//!
//! One palette is chosen uniformly per render (not per word); each
//! committed placement then draws its color uniformly from that palette.
//! No repetition constraint is enforced, so adjacent words may share a
//! color.

use rand::Rng;

use crate::types::Rgb;

/// The default palette set: six five-color schemes ranging from bright
/// pastels to high-contrast tones.
#[must_use]
pub fn default_palettes() -> Vec<Vec<Rgb>> {
    vec![
        // Bright pastels
        vec![
            Rgb::new(0xFF, 0x6B, 0x6B),
            Rgb::new(0x4E, 0xCD, 0xC4),
            Rgb::new(0x45, 0xB7, 0xD1),
            Rgb::new(0x96, 0xCE, 0xB4),
            Rgb::new(0xFF, 0xEA, 0xA7),
        ],
        // High contrast
        vec![
            Rgb::new(0x2C, 0x3E, 0x50),
            Rgb::new(0xE7, 0x4C, 0x3C),
            Rgb::new(0xF3, 0x9C, 0x12),
            Rgb::new(0x27, 0xAE, 0x60),
            Rgb::new(0x8E, 0x44, 0xAD),
        ],
        // Pink shades
        vec![
            Rgb::new(0xFF, 0x9A, 0x9E),
            Rgb::new(0xFE, 0xCF, 0xEF),
            Rgb::new(0xFE, 0xCF, 0xEF),
            Rgb::new(0xFF, 0x9A, 0x9E),
            Rgb::new(0xFE, 0xCF, 0xEF),
        ],
        // Gradient blues and violets
        vec![
            Rgb::new(0x66, 0x7E, 0xEA),
            Rgb::new(0x76, 0x4B, 0xA2),
            Rgb::new(0xF0, 0x93, 0xFB),
            Rgb::new(0xF5, 0x57, 0x6C),
            Rgb::new(0x4F, 0xAC, 0xFE),
        ],
        // Warm tones
        vec![
            Rgb::new(0xFF, 0xEC, 0xD2),
            Rgb::new(0xFC, 0xB6, 0x9F),
            Rgb::new(0xFF, 0x8A, 0x80),
            Rgb::new(0xFF, 0x80, 0xAB),
            Rgb::new(0xEA, 0x80, 0xFC),
        ],
        // Soft pastels
        vec![
            Rgb::new(0xA8, 0xED, 0xEA),
            Rgb::new(0xFE, 0xD6, 0xE3),
            Rgb::new(0xD2, 0x99, 0xC2),
            Rgb::new(0xFE, 0xF9, 0xD7),
            Rgb::new(0x66, 0x7E, 0xEA),
        ],
    ]
}

/// Choose one palette for the render, uniformly at random. Returns
/// `None` for an empty set (rejected earlier by config validation).
pub fn choose<'a, R: Rng>(palettes: &'a [Vec<Rgb>], rng: &mut R) -> Option<&'a [Rgb]> {
    if palettes.is_empty() {
        return None;
    }
    palettes
        .get(rng.random_range(0..palettes.len()))
        .map(Vec::as_slice)
}

/// Draw one color uniformly from the render's palette.
pub fn pick<R: Rng>(palette: &[Rgb], rng: &mut R) -> Rgb {
    if palette.is_empty() {
        return Rgb::new(0, 0, 0);
    }
    palette
        .get(rng.random_range(0..palette.len()))
        .copied()
        .unwrap_or(Rgb::new(0, 0, 0))
}
