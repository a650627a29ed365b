//! Compositor: rasterize committed placements onto a transparent canvas.
//!
//! Placements are drawn in commit order. They are non-overlapping by
//! construction, so draw order only matters where anti-aliased edges
//! meet; the higher coverage value wins there.

use image::{Rgba, RgbaImage};

use oblako_pipeline::{CloudLayout, Coverage, Placement, Rotation, TextShaper};

/// Rasterize a layout onto a fresh transparent RGBA canvas.
///
/// Each placement's word is rendered at its committed font size through
/// the shaper, rotated when vertical, tinted with the placement color,
/// and written with glyph coverage as the alpha channel.
#[must_use = "returns the composed canvas"]
#[allow(clippy::cast_precision_loss)]
pub fn compose<S: TextShaper + ?Sized>(layout: &CloudLayout, shaper: &S) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.dimensions.width, layout.dimensions.height);
    for placement in &layout.placements {
        let coverage = shaper.rasterize(&placement.word, placement.font_size as f32);
        let coverage = match placement.rotation {
            Rotation::Horizontal => coverage,
            Rotation::Vertical => coverage.rotate_cw(),
        };
        blit(&mut canvas, &coverage, placement);
    }
    canvas
}

/// Write one tinted coverage bitmap at the placement position, clipped
/// to the canvas.
fn blit(canvas: &mut RgbaImage, coverage: &Coverage, placement: &Placement) {
    for cy in 0..coverage.height {
        for cx in 0..coverage.width {
            let alpha = coverage.data[(cy * coverage.width + cx) as usize];
            if alpha == 0 {
                continue;
            }
            let x = placement.x + cx;
            let y = placement.y + cy;
            if x >= canvas.width() || y >= canvas.height() {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x, y);
            if alpha >= pixel.0[3] {
                *pixel = Rgba([
                    placement.color.r,
                    placement.color.g,
                    placement.color.b,
                    alpha,
                ]);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use oblako_pipeline::{BlockShaper, Dimensions, Rgb};

    const SHAPER: BlockShaper = BlockShaper { advance: 0.5 };

    fn layout_with(placements: Vec<Placement>) -> CloudLayout {
        CloudLayout {
            placements,
            dimensions: Dimensions {
                width: 40,
                height: 30,
            },
            dropped: 0,
        }
    }

    fn placement(word: &str, x: u32, y: u32, rotation: Rotation) -> Placement {
        Placement {
            word: word.to_string(),
            font_size: 8,
            x,
            y,
            rotation,
            color: Rgb::new(200, 50, 25),
        }
    }

    #[test]
    fn empty_layout_composes_to_transparent_canvas() {
        let canvas = compose(&layout_with(vec![]), &SHAPER);
        assert_eq!(canvas.dimensions(), (40, 30));
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn horizontal_placement_covers_its_box() {
        // "ab" at size 8 with advance 0.5: 8×8 box.
        let canvas = compose(
            &layout_with(vec![placement("ab", 4, 3, Rotation::Horizontal)]),
            &SHAPER,
        );

        for y in 0..30 {
            for x in 0..40 {
                let inside = (4..12).contains(&x) && (3..11).contains(&y);
                let pixel = canvas.get_pixel(x, y).0;
                if inside {
                    assert_eq!(pixel, [200, 50, 25, 255], "at ({x}, {y})");
                } else {
                    assert_eq!(pixel, [0, 0, 0, 0], "at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn vertical_placement_swaps_the_box() {
        // "abcd" at size 8: 16×8 horizontal, so 8×16 when vertical.
        let canvas = compose(
            &layout_with(vec![placement("abcd", 0, 0, Rotation::Vertical)]),
            &SHAPER,
        );

        assert_eq!(canvas.get_pixel(7, 15).0[3], 255);
        assert_eq!(canvas.get_pixel(8, 0).0[3], 0);
        assert_eq!(canvas.get_pixel(0, 16).0[3], 0);
    }

    #[test]
    fn coverage_is_clipped_at_the_canvas_edge() {
        let canvas = compose(
            &layout_with(vec![placement("abcdefgh", 36, 28, Rotation::Horizontal)]),
            &SHAPER,
        );
        // No panic, and the visible corner is painted.
        assert_eq!(canvas.get_pixel(39, 29).0[3], 255);
    }

    #[test]
    fn each_placement_keeps_its_own_color() {
        let mut first = placement("ab", 0, 0, Rotation::Horizontal);
        first.color = Rgb::new(1, 2, 3);
        let mut second = placement("ab", 20, 20, Rotation::Horizontal);
        second.color = Rgb::new(9, 8, 7);

        let canvas = compose(&layout_with(vec![first, second]), &SHAPER);
        assert_eq!(canvas.get_pixel(1, 1).0, [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(21, 21).0, [9, 8, 7, 255]);
    }
}
