//! Placeholder image generation.
//!
//! When a user, team, activity or league has no image of its own, the
//! backend stores one of these instead: a vertical two-color gradient with
//! the entity's name centered on top.
//!
//! ```text
//! ┌──────────┐  top color     (each channel 50..=200)
//! │          │
//! │    AB    │  label: black or white, by midpoint luma
//! │          │
//! └──────────┘  bottom color
//! ```
//!
//! Colors come from an injected [`Rng`]. [`PlaceholderGenerator::generate`]
//! uses the thread-local OS-seeded generator, so repeated calls with the same
//! label differ. Tests pass a seeded `StdRng` to
//! [`PlaceholderGenerator::generate_with_rng`] instead.

use super::bitmap_font;
use super::calculations::{
    FitBounds, bitmap_scale, centered_origin, contrast_text_color, fit_font_size,
    gradient_row_color, initial_font_size, midpoint_color,
};
use super::fonts::FontSource;
use super::params::CanvasSize;
use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use rand::Rng;
use std::path::Path;
use tracing::debug;

/// Lowest and highest channel value a background color may use. Keeps
/// backgrounds mid-toned so either black or white text reads well.
const CHANNEL_RANGE: std::ops::RangeInclusive<u8> = 50..=200;

/// The two gradient endpoints of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub top: Rgb<u8>,
    pub bottom: Rgb<u8>,
}

impl Palette {
    /// Two independent colors, every channel uniform in `50..=200`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut color = || {
            Rgb([
                rng.random_range(CHANNEL_RANGE),
                rng.random_range(CHANNEL_RANGE),
                rng.random_range(CHANNEL_RANGE),
            ])
        };
        let top = color();
        let bottom = color();
        Self { top, bottom }
    }

    pub fn midpoint(&self) -> Rgb<u8> {
        midpoint_color(self.top, self.bottom)
    }

    pub fn text_color(&self) -> Rgb<u8> {
        contrast_text_color(self.midpoint())
    }
}

/// Draws placeholder images with a font resolved once at construction.
#[derive(Debug)]
pub struct PlaceholderGenerator {
    font: FontSource,
}

impl PlaceholderGenerator {
    pub fn new(font: FontSource) -> Self {
        Self { font }
    }

    /// Resolve the font from an ordered candidate list.
    pub fn with_font_candidates<P: AsRef<Path>>(candidates: &[P]) -> Self {
        Self::new(FontSource::resolve(candidates))
    }

    pub fn font(&self) -> &FontSource {
        &self.font
    }

    /// Generate a placeholder with fresh random colors.
    pub fn generate(&self, label: &str, size: CanvasSize) -> RgbImage {
        self.generate_with_rng(label, size, &mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng>(&self, label: &str, size: CanvasSize, rng: &mut R) -> RgbImage {
        let palette = Palette::random(rng);
        self.render(label, size, &palette)
    }

    /// Draw `label` over the gradient described by `palette`.
    ///
    /// An empty label yields the bare gradient.
    pub fn render(&self, label: &str, size: CanvasSize, palette: &Palette) -> RgbImage {
        let mut canvas = RgbImage::new(size.width, size.height);
        for y in 0..size.height {
            let row = gradient_row_color(palette.top, palette.bottom, y, size.height);
            for x in 0..size.width {
                canvas.put_pixel(x, y, row);
            }
        }

        if !label.is_empty() {
            self.draw_label(&mut canvas, label, palette.text_color());
        }
        canvas
    }

    fn draw_label(&self, canvas: &mut RgbImage, label: &str, color: Rgb<u8>) {
        let (width, height) = canvas.dimensions();
        let bounds = FitBounds::for_canvas(width, height);

        match &self.font {
            FontSource::TrueType { font, .. } => {
                let initial = initial_font_size(width, label.chars().count());
                let size = fit_font_size(initial, bounds, 2 * width.max(height), |s| {
                    measure(font, s, label)
                });
                debug!(label, size, "fitted font size");

                let scale = PxScale::from(size as f32);
                let Some(ink) = InkBox::of(font, scale, label) else {
                    return;
                };
                let (x, y) = centered_origin((width, height), ink.size(), ink.min());
                draw_text_mut(canvas, color, x, y, scale, font, label);
            }
            FontSource::Builtin => draw_bitmap_label(canvas, label, color, bounds),
        }
    }
}

/// Pixel-aligned bounding box of the ink a label leaves when laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InkBox {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl InkBox {
    /// Lays glyphs out exactly as `imageproc::drawing::draw_text_mut` does:
    /// baseline at the font's ascent, advancing by h-advance with kerning
    /// between outlined glyphs. `None` when nothing has an outline.
    fn of(font: &FontVec, scale: PxScale, text: &str) -> Option<Self> {
        let scaled = font.as_scaled(scale);
        let mut caret = 0f32;
        let mut last: Option<GlyphId> = None;
        let mut ink: Option<Self> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            if let Some(prev) = last {
                caret += scaled.kern(id, prev);
            }
            last = Some(id);

            let bb = outlined.px_bounds();
            let next = Self {
                min_x: bb.min.x,
                min_y: bb.min.y,
                max_x: bb.max.x,
                max_y: bb.max.y,
            };
            ink = Some(match ink {
                Some(acc) => acc.union(next),
                None => next,
            });
        }
        ink
    }

    fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn size(&self) -> (u32, u32) {
        (
            (self.max_x - self.min_x).round().max(0.0) as u32,
            (self.max_y - self.min_y).round().max(0.0) as u32,
        )
    }

    fn min(&self) -> (i32, i32) {
        (self.min_x.round() as i32, self.min_y.round() as i32)
    }
}

fn measure(font: &FontVec, size: u32, label: &str) -> (u32, u32) {
    InkBox::of(font, PxScale::from(size as f32), label)
        .map(|ink| ink.size())
        .unwrap_or((0, 0))
}

/// Draw `label` with the bitmap font at the largest integer scale that fits.
fn draw_bitmap_label(canvas: &mut RgbImage, label: &str, color: Rgb<u8>, bounds: FitBounds) {
    let (cols, rows) = bitmap_font::text_cells(label);
    let scale = bitmap_scale(cols, rows, bounds);
    let (x0, y0) = centered_origin(canvas.dimensions(), (cols * scale, rows * scale), (0, 0));

    for (col, row) in bitmap_font::lit_cells(label) {
        let rect = Rect::at(x0 + (col * scale) as i32, y0 + (row * scale) as i32).of_size(scale, scale);
        draw_filled_rect_mut(canvas, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn builtin() -> PlaceholderGenerator {
        PlaceholderGenerator::new(FontSource::Builtin)
    }

    const BRIGHT: Palette = Palette {
        top: Rgb([180, 190, 200]),
        bottom: Rgb([170, 180, 190]),
    };

    const DARK: Palette = Palette {
        top: Rgb([50, 60, 70]),
        bottom: Rgb([90, 60, 80]),
    };

    fn pixels_matching(img: &RgbImage, color: Rgb<u8>) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == color)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn output_matches_requested_dimensions() {
        let generator = builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let long = "x".repeat(50);
        let labels = ["A", "AB", "Falcons FC", "球队", long.as_str()];
        for size in [
            CanvasSize::default(),
            CanvasSize::square(100),
            CanvasSize::new(120, 40),
        ] {
            for label in labels {
                let img = generator.generate_with_rng(label, size, &mut rng);
                assert_eq!(img.dimensions(), (size.width, size.height), "label {label:?}");
            }
        }
    }

    #[test]
    fn palette_channels_stay_mid_toned() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let p = Palette::random(&mut rng);
            for channel in p.top.0.iter().chain(p.bottom.0.iter()) {
                assert!((50..=200).contains(channel), "channel {channel} out of range");
            }
        }
    }

    #[test]
    fn same_seed_same_image() {
        let generator = builtin();
        let a = generator.generate_with_rng("AB", CanvasSize::default(), &mut StdRng::seed_from_u64(3));
        let b = generator.generate_with_rng("AB", CanvasSize::default(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let palette = Palette {
            top: Rgb([60, 60, 60]),
            bottom: Rgb([190, 190, 190]),
        };
        let img = builtin().render("", CanvasSize::default(), &palette);

        assert_eq!(*img.get_pixel(0, 0), palette.top);
        assert_eq!(*img.get_pixel(49, 0), palette.top);
        // Rows are uniform, columns are not.
        assert_eq!(img.get_pixel(0, 30), img.get_pixel(45, 30));
        assert!(img.get_pixel(0, 49)[0] > img.get_pixel(0, 0)[0]);
    }

    #[test]
    fn empty_label_draws_no_text() {
        let img = builtin().render("", CanvasSize::default(), &BRIGHT);
        assert!(pixels_matching(&img, Rgb([0, 0, 0])).is_empty());
        assert!(pixels_matching(&img, Rgb([255, 255, 255])).is_empty());
    }

    #[test]
    fn bright_background_gets_black_label() {
        let img = builtin().render("AB", CanvasSize::default(), &BRIGHT);
        assert!(!pixels_matching(&img, Rgb([0, 0, 0])).is_empty());
        assert!(pixels_matching(&img, Rgb([255, 255, 255])).is_empty());
    }

    #[test]
    fn dark_background_gets_white_label() {
        let img = builtin().render("AB", CanvasSize::default(), &DARK);
        assert!(!pixels_matching(&img, Rgb([255, 255, 255])).is_empty());
        assert!(pixels_matching(&img, Rgb([0, 0, 0])).is_empty());
    }

    #[test]
    fn text_color_is_always_black_or_white() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let color = Palette::random(&mut rng).text_color();
            assert!(color == Rgb([0, 0, 0]) || color == Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn bitmap_label_is_centered_within_bounds() {
        let img = builtin().render("AB", CanvasSize::default(), &BRIGHT);
        let ink = pixels_matching(&img, Rgb([0, 0, 0]));

        let min_x = ink.iter().map(|p| p.0).min().unwrap();
        let max_x = ink.iter().map(|p| p.0).max().unwrap();
        let min_y = ink.iter().map(|p| p.1).min().unwrap();
        let max_y = ink.iter().map(|p| p.1).max().unwrap();

        // 11×7 cells at scale 3 → 33×21 block centered on 50×50
        assert_eq!((min_x, min_y), (8, 14));
        assert_eq!((max_x, max_y), (40, 34));
        assert!(max_x - min_x + 1 <= 40);
        assert!(max_y - min_y + 1 <= 40);
    }

    #[test]
    fn long_bitmap_label_is_clipped_not_panicking() {
        let img = builtin().render(&"W".repeat(40), CanvasSize::default(), &DARK);
        assert_eq!(img.dimensions(), (50, 50));
    }

    const DEJAVU_PATHS: [&str; 2] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    ];

    /// Generator drawing with DejaVu Sans, or `None` when it is not installed.
    fn dejavu() -> Option<PlaceholderGenerator> {
        let generator = PlaceholderGenerator::with_font_candidates(&DEJAVU_PATHS);
        if generator.font().is_builtin() {
            eprintln!("skipping: DejaVu Sans not found at {DEJAVU_PATHS:?}");
            return None;
        }
        Some(generator)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of pixels that differ from
    /// the bare gradient.
    fn ink_bounds(img: &RgbImage, plain: &RgbImage) -> (u32, u32, u32, u32) {
        let ink: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(x, y, p)| *p != plain.get_pixel(*x, *y))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!ink.is_empty(), "label left no ink");
        (
            ink.iter().map(|p| p.0).min().unwrap(),
            ink.iter().map(|p| p.1).min().unwrap(),
            ink.iter().map(|p| p.0).max().unwrap(),
            ink.iter().map(|p| p.1).max().unwrap(),
        )
    }

    #[test]
    fn truetype_label_fits_within_bounds() {
        let Some(generator) = dejavu() else {
            return;
        };
        let FontSource::TrueType { font, .. } = generator.font() else {
            unreachable!("dejavu() only returns TrueType generators");
        };

        let bounds = FitBounds::for_canvas(50, 50);
        let size = fit_font_size(initial_font_size(50, 2), bounds, 100, |s| measure(font, s, "AB"));
        let (w, h) = measure(font, size, "AB");
        assert!(w as f32 <= bounds.max_width && h as f32 <= bounds.max_height);
        assert!(w > 5 && h > 5, "label should not collapse: {w}×{h}");

        let img = generator.render("AB", CanvasSize::default(), &BRIGHT);
        let plain = builtin().render("", CanvasSize::default(), &BRIGHT);
        assert_ne!(img, plain);
    }

    #[test]
    fn truetype_ink_is_visually_centered() {
        let Some(generator) = dejavu() else {
            return;
        };

        for (label, size) in [
            ("AB", CanvasSize::default()),
            ("FC", CanvasSize::square(100)),
            ("gy", CanvasSize::new(80, 40)),
        ] {
            let img = generator.render(label, size, &BRIGHT);
            let plain = builtin().render("", size, &BRIGHT);
            let (min_x, min_y, max_x, max_y) = ink_bounds(&img, &plain);

            let left = min_x as i64;
            let right = (size.width - 1 - max_x) as i64;
            let top = min_y as i64;
            let bottom = (size.height - 1 - max_y) as i64;
            assert!(
                (left - right).abs() <= 1,
                "{label:?} horizontal margins {left}/{right}"
            );
            assert!(
                (top - bottom).abs() <= 1,
                "{label:?} vertical margins {top}/{bottom}"
            );
        }
    }
}
