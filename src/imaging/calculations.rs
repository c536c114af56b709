//! Pure calculation functions for placeholder drawing and recompression.
//!
//! All functions here are pure and testable without any I/O or images.

use image::Rgb;

/// Fraction of the canvas the label's ink box may occupy on each axis.
pub const TEXT_FILL_RATIO: f32 = 0.8;

/// Smallest TrueType size the shrink phase will settle on.
pub const MIN_FONT_SIZE: u32 = 8;

/// Multiplier applied per shrink step.
const SHRINK_FACTOR: f64 = 0.9;

/// Color of gradient row `y` on a canvas `height` rows tall.
///
/// Linear per-channel interpolation from `top` (row 0) towards `bottom`,
/// truncated to integer: `top * (1 - y/h) + bottom * (y/h)`.
pub fn gradient_row_color(top: Rgb<u8>, bottom: Rgb<u8>, y: u32, height: u32) -> Rgb<u8> {
    let ratio = y as f64 / height.max(1) as f64;
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - ratio) + b as f64 * ratio) as u8;
    Rgb([
        mix(top[0], bottom[0]),
        mix(top[1], bottom[1]),
        mix(top[2], bottom[2]),
    ])
}

/// The 50/50 blend of two colors, truncated per channel.
pub fn midpoint_color(a: Rgb<u8>, b: Rgb<u8>) -> Rgb<u8> {
    let half = |x: u8, y: u8| (x as f64 * 0.5 + y as f64 * 0.5) as u8;
    Rgb([half(a[0], b[0]), half(a[1], b[1]), half(a[2], b[2])])
}

/// Perceptual brightness, `0.299R + 0.587G + 0.114B`.
pub fn luma(color: Rgb<u8>) -> f64 {
    (color[0] as f64 * 299.0 + color[1] as f64 * 587.0 + color[2] as f64 * 114.0) / 1000.0
}

/// Pure black on bright backgrounds (luma > 128), pure white otherwise.
pub fn contrast_text_color(background: Rgb<u8>) -> Rgb<u8> {
    if luma(background) > 128.0 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Starting font size: canvas width split across the label's characters.
///
/// Labels shorter than two characters are treated as two wide so a single
/// glyph does not start at full canvas width. Never returns 0.
pub fn initial_font_size(canvas_width: u32, label_chars: usize) -> u32 {
    let divisor = label_chars.max(2) as u32;
    (canvas_width / divisor).max(1)
}

/// Maximum ink box a label may occupy on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
    pub max_width: f32,
    pub max_height: f32,
}

impl FitBounds {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            max_width: width as f32 * TEXT_FILL_RATIO,
            max_height: height as f32 * TEXT_FILL_RATIO,
        }
    }

    fn exceeded_by(&self, (w, h): (u32, u32)) -> bool {
        w as f32 > self.max_width || h as f32 > self.max_height
    }

    fn strictly_contains(&self, (w, h): (u32, u32)) -> bool {
        (w as f32) < self.max_width && (h as f32) < self.max_height
    }
}

/// Search for the font size whose measured ink box fits `bounds`.
///
/// `measure(size)` returns the ink `(width, height)` at that size.
///
/// Two phases, picked by measuring `initial`:
/// - **shrink**: while too large, multiply by 0.9 (truncating). Dropping
///   below [`MIN_FONT_SIZE`] returns the floor even if it still overflows.
/// - **grow**: step up by 1 while the next size still sits strictly inside
///   the bounds. `max_size` caps growth for labels that measure as empty.
///   An `initial` that lands exactly on a bound is kept, not stepped down.
pub fn fit_font_size(
    initial: u32,
    bounds: FitBounds,
    max_size: u32,
    mut measure: impl FnMut(u32) -> (u32, u32),
) -> u32 {
    let mut size = initial.max(1);

    if bounds.exceeded_by(measure(size)) {
        loop {
            size = (size as f64 * SHRINK_FACTOR) as u32;
            if size < MIN_FONT_SIZE {
                return MIN_FONT_SIZE;
            }
            if !bounds.exceeded_by(measure(size)) {
                return size;
            }
        }
    }

    while size < max_size && bounds.strictly_contains(measure(size + 1)) {
        size += 1;
    }
    size
}

/// Largest integer pixel scale at which a `cols × rows` bitmap block fits
/// inside `bounds`. At least 1.
pub fn bitmap_scale(cols: u32, rows: u32, bounds: FitBounds) -> u32 {
    if cols == 0 || rows == 0 {
        return 1;
    }
    let by_width = (bounds.max_width / cols as f32).floor() as u32;
    let by_height = (bounds.max_height / rows as f32).floor() as u32;
    by_width.min(by_height).max(1)
}

/// Top-left draw origin that visually centers an ink box on the canvas.
///
/// `ink_min` is the ink box's offset from the renderer's own origin (for
/// TrueType this includes the baseline offset), so it is subtracted to land
/// the ink, not the layout origin, at the center.
pub fn centered_origin(canvas: (u32, u32), ink_size: (u32, u32), ink_min: (i32, i32)) -> (i32, i32) {
    let x = (canvas.0 as i32 - ink_size.0 as i32).div_euclid(2) - ink_min.0;
    let y = (canvas.1 as i32 - ink_size.1 as i32).div_euclid(2) - ink_min.1;
    (x, y)
}

/// Linear scale factor `min(1, budget / original_len)`.
///
/// This treats a byte ratio as a per-axis pixel ratio. Encoded size does
/// not scale linearly with edge length, so the result is an estimate only.
pub fn budget_scale_factor(budget: usize, original_len: usize) -> f64 {
    if original_len == 0 {
        return 1.0;
    }
    (budget as f64 / original_len as f64).min(1.0)
}

/// Apply `factor` to both dimensions, truncating, never below 1 pixel.
pub fn scaled_dimensions(dimensions: (u32, u32), factor: f64) -> (u32, u32) {
    let (w, h) = dimensions;
    let scale = |d: u32| ((d as f64 * factor) as u32).max(1);
    (scale(w), scale(h))
}
