//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Gradient background** | `image::RgbImage`, row-by-row fill |
//! | **Label text** | `ab_glyph` (TrueType/TTC) + `imageproc::drawing::draw_text_mut` |
//! | **Fallback text** | built-in 5×7 bitmap font + `draw_filled_rect_mut` |
//! | **Decode** | `image::load_from_memory` (format sniffed from bytes) |
//! | **JPEG quality ladder** | `image::codecs::jpeg::JpegEncoder` |
//! | **Resize** | `DynamicImage::resize_exact` with `Lanczos3` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for colors, font fitting and scaling (unit testable)
//! - **Parameters**: Value types describing what to produce
//! - **Fonts**: One-time font discovery with bitmap fallback
//! - **Placeholder**: [`PlaceholderGenerator`]
//! - **Policy**: [`ScalePolicy`] trait + [`SingleShot`] / [`Iterative`]
//! - **Compress**: [`Compressor`], combining the JPEG ladder with a policy

mod bitmap_font;
mod calculations;
pub mod compress;
mod error;
pub mod fonts;
mod params;
pub mod placeholder;
pub mod policy;

pub use compress::{CompressionOutcome, Compressor, TargetFormat, compress};
pub use error::ImagingError;
pub use fonts::{DEFAULT_FONT_CANDIDATES, FontSource, default_font_candidates};
pub use params::{CanvasSize, DEFAULT_BUDGET_BYTES, JpegLadder, PlaceholderKind, Quality};
pub use placeholder::{Palette, PlaceholderGenerator};
pub use policy::{Iterative, ScalePolicy, ScaleStrategy, SingleShot};
