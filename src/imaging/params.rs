//! Parameter types for image operations.
//!
//! These describe *what* to produce, not *how*. The generator and compressor
//! take them by value so call sites stay declarative.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`CanvasSize`]: Pixel dimensions of a generated placeholder (default 50×50).
//! - [`PlaceholderKind`]: Named canvas presets used by the backend's entities.
//! - [`JpegLadder`]: Descending quality sequence tried when recompressing JPEG.


/// Default compression budget: 100 KiB.
pub const DEFAULT_BUDGET_BYTES: usize = 100 * 1024;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Width × height of a generated canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Zero dimensions are bumped to 1 so the canvas is always drawable.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn square(edge: u32) -> Self {
        Self::new(edge, edge)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::square(50)
    }
}

/// Canvas presets for the entities that get a placeholder image.
///
/// Users, teams and activities get a small avatar; league covers are drawn
/// at twice the edge length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlaceholderKind {
    #[default]
    Avatar,
    Cover,
}

impl PlaceholderKind {
    pub fn canvas(self) -> CanvasSize {
        match self {
            Self::Avatar => CanvasSize::square(50),
            Self::Cover => CanvasSize::square(100),
        }
    }
}

/// Descending JPEG quality sequence: `start`, `start - step`, … down to `floor`.
///
/// With the defaults (90, 10, 10) that is nine qualities: 90, 80, … 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegLadder {
    pub start: Quality,
    pub step: u8,
    pub floor: Quality,
}

impl JpegLadder {
    /// Qualities to try, highest first. Never empty.
    pub fn qualities(&self) -> Vec<Quality> {
        let step = self.step.max(1);
        let floor = self.floor.value();
        let mut out = Vec::new();
        let mut q = self.start.value();
        while q >= floor {
            out.push(Quality::new(q));
            match q.checked_sub(step) {
                Some(next) => q = next,
                None => break,
            }
        }
        if out.is_empty() {
            out.push(self.floor);
        }
        out
    }
}

impl Default for JpegLadder {
    fn default() -> Self {
        Self {
            start: Quality::new(90),
            step: 10,
            floor: Quality::new(10),
        }
    }
}
