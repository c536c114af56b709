//! # Ballkeeper Media
//!
//! Image utilities for a sports-league backend: generated placeholder art for
//! users and leagues that have no picture yet, and size-bounded recompression
//! of uploaded images.
//!
//! # Architecture
//!
//! Two independent services sit on top of the pure-Rust [`imaging`] module:
//!
//! ```text
//! label ──→ PlaceholderGenerator ──→ RgbImage (50×50 avatar, 100×100 cover)
//! bytes + extension ──→ Compressor ──→ bytes (≤ budget where reachable)
//! ```
//!
//! Both are synchronous and hold no mutable state after construction, so one
//! instance can be shared across threads. The [`batch`] module uses that to
//! compress many files in parallel with rayon.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Placeholder rendering, font discovery, JPEG ladder and scale policies |
//! | [`batch`] | Walks input paths, compresses files in parallel, reports per-file outcomes |
//! | [`config`] | `ballkeeper-media.toml` loading, validation and stock defaults |
//! | [`output`] | CLI output formatting for batch progress, placeholders and fonts |
//!
//! # Design Decisions
//!
//! ## Fonts Are Configuration
//!
//! No font is bundled. Labels are frequently CJK names, and a face covering
//! CJK is several megabytes. The generator probes an ordered candidate list
//! once at construction and falls back to a tiny built-in ASCII bitmap font,
//! so generation never fails for lack of a font.
//!
//! ## Injected Randomness
//!
//! Gradient colors come from an `Rng` the caller may supply. Production code
//! uses the thread RNG; tests pass a seeded `StdRng` and get identical images.
//!
//! ## Replaceable Scaling
//!
//! PNG has no quality knob, so the compressor shrinks pixel dimensions. How
//! much is decided by a [`imaging::ScalePolicy`]. The default keeps the
//! long-standing single-shot byte-ratio heuristic; an iterative policy that
//! keeps shrinking until the result fits is available through config.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
