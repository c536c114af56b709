//! Configuration module.
//!
//! Handles loading, validating, and merging a `ballkeeper-media.toml` file.
//! User values are layered over stock defaults, so a config file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [placeholder]
//! width = 50                 # Canvas width in pixels
//! height = 50                # Canvas height in pixels
//! font_paths = [...]         # Ordered font candidates, first usable wins
//!
//! [compression]
//! budget_bytes = 102400      # Maximum output size (100 KiB)
//! strategy = "single-shot"   # or "iterative"
//!
//! [compression.jpeg]
//! start_quality = 90         # First quality tried
//! quality_step = 10          # Decrement between attempts
//! min_quality = 10           # Floor; never encode below this
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    CanvasSize, Compressor, DEFAULT_BUDGET_BYTES, JpegLadder, PlaceholderGenerator, Quality,
    ScaleStrategy, default_font_candidates,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from a TOML file.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Placeholder canvas and font search path.
    pub placeholder: PlaceholderConfig,
    /// Byte budget, JPEG ladder and scale strategy.
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder.width == 0 || self.placeholder.height == 0 {
            return Err(ConfigError::Validation(
                "placeholder.width and placeholder.height must be non-zero".into(),
            ));
        }
        if self.compression.budget_bytes == 0 {
            return Err(ConfigError::Validation(
                "compression.budget_bytes must be non-zero".into(),
            ));
        }
        let jpeg = &self.compression.jpeg;
        for (name, value) in [
            ("start_quality", jpeg.start_quality),
            ("min_quality", jpeg.min_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "compression.jpeg.{name} must be 1-100"
                )));
            }
        }
        if jpeg.min_quality > jpeg.start_quality {
            return Err(ConfigError::Validation(
                "compression.jpeg.min_quality must not exceed start_quality".into(),
            ));
        }
        if jpeg.quality_step == 0 {
            return Err(ConfigError::Validation(
                "compression.jpeg.quality_step must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Placeholder generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub width: u32,
    pub height: u32,
    /// Font files to try, most preferred first. Probed once at startup.
    pub font_paths: Vec<PathBuf>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            font_paths: default_font_candidates(),
        }
    }
}

impl PlaceholderConfig {
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    /// Build a generator, resolving the font search path now.
    pub fn generator(&self) -> PlaceholderGenerator {
        PlaceholderGenerator::with_font_candidates(&self.font_paths)
    }
}

/// Recompression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Maximum acceptable output size in bytes.
    pub budget_bytes: usize,
    /// How PNG and other non-JPEG formats are resized.
    pub strategy: ScaleStrategy,
    pub jpeg: JpegConfig,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            budget_bytes: DEFAULT_BUDGET_BYTES,
            strategy: ScaleStrategy::default(),
            jpeg: JpegConfig::default(),
        }
    }
}

impl CompressionConfig {
    pub fn compressor(&self) -> Compressor {
        Compressor::new(self.budget_bytes)
            .with_ladder(self.jpeg.ladder())
            .with_policy(self.strategy.policy())
    }
}

/// JPEG quality ladder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub start_quality: u8,
    pub quality_step: u8,
    pub min_quality: u8,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            start_quality: 90,
            quality_step: 10,
            min_quality: 10,
        }
    }
}

impl JpegConfig {
    pub fn ladder(&self) -> JpegLadder {
        JpegLadder {
            start: Quality::new(self.start_quality),
            step: self.quality_step,
            floor: Quality::new(self.min_quality),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or stock defaults when no path is given.
///
/// An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let overlay = match path {
        Some(p) => Some(toml::from_str::<toml::Value>(&fs::read_to_string(p)?)?),
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ballkeeper-media configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Placeholder images
# ---------------------------------------------------------------------------
[placeholder]
# Canvas size in pixels. League covers use 100 x 100 via `--kind cover`.
width = 50
height = 50

# Font files probed once at startup, most preferred first. The first file
# that exists and parses is used. Faces with CJK coverage come first since
# labels are often Chinese names. If none work, a built-in ASCII bitmap
# font is used instead.
font_paths = [
    "/usr/share/fonts/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/zihun/zihun-xingmouhei.ttf",
    "/usr/share/fonts/chinese/TrueType/uming.ttc",
    "/usr/share/fonts/wqy-zenhei/wqy-zenhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
]

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Maximum output size in bytes. Inputs already this small are kept as-is.
budget_bytes = 102400

# How PNG and other non-JPEG images are shrunk:
#   "single-shot" - one resize by budget/size per axis (may stay over budget)
#   "iterative"   - keep shrinking until within budget (more encodes)
strategy = "single-shot"

# JPEG is re-encoded at decreasing quality until it fits.
[compression.jpeg]
start_quality = 90
quality_step = 10
min_quality = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
