//! Size-budgeted recompression of uploaded images.
//!
//! | Extension | Strategy |
//! |---|---|
//! | `jpg`, `jpeg` | re-encode down the [`JpegLadder`] (90, 80, … 10) until within budget |
//! | `png` | drop alpha, then resize with the [`ScalePolicy`], encode PNG |
//! | anything else `image` can write | resize with the [`ScalePolicy`], encode in that format |
//!
//! Inputs already within budget are returned untouched and never decoded.
//! Everything else is decoded by sniffing the bytes, so a mislabeled upload
//! still decodes; the extension only picks the output encoding.
//!
//! An input that cannot be decoded fails with [`ImagingError::Decode`]. When
//! a strategy runs out of options the best attempt is returned even if it
//! is still over budget.

use super::error::ImagingError;
use super::params::{DEFAULT_BUDGET_BYTES, JpegLadder, Quality};
use super::policy::{ScalePolicy, ScaleTarget, SingleShot};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::{debug, warn};

/// Output encoding chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Other(ImageFormat),
}

impl TargetFormat {
    /// Case-insensitive, leading dot optional. Fails for extensions with no
    /// compiled-in encoder.
    pub fn from_extension(extension: &str) -> Result<Self, ImagingError> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match ImageFormat::from_extension(&normalized) {
            Some(ImageFormat::Jpeg) => Ok(Self::Jpeg),
            Some(ImageFormat::Png) => Ok(Self::Png),
            Some(format) if format.writing_enabled() => Ok(Self::Other(format)),
            _ => Err(ImagingError::UnsupportedFormat(extension.to_string())),
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Other(format) => format,
        }
    }
}

/// What [`Compressor::compress_detailed`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOutcome {
    pub data: Vec<u8>,
    /// Returned as-is because it was already within budget.
    pub passthrough: bool,
    /// Quality of the JPEG encoding that was kept.
    pub quality: Option<Quality>,
    /// Output dimensions, when the input was decoded.
    pub dimensions: Option<(u32, u32)>,
    pub resized: bool,
}

impl CompressionOutcome {
    pub fn within(&self, budget: usize) -> bool {
        self.data.len() <= budget
    }
}

/// Recompresses images to fit a byte budget.
pub struct Compressor {
    budget: usize,
    ladder: JpegLadder,
    policy: Box<dyn ScalePolicy>,
}

impl Compressor {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            ladder: JpegLadder::default(),
            policy: Box::new(SingleShot),
        }
    }

    pub fn with_ladder(mut self, ladder: JpegLadder) -> Self {
        self.ladder = ladder;
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn ScalePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Compress `data` for storage under `extension`, returning the bytes.
    pub fn compress(&self, data: &[u8], extension: &str) -> Result<Vec<u8>, ImagingError> {
        self.compress_detailed(data, extension).map(|o| o.data)
    }

    pub fn compress_detailed(
        &self,
        data: &[u8],
        extension: &str,
    ) -> Result<CompressionOutcome, ImagingError> {
        if data.len() <= self.budget {
            return Ok(CompressionOutcome {
                data: data.to_vec(),
                passthrough: true,
                quality: None,
                dimensions: None,
                resized: false,
            });
        }

        let target = TargetFormat::from_extension(extension)?;
        let image = image::load_from_memory(data).map_err(ImagingError::Decode)?;
        let original = (image.width(), image.height());

        let outcome = match target {
            TargetFormat::Jpeg => {
                let (data, quality) = self.walk_jpeg_ladder(&image)?;
                CompressionOutcome {
                    data,
                    passthrough: false,
                    quality: Some(quality),
                    dimensions: Some(original),
                    resized: false,
                }
            }
            TargetFormat::Png => {
                let flattened = DynamicImage::ImageRgb8(image.to_rgb8());
                self.scale(&flattened, data.len(), ImageFormat::Png, original)?
            }
            TargetFormat::Other(format) => {
                let prepared = if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                };
                self.scale(&prepared, data.len(), format, original)?
            }
        };

        if !outcome.within(self.budget) {
            warn!(
                bytes = outcome.data.len(),
                budget = self.budget,
                "compressed image still over budget"
            );
        }
        Ok(outcome)
    }

    /// Try each ladder quality in turn; stop at the first one within budget,
    /// otherwise keep the floor-quality encoding.
    fn walk_jpeg_ladder(&self, image: &DynamicImage) -> Result<(Vec<u8>, Quality), ImagingError> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut qualities = self.ladder.qualities().into_iter();

        let first = qualities.next().unwrap_or(self.ladder.floor);
        let mut best = (encode_jpeg(&rgb, first)?, first);
        debug!(quality = first.value(), bytes = best.0.len(), "jpeg attempt");

        for quality in qualities {
            if best.0.len() <= self.budget {
                break;
            }
            best = (encode_jpeg(&rgb, quality)?, quality);
            debug!(quality = quality.value(), bytes = best.0.len(), "jpeg attempt");
        }
        Ok(best)
    }

    fn scale(
        &self,
        image: &DynamicImage,
        original_len: usize,
        format: ImageFormat,
        original: (u32, u32),
    ) -> Result<CompressionOutcome, ImagingError> {
        let encode = |img: &DynamicImage| encode_as(img, format);
        let scaled = self.policy.fit(
            image,
            ScaleTarget {
                original_len,
                budget: self.budget,
            },
            &encode,
        )?;
        Ok(CompressionOutcome {
            resized: (scaled.width, scaled.height) != original,
            dimensions: Some((scaled.width, scaled.height)),
            data: scaled.data,
            passthrough: false,
            quality: None,
        })
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET_BYTES)
    }
}

/// Compress with the default ladder and single-shot scaling.
pub fn compress(data: &[u8], extension: &str, budget: usize) -> Result<Vec<u8>, ImagingError> {
    Compressor::new(budget).compress(data, extension)
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
    image
        .write_with_encoder(encoder)
        .map_err(|source| ImagingError::Encode {
            format: ImageFormat::Jpeg,
            source,
        })?;
    Ok(buf)
}

fn encode_as(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImagingError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .map_err(|source| ImagingError::Encode { format, source })?;
    Ok(cursor.into_inner())
}
