//! Output-dimension strategies for non-JPEG recompression.
//!
//! JPEG has a quality knob; PNG and the other formats the compressor handles
//! do not, so the only lever is pixel count. A [`ScalePolicy`] decides the
//! output dimensions, resamples and encodes.
//!
//! | Policy | Encodes | Guarantees budget |
//! |---|---|---|
//! | [`SingleShot`] | 1 | no |
//! | [`Iterative`] | up to `max_attempts` | when reachable within the attempts |
//!
//! `SingleShot` is the default and keeps the historical heuristic: the
//! byte ratio `budget / original_len` is used as a *per-axis* scale factor.
//! For most content that undershoots (bytes track area, not edge length), but
//! output dominated by fixed overhead can land over budget.

use super::calculations::{budget_scale_factor, scaled_dimensions};
use super::error::ImagingError;
use image::DynamicImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Encodes an image to bytes in whatever format the caller chose.
pub type EncodeFn<'a> = dyn Fn(&DynamicImage) -> Result<Vec<u8>, ImagingError> + 'a;

/// Sizes involved in a scaling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTarget {
    /// Length of the input as uploaded.
    pub original_len: usize,
    pub budget: usize,
}

/// An encoded, possibly resized image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaled {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub trait ScalePolicy: Send + Sync {
    /// Resize `image` towards `target.budget` and encode it with `encode`.
    fn fit(
        &self,
        image: &DynamicImage,
        target: ScaleTarget,
        encode: &EncodeFn<'_>,
    ) -> Result<Scaled, ImagingError>;

    fn name(&self) -> &'static str;
}

/// Lets one policy instance be shared between compressors.
impl<P: ScalePolicy + ?Sized> ScalePolicy for Arc<P> {
    fn fit(
        &self,
        image: &DynamicImage,
        target: ScaleTarget,
        encode: &EncodeFn<'_>,
    ) -> Result<Scaled, ImagingError> {
        (**self).fit(image, target, encode)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Config/CLI selector for the built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleStrategy {
    #[default]
    SingleShot,
    Iterative,
}

impl ScaleStrategy {
    pub fn policy(self) -> Box<dyn ScalePolicy> {
        match self {
            Self::SingleShot => Box::new(SingleShot),
            Self::Iterative => Box::new(Iterative::default()),
        }
    }
}

/// High-quality resample to exactly `dims`; a no-op clone when unchanged.
fn resample(image: &DynamicImage, dims: (u32, u32)) -> DynamicImage {
    if (image.width(), image.height()) == dims {
        image.clone()
    } else {
        image.resize_exact(dims.0, dims.1, FilterType::Lanczos3)
    }
}

/// One resize by `min(1, budget / original_len)` per axis, one encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleShot;

impl ScalePolicy for SingleShot {
    fn fit(
        &self,
        image: &DynamicImage,
        target: ScaleTarget,
        encode: &EncodeFn<'_>,
    ) -> Result<Scaled, ImagingError> {
        let factor = budget_scale_factor(target.budget, target.original_len);
        let (width, height) = scaled_dimensions((image.width(), image.height()), factor);
        debug!(factor, width, height, "single-shot scale");

        let data = encode(&resample(image, (width, height)))?;
        Ok(Scaled {
            data,
            width,
            height,
        })
    }

    fn name(&self) -> &'static str {
        "single-shot"
    }
}

/// Starts from the single-shot estimate, then keeps shrinking by an
/// area-based step `sqrt(budget / encoded_len) * margin` until the encoding
/// fits, the image is 1×1, or `max_attempts` encodes have been spent.
#[derive(Debug, Clone, Copy)]
pub struct Iterative {
    pub max_attempts: u32,
    pub margin: f64,
}

impl Default for Iterative {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            margin: 0.9,
        }
    }
}

impl ScalePolicy for Iterative {
    fn fit(
        &self,
        image: &DynamicImage,
        target: ScaleTarget,
        encode: &EncodeFn<'_>,
    ) -> Result<Scaled, ImagingError> {
        let original = (image.width(), image.height());
        let mut factor = budget_scale_factor(target.budget, target.original_len);
        let mut dims = scaled_dimensions(original, factor);
        let mut data = encode(&resample(image, dims))?;

        for attempt in 1..self.max_attempts {
            if data.len() <= target.budget || dims == (1, 1) {
                break;
            }
            factor *= (target.budget as f64 / data.len() as f64).sqrt() * self.margin;
            let mut next = scaled_dimensions(original, factor);
            if next == dims {
                next = (dims.0.saturating_sub(1).max(1), dims.1.saturating_sub(1).max(1));
            }
            dims = next;
            data = encode(&resample(image, dims))?;
            debug!(attempt, factor, width = dims.0, height = dims.1, bytes = data.len(), "iterative scale");
        }

        Ok(Scaled {
            data,
            width: dims.0,
            height: dims.1,
        })
    }

    fn name(&self) -> &'static str {
        "iterative"
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{ColorType, RgbImage};
    use std::sync::Mutex;

    /// Policy that records what it was asked to fit and encodes unchanged.
    /// Uses Mutex (not RefCell) so it is Sync like real policies.
    #[derive(Default)]
    pub struct MockPolicy {
        pub calls: Mutex<Vec<RecordedFit>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedFit {
        pub width: u32,
        pub height: u32,
        pub color: ColorType,
        pub target: ScaleTarget,
    }

    impl MockPolicy {
        pub fn get_calls(&self) -> Vec<RecordedFit> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ScalePolicy for MockPolicy {
        fn fit(
            &self,
            image: &DynamicImage,
            target: ScaleTarget,
            encode: &EncodeFn<'_>,
        ) -> Result<Scaled, ImagingError> {
            self.calls.lock().unwrap().push(RecordedFit {
                width: image.width(),
                height: image.height(),
                color: image.color(),
                target,
            });
            Ok(Scaled {
                data: encode(image)?,
                width: image.width(),
                height: image.height(),
            })
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    /// Fake encoding whose size is a fixed overhead plus one byte per pixel.
    fn overhead_encoder(overhead: usize) -> impl Fn(&DynamicImage) -> Result<Vec<u8>, ImagingError> {
        move |img| Ok(vec![0; overhead + (img.width() * img.height()) as usize])
    }

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn single_shot_scales_by_byte_ratio() {
        let encode = overhead_encoder(0);
        let scaled = SingleShot
            .fit(
                &blank(400, 200),
                ScaleTarget {
                    original_len: 80_000,
                    budget: 20_000,
                },
                &encode,
            )
            .unwrap();
        assert_eq!((scaled.width, scaled.height), (100, 50));
        assert_eq!(scaled.data.len(), 5_000);
    }

    #[test]
    fn single_shot_keeps_dimensions_when_budget_exceeds_input() {
        let encode = overhead_encoder(0);
        let scaled = SingleShot
            .fit(
                &blank(40, 30),
                ScaleTarget {
                    original_len: 1_000,
                    budget: 5_000,
                },
                &encode,
            )
            .unwrap();
        assert_eq!((scaled.width, scaled.height), (40, 30));
    }

    #[test]
    fn single_shot_can_overshoot_when_overhead_dominates() {
        // 200×200 + 20k overhead = 60k; factor 25k/60k → 83×83 → 26 889 bytes
        let encode = overhead_encoder(20_000);
        let target = ScaleTarget {
            original_len: 60_000,
            budget: 25_000,
        };
        let scaled = SingleShot.fit(&blank(200, 200), target, &encode).unwrap();
        assert_eq!((scaled.width, scaled.height), (83, 83));
        assert!(scaled.data.len() > target.budget);
    }

    #[test]
    fn iterative_converges_where_single_shot_overshoots() {
        let encode = overhead_encoder(20_000);
        let target = ScaleTarget {
            original_len: 60_000,
            budget: 25_000,
        };
        let scaled = Iterative::default()
            .fit(&blank(200, 200), target, &encode)
            .unwrap();
        assert!(scaled.data.len() <= target.budget);
        assert!(scaled.width < 83 && scaled.height < 83);
    }

    #[test]
    fn iterative_stops_at_attempt_cap() {
        // Overhead alone exceeds the budget, so it can never fit.
        let encode = overhead_encoder(50_000);
        let calls = Mutex::new(0u32);
        let counting = |img: &DynamicImage| {
            *calls.lock().unwrap() += 1;
            encode(img)
        };
        let policy = Iterative {
            max_attempts: 4,
            margin: 0.9,
        };
        let scaled = policy
            .fit(
                &blank(300, 300),
                ScaleTarget {
                    original_len: 140_000,
                    budget: 10_000,
                },
                &counting,
            )
            .unwrap();
        assert!(scaled.data.len() > 10_000);
        assert!(*calls.lock().unwrap() <= 4);
    }

    #[test]
    fn iterative_stops_at_one_pixel() {
        let encode = overhead_encoder(100);
        let scaled = Iterative::default()
            .fit(
                &blank(10, 10),
                ScaleTarget {
                    original_len: 200,
                    budget: 50,
                },
                &encode,
            )
            .unwrap();
        assert_eq!((scaled.width, scaled.height), (1, 1));
    }

    #[test]
    fn strategy_names_round_trip_through_policy() {
        assert_eq!(ScaleStrategy::SingleShot.policy().name(), "single-shot");
        assert_eq!(ScaleStrategy::Iterative.policy().name(), "iterative");
        assert_eq!(ScaleStrategy::default(), ScaleStrategy::SingleShot);
    }

    #[test]
    fn mock_records_fit_requests() {
        let mock = MockPolicy::default();
        let encode = overhead_encoder(0);
        let target = ScaleTarget {
            original_len: 10,
            budget: 5,
        };
        mock.fit(&blank(8, 6), target, &encode).unwrap();

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            RecordedFit {
                width: 8,
                height: 6,
                color: ColorType::Rgb8,
                target,
            }
        );
    }
}
