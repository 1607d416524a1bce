//! Target-size quality search.
//!
//! Bisects encoder quality over `[0, 1]` for a fixed number of rounds. Each
//! round encodes at the midpoint: a fitting result raises the floor and becomes
//! the best candidate, an oversized one lowers the ceiling. Ten rounds resolve
//! quality to 1/1024 without needing a size → quality inverse from the codec.

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{EncodingAdvisory, ReducerConfig};
use crate::processing::Encoder;
use crate::utils::size::kib;
use crate::utils::{OutputFormat, ReducerResult};

/// How the returned bytes were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStrategy {
    /// Best bisection candidate within budget
    Bisected,
    /// No candidate fit; encoded once at the fallback quality
    Fallback,
    /// Lossless format, encoded once at default settings
    SinglePass,
}

/// One bisection round. Bounds are the values after the round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStep {
    pub quality: f64,
    pub size: u64,
    pub accepted: bool,
    pub min_quality: f64,
    pub max_quality: f64,
}

/// Encoded bytes plus how they were found.
#[derive(Debug)]
pub struct EncodedResult {
    pub bytes: Vec<u8>,
    pub quality: Option<f64>,
    pub strategy: SearchStrategy,
    pub steps: Vec<SearchStep>,
    pub advisories: Vec<EncodingAdvisory>,
}

impl EncodedResult {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySearch {
    iterations: u32,
    fallback_quality: f64,
}

impl Default for QualitySearch {
    fn default() -> Self {
        Self::from_config(&ReducerConfig::default())
    }
}

impl QualitySearch {
    pub fn new(iterations: u32, fallback_quality: f64) -> Self {
        Self {
            iterations,
            fallback_quality,
        }
    }

    pub fn from_config(config: &ReducerConfig) -> Self {
        Self::new(config.search_iterations, config.fallback_quality)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Finds the highest quality whose output fits in `target_bytes`.
    ///
    /// Never fails for lack of a fitting quality: it falls back to
    /// `fallback_quality` and reports [`EncodingAdvisory::BudgetExceeded`]
    /// if that is still too large. Encoder errors propagate unchanged.
    pub fn run<E: Encoder + ?Sized>(
        &self,
        encoder: &E,
        pixels: &DynamicImage,
        format: OutputFormat,
        target_bytes: u64,
    ) -> ReducerResult<EncodedResult> {
        if format.is_lossless() {
            return self.single_pass(encoder, pixels, format);
        }

        let mut min_quality = 0.0_f64;
        let mut max_quality = 1.0_f64;
        let mut best: Option<(f64, Vec<u8>)> = None;
        let mut steps = Vec::with_capacity(self.iterations as usize);

        for round in 1..=self.iterations {
            let quality = (min_quality + max_quality) / 2.0;
            let bytes = encoder.encode(pixels, format, Some(quality))?;
            let size = bytes.len() as u64;
            let accepted = size <= target_bytes;

            if accepted {
                min_quality = quality;
                best = Some((quality, bytes));
            } else {
                max_quality = quality;
            }

            debug!(
                "Search {}/{}: q={:.4} → {:.2} KB ({})",
                round,
                self.iterations,
                quality,
                kib(size),
                if accepted { "fits" } else { "too large" }
            );

            steps.push(SearchStep {
                quality,
                size,
                accepted,
                min_quality,
                max_quality,
            });
        }

        if let Some((quality, bytes)) = best {
            return Ok(EncodedResult {
                bytes,
                quality: Some(quality),
                strategy: SearchStrategy::Bisected,
                steps,
                advisories: Vec::new(),
            });
        }

        let bytes = encoder.encode(pixels, format, Some(self.fallback_quality))?;
        let size = bytes.len() as u64;
        let mut advisories = Vec::new();
        if size > target_bytes {
            warn!(
                "No quality fits {:.2} KB; falling back to q={} ({:.2} KB)",
                kib(target_bytes),
                self.fallback_quality,
                kib(size)
            );
            advisories.push(EncodingAdvisory::BudgetExceeded {
                target_bytes,
                actual_bytes: size,
            });
        }

        Ok(EncodedResult {
            bytes,
            quality: Some(self.fallback_quality),
            strategy: SearchStrategy::Fallback,
            steps,
            advisories,
        })
    }

    fn single_pass<E: Encoder + ?Sized>(
        &self,
        encoder: &E,
        pixels: &DynamicImage,
        format: OutputFormat,
    ) -> ReducerResult<EncodedResult> {
        debug!("{} is lossless; encoding once at default settings", format);
        let bytes = encoder.encode(pixels, format, None)?;

        Ok(EncodedResult {
            bytes,
            quality: None,
            strategy: SearchStrategy::SinglePass,
            steps: Vec::new(),
            advisories: vec![EncodingAdvisory::LosslessFormat { format }],
        })
    }
}

/// Runs a default [`QualitySearch`] (10 rounds, 0.1 fallback).
pub fn search<E: Encoder + ?Sized>(
    pixels: &DynamicImage,
    format: OutputFormat,
    target_bytes: u64,
    encoder: &E,
) -> ReducerResult<EncodedResult> {
    QualitySearch::default().run(encoder, pixels, format, target_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ReducerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Size grows linearly with quality: 1000 bytes at q=0 up to 11000 at q=1.
    struct LinearEncoder {
        calls: AtomicUsize,
    }

    impl LinearEncoder {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    impl Encoder for LinearEncoder {
        fn encode(
            &self,
            _pixels: &DynamicImage,
            _format: OutputFormat,
            quality: Option<f64>,
        ) -> ReducerResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let q = quality.unwrap_or(1.0);
            Ok(vec![0; 1000 + (q * 10_000.0) as usize])
        }
    }

    fn pixels() -> DynamicImage {
        DynamicImage::new_rgb8(1, 1)
    }

    #[test]
    fn finds_highest_fitting_quality() {
        let encoder = LinearEncoder::new();
        let result = search(&pixels(), OutputFormat::Jpeg, 6000, &encoder).unwrap();

        assert_eq!(result.strategy, SearchStrategy::Bisected);
        assert!(result.size() <= 6000);
        // q=0.5 maps to exactly 6000 bytes; bisection converges on it from below
        let q = result.quality.unwrap();
        assert!((q - 0.5).abs() < 1.0 / 1024.0, "q={q}");
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 10);
        assert_eq!(result.steps.len(), 10);
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn falls_back_when_nothing_fits() {
        let encoder = LinearEncoder::new();
        let result = search(&pixels(), OutputFormat::Webp, 500, &encoder).unwrap();

        assert_eq!(result.strategy, SearchStrategy::Fallback);
        assert_eq!(result.quality, Some(0.1));
        assert_eq!(result.size(), 2000);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 11);
        assert_eq!(
            result.advisories,
            vec![EncodingAdvisory::BudgetExceeded { target_bytes: 500, actual_bytes: 2000 }]
        );
        assert!(result.steps.iter().all(|s| !s.accepted));
    }

    #[test]
    fn lossless_encodes_once_with_advisory() {
        let encoder = LinearEncoder::new();
        let result = search(&pixels(), OutputFormat::Png, 10, &encoder).unwrap();

        assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.strategy, SearchStrategy::SinglePass);
        assert_eq!(result.quality, None);
        assert!(result.steps.is_empty());
        assert_eq!(
            result.advisories,
            vec![EncodingAdvisory::LosslessFormat { format: OutputFormat::Png }]
        );
    }

    #[test]
    fn encoder_failure_is_fatal() {
        let calls = AtomicUsize::new(0);
        let failing = |_: &DynamicImage, _: OutputFormat, _: Option<f64>| -> ReducerResult<Vec<u8>> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ReducerError::encoding("boom"))
        };

        let err = search(&pixels(), OutputFormat::Jpeg, 1000, &failing).unwrap_err();
        assert!(err.is_fatal());
        // No retry after the first failure
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn iteration_count_is_configurable() {
        let encoder = LinearEncoder::new();
        let result = QualitySearch::new(4, 0.1)
            .run(&encoder, &pixels(), OutputFormat::Jpeg, 6000)
            .unwrap();
        assert_eq!(result.steps.len(), 4);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn first_round_probes_the_midpoint() {
        let encoder = LinearEncoder::new();
        let result = search(&pixels(), OutputFormat::Jpeg, 11_000, &encoder).unwrap();
        assert_eq!(result.steps[0].quality, 0.5);
        assert!(result.steps[0].accepted);
        assert_eq!(result.steps[1].quality, 0.75);
    }
}
