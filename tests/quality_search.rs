// Properties of the target-size quality search, checked against synthetic encoders.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::DynamicImage;
use image_reducer_lib::core::EncodingAdvisory;
use image_reducer_lib::processing::{QualitySearch, SearchStrategy};
use image_reducer_lib::{Encoder, OutputFormat, ReducerResult, search};
use proptest::prelude::*;

/// Size rises monotonically with quality: `base + floor(q * span)` bytes.
struct MonotoneEncoder {
    base: u64,
    span: u64,
    calls: AtomicUsize,
}

impl MonotoneEncoder {
    fn new(base: u64, span: u64) -> Self {
        Self { base, span, calls: AtomicUsize::new(0) }
    }

    fn size_at(&self, quality: f64) -> u64 {
        self.base + (quality * self.span as f64).floor() as u64
    }
}

impl Encoder for MonotoneEncoder {
    fn encode(
        &self,
        _pixels: &DynamicImage,
        _format: OutputFormat,
        quality: Option<f64>,
    ) -> ReducerResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0; self.size_at(quality.unwrap_or(1.0)) as usize])
    }
}

/// Size jumps around with quality, like a real codec near its quantizer steps.
struct JitteryEncoder {
    seed: u64,
}

impl Encoder for JitteryEncoder {
    fn encode(
        &self,
        _pixels: &DynamicImage,
        _format: OutputFormat,
        quality: Option<f64>,
    ) -> ReducerResult<Vec<u8>> {
        let q = quality.unwrap_or(1.0);
        let mut x = q.to_bits() ^ self.seed;
        x ^= x >> 33;
        x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
        x ^= x >> 33;
        let noise = x % 2_000;
        Ok(vec![0; (1_000 + (q * 8_000.0) as u64 + noise) as usize])
    }
}

fn pixels() -> DynamicImage {
    DynamicImage::new_rgb8(1, 1)
}

/// Largest k/1024 (k in 1..=1023) whose size fits, if any.
fn best_grid_quality(encoder: &MonotoneEncoder, target: u64) -> Option<f64> {
    (1..1024u32)
        .rev()
        .map(|k| k as f64 / 1024.0)
        .find(|&q| encoder.size_at(q) <= target)
}

proptest! {
    #[test]
    fn meets_budget_whenever_the_grid_allows(target in 1u64..60_000, base in 0u64..2_000) {
        let encoder = MonotoneEncoder::new(base, 50_000);
        let result = search(&pixels(), OutputFormat::Jpeg, target, &encoder).unwrap();

        match best_grid_quality(&encoder, target) {
            Some(q) => {
                prop_assert_eq!(result.strategy, SearchStrategy::Bisected);
                prop_assert!(result.size() <= target);
                prop_assert_eq!(result.quality, Some(q));
                prop_assert!(result.advisories.is_empty());
                prop_assert_eq!(encoder.calls.load(Ordering::SeqCst), 10);
            }
            None => {
                prop_assert_eq!(result.strategy, SearchStrategy::Fallback);
                prop_assert_eq!(result.quality, Some(0.1));
                prop_assert!(!result.bytes.is_empty());
                prop_assert_eq!(encoder.calls.load(Ordering::SeqCst), 11);
            }
        }
    }

    #[test]
    fn bisection_bounds_only_tighten(target in 1u64..12_000, seed in any::<u64>()) {
        let encoder = JitteryEncoder { seed };
        let result = search(&pixels(), OutputFormat::Webp, target, &encoder).unwrap();

        let mut min = 0.0_f64;
        let mut max = 1.0_f64;
        for step in &result.steps {
            prop_assert!(step.min_quality >= min);
            prop_assert!(step.max_quality <= max);
            prop_assert!(step.min_quality < step.max_quality);
            if step.accepted {
                prop_assert!(step.size <= target);
                prop_assert_eq!(step.min_quality, step.quality);
            } else {
                prop_assert!(step.size > target);
                prop_assert_eq!(step.max_quality, step.quality);
            }
            min = step.min_quality;
            max = step.max_quality;
        }

        let any_accepted = result.steps.iter().any(|s| s.accepted);
        if any_accepted {
            prop_assert_eq!(result.strategy, SearchStrategy::Bisected);
            prop_assert!(result.size() <= target);
            let last_accepted = result.steps.iter().rev().find(|s| s.accepted).map(|s| s.quality);
            prop_assert_eq!(result.quality, last_accepted);
        } else {
            prop_assert_eq!(result.strategy, SearchStrategy::Fallback);
        }
    }

    #[test]
    fn fallback_flags_oversized_output(target in 1u64..1_000) {
        let encoder = MonotoneEncoder::new(1_000, 10_000);
        let result = search(&pixels(), OutputFormat::Jpeg, target, &encoder).unwrap();

        prop_assert_eq!(result.strategy, SearchStrategy::Fallback);
        prop_assert_eq!(
            result.advisories,
            vec![EncodingAdvisory::BudgetExceeded { target_bytes: target, actual_bytes: 2_000 }]
        );
    }
}

#[test]
fn lossless_format_skips_the_search() {
    let encoder = MonotoneEncoder::new(500, 10_000);
    let result = search(&pixels(), OutputFormat::Png, 100, &encoder).unwrap();

    assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.strategy, SearchStrategy::SinglePass);
    assert_eq!(result.size(), 10_500);
    assert_eq!(
        result.advisories,
        vec![EncodingAdvisory::LosslessFormat { format: OutputFormat::Png }]
    );
}

#[test]
fn fallback_within_budget_has_no_advisory() {
    // Only q=0.1 is small enough: the grid misses it, the fallback lands in budget
    let picky = |_: &DynamicImage, _: OutputFormat, q: Option<f64>| -> ReducerResult<Vec<u8>> {
        let q = q.unwrap_or(1.0);
        Ok(vec![0; if q == 0.1 { 10 } else { 1_000 }])
    };

    let result = search(&pixels(), OutputFormat::Jpeg, 100, &picky).unwrap();
    assert_eq!(result.strategy, SearchStrategy::Fallback);
    assert_eq!(result.size(), 10);
    assert!(result.advisories.is_empty());
}

#[test]
fn more_rounds_refine_quality() {
    let encoder = MonotoneEncoder::new(0, 1_000_000);
    let coarse = QualitySearch::new(4, 0.1)
        .run(&encoder, &pixels(), OutputFormat::Jpeg, 333_333)
        .unwrap();
    let fine = QualitySearch::new(20, 0.1)
        .run(&encoder, &pixels(), OutputFormat::Jpeg, 333_333)
        .unwrap();

    // floor(q * 1e6) <= 333_333 holds exactly for q < 0.333334
    let limit = 0.333_334;
    let coarse_gap = limit - coarse.quality.unwrap();
    let fine_gap = limit - fine.quality.unwrap();
    assert!(fine_gap > 0.0 && coarse_gap > 0.0);
    assert!(fine_gap < coarse_gap);
    assert!(fine_gap <= 1.0 / (1u64 << 20) as f64 + 1e-12);
}
