//! Core types for requests, results and user-facing advisories.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::core::store::RetrievalHandle;
use crate::processing::SearchStrategy;
use crate::utils::{
    OutputFormat, ValidationError, format_bytes, format_signed_bytes, percentage_saved,
    saved_bytes, validate_target_budget,
};

/// A decoded upload.
///
/// Immutable once created; dropped when the session returns to Upload.
#[derive(Debug)]
pub struct SourceImage {
    /// Decoded pixel buffer handed to the encoder
    pub pixels: DynamicImage,
    /// Size of the uploaded file in bytes
    pub original_size: u64,
    /// MIME type declared by the caller
    pub mime_type: String,
    /// Format the upload decoded as; the default output format
    pub format: OutputFormat,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Unit selector next to the target size input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeUnit {
    Kb,
    Mb,
}

impl SizeUnit {
    pub fn multiplier(&self) -> u64 {
        match self {
            Self::Kb => 1024,
            Self::Mb => 1024 * 1024,
        }
    }
}

/// Raw target size as typed by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub value: String,
    pub unit: SizeUnit,
}

impl TargetSize {
    pub fn new(value: impl Into<String>, unit: SizeUnit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }

    pub fn kilobytes(value: u64) -> Self {
        Self::new(value.to_string(), SizeUnit::Kb)
    }

    pub fn megabytes(value: u64) -> Self {
        Self::new(value.to_string(), SizeUnit::Mb)
    }
}

/// A validated compression request.
///
/// `target_bytes` is always smaller than the source's original size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionRequest {
    pub(crate) target_bytes: u64,
    pub(crate) format: OutputFormat,
}

impl CompressionRequest {
    pub fn new(
        target_bytes: u64,
        format: OutputFormat,
        source: &SourceImage,
    ) -> Result<Self, ValidationError> {
        validate_target_budget(target_bytes, source.original_size)?;
        Ok(Self {
            target_bytes,
            format,
        })
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Non-fatal notices produced while encoding. Processing always continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EncodingAdvisory {
    /// The format ignores quality, so the budget was not searched for
    #[serde(rename_all = "camelCase")]
    LosslessFormat { format: OutputFormat },
    /// No quality met the budget; the fallback result is larger than requested
    #[serde(rename_all = "camelCase")]
    BudgetExceeded { target_bytes: u64, actual_bytes: u64 },
}

impl fmt::Display for EncodingAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LosslessFormat { format } => write!(
                f,
                "For best results and target size compression, please choose JPG or WEBP. \
                 {} compression is lossless and may not reduce size significantly.",
                format.extension().to_uppercase()
            ),
            Self::BudgetExceeded { target_bytes, actual_bytes } => write!(
                f,
                "Could not reach the target size of {}. The smallest result is {}.",
                format_bytes(*target_bytes),
                format_bytes(*actual_bytes)
            ),
        }
    }
}

/// Original vs compressed sizes with savings statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub original_size: u64,
    pub compressed_size: u64,
    /// Bytes saved (negative if the output grew)
    pub saved_bytes: i64,
    /// Percentage saved, rounded to one decimal
    pub percentage_saved: f64,
}

impl CompressionSummary {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        Self {
            original_size,
            compressed_size,
            saved_bytes: saved_bytes(original_size, compressed_size),
            percentage_saved: percentage_saved(original_size, compressed_size),
        }
    }

    pub fn original_text(&self) -> String {
        format_bytes(self.original_size)
    }

    pub fn compressed_text(&self) -> String {
        format_bytes(self.compressed_size)
    }

    /// Savings line, e.g. `732.42 KB (75.0%)`
    pub fn savings_text(&self) -> String {
        format!(
            "{} ({:.1}%)",
            format_signed_bytes(self.saved_bytes),
            self.percentage_saved
        )
    }
}

/// Outcome of a finished search, owned by the Download view.
///
/// Holds the only retrieval handle for its bytes; not `Clone`.
#[derive(Debug)]
pub struct CompressionResult {
    pub bytes: Arc<[u8]>,
    pub handle: RetrievalHandle,
    pub filename: String,
    pub format: OutputFormat,
    /// Quality the bytes were encoded at; `None` for default encoder settings
    pub quality: Option<f64>,
    pub strategy: SearchStrategy,
    pub advisories: Vec<EncodingAdvisory>,
    pub summary: CompressionSummary,
}

impl CompressionResult {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Serializable snapshot for callers that outlive the session.
    pub fn report(&self) -> CompressionReport {
        CompressionReport {
            filename: self.filename.clone(),
            uri: self.handle.uri().to_string(),
            format: self.format,
            quality: self.quality,
            strategy: self.strategy,
            summary: self.summary,
            original_size_text: self.summary.original_text(),
            compressed_size_text: self.summary.compressed_text(),
            savings_text: self.summary.savings_text(),
            advisories: self.advisories.clone(),
        }
    }
}

/// What the Download view shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub filename: String,
    pub uri: String,
    pub format: OutputFormat,
    pub quality: Option<f64>,
    pub strategy: SearchStrategy,
    #[serde(flatten)]
    pub summary: CompressionSummary,
    pub original_size_text: String,
    pub compressed_size_text: String,
    pub savings_text: String,
    pub advisories: Vec<EncodingAdvisory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(original_size: u64) -> SourceImage {
        SourceImage {
            pixels: DynamicImage::new_rgb8(2, 2),
            original_size,
            mime_type: "image/jpeg".to_string(),
            format: OutputFormat::Jpeg,
        }
    }

    #[test]
    fn request_requires_smaller_target() {
        let src = source(10_000);
        let ok = CompressionRequest::new(9_999, OutputFormat::Webp, &src).unwrap();
        assert_eq!(ok.target_bytes, 9_999);
        assert_eq!(ok.format, OutputFormat::Webp);

        let err = CompressionRequest::new(10_000, OutputFormat::Jpeg, &src).unwrap_err();
        assert!(matches!(err, ValidationError::TargetNotSmaller { .. }));
    }

    #[test]
    fn summary_reports_savings() {
        let summary = CompressionSummary::new(1_000_000, 250_000);
        assert_eq!(summary.saved_bytes, 750_000);
        assert_eq!(summary.percentage_saved, 75.0);
        assert_eq!(summary.savings_text(), "732.42 KB (75.0%)");
    }

    #[test]
    fn summary_handles_growth() {
        let summary = CompressionSummary::new(1024, 2048);
        assert_eq!(summary.saved_bytes, -1024);
        assert_eq!(summary.savings_text(), "-1 KB (-100.0%)");
    }

    #[test]
    fn advisory_messages() {
        let lossless = EncodingAdvisory::LosslessFormat { format: OutputFormat::Png };
        assert!(lossless.to_string().contains("PNG compression is lossless"));

        let exceeded = EncodingAdvisory::BudgetExceeded { target_bytes: 1024, actual_bytes: 1536 };
        assert_eq!(
            exceeded.to_string(),
            "Could not reach the target size of 1 KB. The smallest result is 1.5 KB."
        );
    }

    #[test]
    fn target_size_constructors() {
        assert_eq!(TargetSize::kilobytes(5), TargetSize::new("5", SizeUnit::Kb));
        assert_eq!(TargetSize::megabytes(1).unit.multiplier(), 1_048_576);
    }
}
