//! The encode capability and its bundled implementation.
//!
//! The search only sees the [`Encoder`] trait. [`ImageCodec`] maps it onto the
//! `image` crate for JPEG and PNG and onto `webp` (libwebp) for lossy WebP,
//! since `image` only writes lossless WebP.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::core::ReducerConfig;
use crate::utils::{OutputFormat, ReducerError, ReducerResult};

/// Encodes pixels into a file format at a given quality.
///
/// `quality` is in `[0, 1]`; `None` asks for the encoder's default settings.
/// Implementations must be deterministic in output for identical inputs.
pub trait Encoder: Send + Sync {
    fn encode(
        &self,
        pixels: &DynamicImage,
        format: OutputFormat,
        quality: Option<f64>,
    ) -> ReducerResult<Vec<u8>>;
}

impl<F> Encoder for F
where
    F: Fn(&DynamicImage, OutputFormat, Option<f64>) -> ReducerResult<Vec<u8>> + Send + Sync,
{
    fn encode(
        &self,
        pixels: &DynamicImage,
        format: OutputFormat,
        quality: Option<f64>,
    ) -> ReducerResult<Vec<u8>> {
        self(pixels, format, quality)
    }
}

/// Encoder backed by the `image` and `webp` crates.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    default_jpeg_quality: f64,
    default_webp_quality: f64,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new(&ReducerConfig::default())
    }
}

impl ImageCodec {
    pub fn new(config: &ReducerConfig) -> Self {
        Self {
            default_jpeg_quality: config.default_jpeg_quality,
            default_webp_quality: config.default_webp_quality,
        }
    }

    fn encode_jpeg(&self, pixels: &DynamicImage, quality: f64) -> ReducerResult<Vec<u8>> {
        // JPEG has no alpha channel; transparent pixels flatten to their color values
        let rgb = pixels.to_rgb8();
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, to_percent(quality))
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ReducerError::encoding(format!("JPEG encode failed: {e}")))?;
        Ok(buf)
    }

    fn encode_png(&self, pixels: &DynamicImage) -> ReducerResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = PngEncoder::new(&mut buf);
        let result = if pixels.color().has_alpha() {
            let rgba = pixels.to_rgba8();
            encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
        } else {
            let rgb = pixels.to_rgb8();
            encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        };
        result.map_err(|e| ReducerError::encoding(format!("PNG encode failed: {e}")))?;
        Ok(buf)
    }

    fn encode_webp(&self, pixels: &DynamicImage, quality: f64) -> ReducerResult<Vec<u8>> {
        let rgba = pixels.to_rgba8();
        let memory = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, (quality.clamp(0.0, 1.0) * 100.0) as f32)
            .map_err(|e| ReducerError::encoding(format!("WebP encode failed: {e:?}")))?;
        Ok(memory.to_vec())
    }
}

impl Encoder for ImageCodec {
    fn encode(
        &self,
        pixels: &DynamicImage,
        format: OutputFormat,
        quality: Option<f64>,
    ) -> ReducerResult<Vec<u8>> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ReducerError::encoding("Cannot encode an empty image"));
        }

        match format {
            OutputFormat::Jpeg => {
                self.encode_jpeg(pixels, quality.unwrap_or(self.default_jpeg_quality))
            }
            // PNG is lossless; quality does not apply
            OutputFormat::Png => self.encode_png(pixels),
            OutputFormat::Webp => {
                self.encode_webp(pixels, quality.unwrap_or(self.default_webp_quality))
            }
        }
    }
}

/// Maps `[0, 1]` onto the JPEG encoder's `1..=100` scale.
fn to_percent(quality: f64) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}
