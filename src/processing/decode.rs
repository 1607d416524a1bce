use tracing::debug;

use crate::core::SourceImage;
use crate::utils::{ReducerError, ReducerResult, validate_mime_type};

/// Decodes an upload into a [`SourceImage`].
///
/// The declared MIME type must be on the allow-list. The bytes are decoded by
/// content, so a PNG declared as `image/jpeg` still loads; the declared type
/// stays the input format.
pub fn decode_source(bytes: &[u8], mime: &str) -> ReducerResult<SourceImage> {
    let format = validate_mime_type(mime)?;

    if bytes.is_empty() {
        return Err(ReducerError::decode("File is empty"));
    }

    let pixels = image::load_from_memory(bytes)
        .map_err(|e| ReducerError::decode(format!("Failed to decode {} upload: {}", format, e)))?;

    debug!(
        "Decoded {} bytes as {} ({}x{}, {:?})",
        bytes.len(),
        format,
        pixels.width(),
        pixels.height(),
        pixels.color()
    );

    Ok(SourceImage {
        pixels,
        original_size: bytes.len() as u64,
        mime_type: format.mime_type().to_string(),
        format,
    })
}
