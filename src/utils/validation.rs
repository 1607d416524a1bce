use crate::core::{SizeUnit, TargetSize};
use crate::utils::{OutputFormat, ValidationError, format_from_mime};

/// Validates a declared MIME type and returns the format it decodes as.
pub fn validate_mime_type(mime: &str) -> Result<OutputFormat, ValidationError> {
    format_from_mime(mime)
}

/// Converts raw target-size input into a byte budget.
///
/// The value must be a positive whole number; surrounding whitespace is ignored.
pub fn parse_target_size(target: &TargetSize) -> Result<u64, ValidationError> {
    let raw = target.value.trim();
    let value: u64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_target_size(raw))?;

    if value == 0 {
        return Err(ValidationError::invalid_target_size(raw));
    }

    value
        .checked_mul(target.unit.multiplier())
        .ok_or_else(|| ValidationError::invalid_target_size(raw))
}

/// Ensures the byte budget would actually shrink the source.
pub fn validate_target_budget(target_bytes: u64, original_bytes: u64) -> Result<(), ValidationError> {
    if target_bytes >= original_bytes {
        return Err(ValidationError::TargetNotSmaller {
            target_bytes,
            original_bytes,
        });
    }
    Ok(())
}

/// Validates a quality value in `[0, 1]`.
pub fn validate_quality(name: &str, quality: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&quality) || quality.is_nan() {
        return Err(ValidationError::settings(format!(
            "Invalid {name}: {quality}. Must be between 0 and 1"
        )));
    }
    Ok(())
}
