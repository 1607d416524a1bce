//! Tunable search and encoder defaults.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::{ReducerError, ReducerResult, validate_quality};

/// Upper bound on bisection rounds; 2^-32 is far below any codec's quality step.
const MAX_SEARCH_ITERATIONS: u32 = 32;

/// Settings for quality search and the bundled codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReducerConfig {
    /// Bisection rounds; 10 gives 1/1024 quality resolution
    pub search_iterations: u32,
    /// Quality used when no bisection candidate fits the budget
    pub fallback_quality: f64,
    /// JPEG quality used when the encoder is asked for default settings
    pub default_jpeg_quality: f64,
    /// WebP quality used when the encoder is asked for default settings
    pub default_webp_quality: f64,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            search_iterations: 10,
            fallback_quality: 0.1,
            default_jpeg_quality: 0.92,
            default_webp_quality: 0.8,
        }
    }
}

impl ReducerConfig {
    /// Loads a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ReducerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReducerError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&raw)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> ReducerResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReducerResult<()> {
        if self.search_iterations == 0 || self.search_iterations > MAX_SEARCH_ITERATIONS {
            return Err(ReducerError::config(format!(
                "searchIterations must be between 1 and {}, got {}",
                MAX_SEARCH_ITERATIONS, self.search_iterations
            )));
        }

        for (name, value) in [
            ("fallbackQuality", self.fallback_quality),
            ("defaultJpegQuality", self.default_jpeg_quality),
            ("defaultWebpQuality", self.default_webp_quality),
        ] {
            validate_quality(name, value).map_err(|e| ReducerError::config(e.to_string()))?;
        }

        if self.fallback_quality == 0.0 {
            return Err(ReducerError::config("fallbackQuality must be above 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReducerConfig::default();
        assert_eq!(config.search_iterations, 10);
        assert_eq!(config.fallback_quality, 0.1);
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ReducerConfig::from_json_str(r#"{ "searchIterations": 12 }"#).unwrap();
        assert_eq!(config.search_iterations, 12);
        assert_eq!(config.fallback_quality, 0.1);
        assert_eq!(config.default_webp_quality, 0.8);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for raw in [
            r#"{ "searchIterations": 0 }"#,
            r#"{ "searchIterations": 64 }"#,
            r#"{ "fallbackQuality": 0 }"#,
            r#"{ "defaultJpegQuality": 1.2 }"#,
        ] {
            let err = ReducerConfig::from_json_str(raw).unwrap_err();
            assert!(matches!(err, ReducerError::Config(_)), "{raw}");
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ReducerConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ReducerError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ReducerConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ReducerError::Config(_)));
    }
}
