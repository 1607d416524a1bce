use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use crate::utils::{ReducerError, ValidationError};

/// Output formats the reducer can hand to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

lazy_static! {
    /// Accepted input MIME types and the format each one decodes as.
    static ref MIME_FORMATS: HashMap<&'static str, OutputFormat> = {
        let mut m = HashMap::new();
        m.insert("image/jpeg", OutputFormat::Jpeg);
        m.insert("image/png", OutputFormat::Png);
        m.insert("image/webp", OutputFormat::Webp);
        m
    };
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Jpeg, Self::Png, Self::Webp];

    /// Lossless formats have no quality knob that meaningfully shrinks output.
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Png)
    }

    /// Extension used for the suggested download filename
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Suggested filename for a result in this format, e.g. `compressed.webp`
    pub fn suggested_filename(&self) -> String {
        format!("compressed.{}", self.extension())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ReducerError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.trim().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            _ => Err(ReducerError::format(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Resolves a declared MIME type against the allow-list.
///
/// Matching is case-insensitive and ignores MIME parameters (`; charset=...`).
pub fn format_from_mime(mime: &str) -> Result<OutputFormat, ValidationError> {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    MIME_FORMATS
        .get(essence.as_str())
        .copied()
        .ok_or_else(|| ValidationError::unsupported_file_type(mime))
}

/// Guess a MIME type from a file extension, as a browser file picker would.
///
/// Unknown extensions map to `application/octet-stream`, which the allow-list rejects.
pub fn mime_from_path(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
