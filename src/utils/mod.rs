pub mod error;
pub mod validation;
pub mod formats;
pub mod size;

pub use error::{ReducerError, ReducerResult, ValidationError};
pub use validation::{
    parse_target_size,
    validate_mime_type,
    validate_quality,
    validate_target_budget,
};
pub use formats::{OutputFormat, format_from_mime, mime_from_path};
pub use size::{format_bytes, format_signed_bytes, percentage_saved, saved_bytes};
