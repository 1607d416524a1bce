// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    CompressionReport, CompressionRequest, CompressionResult, ReducerConfig, Session, SizeUnit,
    SourceImage, TargetSize, View, ViewState,
};
pub use processing::{Encoder, ImageCodec, QualitySearch, search};
pub use utils::{OutputFormat, ReducerError, ReducerResult, ValidationError, format_bytes};
pub use commands::*;

// This library file is the public API of the crate.
// The command-line entry point is in main.rs.
