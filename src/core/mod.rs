//! Core session types and state management.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`Session`]: Owns the active view and the current retrieval handle
//! - [`ViewState`]: The five mutually exclusive screens
//! - [`SourceImage`]: A decoded upload
//! - [`CompressionRequest`]: A validated target size and output format
//! - [`CompressionResult`]: Result of a finished quality search
//! - [`ReducerConfig`]: Search and encoder settings

mod config;
mod state;
mod types;
pub mod store;
pub mod view;

pub use config::ReducerConfig;
pub use state::Session;
pub use store::{BlobStore, MemoryStore, RetrievalHandle};
pub use types::{
    CompressionReport, CompressionRequest, CompressionResult, CompressionSummary,
    EncodingAdvisory, SizeUnit, SourceImage, TargetSize,
};
pub use view::{View, ViewState};
