//! Command handlers that drive a [`Session`](crate::core::Session).
//!
//! - [`open_image`]: Read a file and accept it as the upload
//! - [`compress`]: Validate a target size and run the quality search
//! - [`save_result`]: Write the displayed result to disk

mod compress;
mod files;

pub use compress::compress;
pub use files::{open_image, save_result};
