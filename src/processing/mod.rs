//! Decoding uploads, the encode capability, and the quality search.

mod decode;
mod encoder;
mod search;

pub use decode::decode_source;
pub use encoder::{Encoder, ImageCodec};
pub use search::{EncodedResult, QualitySearch, SearchStep, SearchStrategy, search};
