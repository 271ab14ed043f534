//! Output module
//!
//! Text accumulation and source maps for generated source.

pub mod source_buffer;
pub mod source_map;

pub use source_buffer::SourceBuffer;
pub use source_map::{SourceMap, SourceMapGenerator};
