/**
 * Composer Source Generation CLI
 *
 * Loads composer AST documents, regenerates their source and writes the
 * results (and optional source maps) to disk.
 */
pub mod config;
pub mod logging;
pub mod perform_generate;

pub use config::SourcegenConfig;
pub use logging::{init_tracing, LogLevel};
pub use perform_generate::{perform_generation, GenerationResult, OutputTarget};
