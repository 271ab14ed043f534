#![deny(clippy::all)]

/**
 * Composer Source Generation
 *
 * Regenerates Ballerina source text from the composer's editable AST.
 * A registry of per-construct visitors is driven by a depth-first traversal
 * engine; every construct writes into its own buffer and the engine composes
 * child text into the parent's buffer in source order.
 */

pub mod ast;
pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod traversal;
pub mod util;
pub mod visitor;
pub mod visitors;

// Re-exports
pub use ast::document::AstDocument;
pub use ast::{Ast, Node, NodeId, NodeKind, NodeRef, NodeTag};
pub use config::GenerateOptions;
pub use error::{AstError, DocumentError, GenerateError, GenerateResult, NodePath};
pub use generator::{GeneratedSource, SourceGenerator};
pub use output::source_buffer::SourceBuffer;
pub use traversal::Traversal;
pub use visitor::registry::VisitorRegistry;
pub use visitor::ConstructVisitor;
