use tracing::debug_span;

use crate::ast::{Ast, NodeId};
use crate::config::GenerateOptions;
use crate::error::{GenerateError, GenerateResult};
use crate::output::source_buffer::SourceBuffer;
use crate::output::source_map::SourceMap;
use crate::traversal::Traversal;
use crate::visitor::registry::VisitorRegistry;

/// Generated text with its optional source map.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSource {
    pub source: String,
    pub source_map: Option<SourceMap>,
}

/// Entry point for source generation. Holds the visitor registry and the
/// formatting options; every request runs in a fresh [`Traversal`].
#[derive(Debug)]
pub struct SourceGenerator {
    registry: VisitorRegistry,
    options: GenerateOptions,
}

impl Default for SourceGenerator {
    fn default() -> Self {
        SourceGenerator::new(GenerateOptions::default())
    }
}

impl SourceGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        SourceGenerator::with_registry(VisitorRegistry::standard(), options)
    }

    pub fn with_registry(registry: VisitorRegistry, options: GenerateOptions) -> Self {
        SourceGenerator { registry, options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn registry(&self) -> &VisitorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VisitorRegistry {
        &mut self.registry
    }

    /// Generates source for the whole AST.
    pub fn generate(&self, ast: &Ast) -> GenerateResult<String> {
        let root = ast.root().ok_or(GenerateError::NoRoot)?;
        self.generate_node(ast, root)
    }

    /// Generates source for the subtree rooted at `id`.
    pub fn generate_node(&self, ast: &Ast, id: NodeId) -> GenerateResult<String> {
        Ok(self.render(ast, id)?.to_source())
    }

    /// Generates source for the whole AST together with a source map whose
    /// `file` is `gen_file_path`. The map is `None` when no emitted part
    /// could be related to a node position.
    pub fn generate_with_source_map(
        &self,
        ast: &Ast,
        gen_file_path: &str,
    ) -> GenerateResult<GeneratedSource> {
        let root = ast.root().ok_or(GenerateError::NoRoot)?;
        let buf = self.render(ast, root)?;
        let source_map = buf.to_source_map_generator(ast, gen_file_path, 0)?.to_json();
        Ok(GeneratedSource {
            source: buf.to_source(),
            source_map,
        })
    }

    fn render(&self, ast: &Ast, root: NodeId) -> GenerateResult<SourceBuffer> {
        let _span = debug_span!("generate", root = %root, nodes = ast.len()).entered();
        let mut traversal = Traversal::new(ast, &self.registry, &self.options);
        let buf = traversal.run(root)?;
        tracing::debug!(visited = traversal.visited().len(), "generated source");
        Ok(buf)
    }
}
