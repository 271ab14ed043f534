//! Traversal engine.
//!
//! Drives the visitor hooks depth-first. Every entered node gets a frame
//! with a fresh [`SourceBuffer`]; when the node's `end_visit` returns, the
//! frame's buffer is handed back to the caller, which composes it into the
//! parent's buffer. Sibling contributions therefore appear in exactly the
//! order the parent asks for them.
//!
//! The engine also owns the per-request state: the set of node identities
//! already entered (the re-entrancy guard), the active path from the root
//! (cycle detection) and the depth cap.

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::ast::{Ast, NodeId, NodeRef};
use crate::config::GenerateOptions;
use crate::error::{GenerateError, GenerateResult, NodePath};
use crate::output::source_buffer::SourceBuffer;
use crate::visitor::registry::VisitorRegistry;
use crate::visitor::ConstructVisitor;

pub struct Traversal<'a> {
    ast: &'a Ast,
    registry: &'a VisitorRegistry,
    options: &'a GenerateOptions,
    visited: IndexSet<NodeId>,
    path: Vec<NodeId>,
}

impl<'a> Traversal<'a> {
    pub fn new(ast: &'a Ast, registry: &'a VisitorRegistry, options: &'a GenerateOptions) -> Self {
        Traversal {
            ast,
            registry,
            options,
            visited: IndexSet::new(),
            path: Vec::new(),
        }
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn options(&self) -> &'a GenerateOptions {
        self.options
    }

    /// Node identities entered so far, in visit order.
    pub fn visited(&self) -> &IndexSet<NodeId> {
        &self.visited
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The active path from the traversal root to the current frame.
    pub fn current_path(&self) -> NodePath {
        self.path_of(&self.path)
    }

    /// Generates `root` as the top frame. The root is exempt from the
    /// parent-link check.
    pub fn run(&mut self, root: NodeId) -> GenerateResult<SourceBuffer> {
        let indent_unit = self.options.indent.as_str();
        Ok(self
            .render(root, 0, true)?
            .unwrap_or_else(|| SourceBuffer::for_node(root, 0, indent_unit)))
    }

    /// Generates `id` in a child frame and appends its text to `buf`.
    /// Returns false when the node was skipped by its re-entrancy guard, in
    /// which case `buf` is left untouched.
    pub fn visit_child(&mut self, id: NodeId, buf: &mut SourceBuffer) -> GenerateResult<bool> {
        match self.render(id, buf.indent(), false)? {
            Some(child) => {
                buf.append_buffer(child);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Generates `id` in a child frame at `buf`'s indent and returns the
    /// frame's buffer for the caller to compose. `None` when skipped.
    pub fn render_child(
        &mut self,
        id: NodeId,
        buf: &SourceBuffer,
    ) -> GenerateResult<Option<SourceBuffer>> {
        self.render(id, buf.indent(), false)
    }

    /// Generates `id` into a position the current node's syntax cannot
    /// leave empty. Unlike [`Traversal::visit_child`], a node skipped by its
    /// re-entrancy guard fails the request as a malformed fragment of the
    /// current node; `slot` names the position in the message.
    pub fn visit_required(
        &mut self,
        id: NodeId,
        slot: &str,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        if self.visit_child(id, buf)? {
            Ok(())
        } else {
            Err(self.already_generated(id, slot))
        }
    }

    /// Generates every one of `ids` with [`Traversal::visit_required`],
    /// printing `separator` between them.
    pub fn visit_required_separated(
        &mut self,
        ids: &[NodeId],
        separator: &str,
        slot: &str,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                buf.print(separator);
            }
            self.visit_required(id, slot, buf)?;
        }
        Ok(())
    }

    /// Generates `ids` in order with nothing between them.
    pub fn visit_children(&mut self, ids: &[NodeId], buf: &mut SourceBuffer) -> GenerateResult<usize> {
        self.visit_separated(ids, "", buf)
    }

    /// Generates `ids` in order, printing `separator` between the children
    /// that were actually emitted. Returns how many were emitted.
    pub fn visit_separated(
        &mut self,
        ids: &[NodeId],
        separator: &str,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<usize> {
        let mut emitted = 0;
        for &id in ids {
            if let Some(child) = self.render(id, buf.indent(), false)? {
                if emitted > 0 {
                    buf.print(separator);
                }
                buf.append_buffer(child);
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    /// Generates `ids` separated by the configured argument separator.
    pub fn visit_arguments(&mut self, ids: &[NodeId], buf: &mut SourceBuffer) -> GenerateResult<usize> {
        let separator = self.options.argument_separator.as_str();
        self.visit_separated(ids, separator, buf)
    }

    /// Generates `ids` one per line.
    pub fn visit_lines(&mut self, ids: &[NodeId], buf: &mut SourceBuffer) -> GenerateResult<usize> {
        let mut emitted = 0;
        for &id in ids {
            if let Some(child) = self.render(id, buf.indent(), false)? {
                buf.append_buffer(child);
                buf.newline();
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    /// Generates `{`, the indented `ids` one per line, and `}`.
    pub fn visit_block(&mut self, ids: &[NodeId], buf: &mut SourceBuffer) -> GenerateResult<usize> {
        buf.println("{");
        buf.inc_indent();
        let emitted = self.visit_lines(ids, buf)?;
        buf.dec_indent();
        buf.print("}");
        Ok(emitted)
    }

    fn render(
        &mut self,
        id: NodeId,
        indent: usize,
        is_root: bool,
    ) -> GenerateResult<Option<SourceBuffer>> {
        let ast = self.ast;
        let registry = self.registry;

        let node = match ast.get(id) {
            Some(node) => node,
            None => {
                return Err(GenerateError::UnknownNode {
                    node: id,
                    path: self.current_path(),
                })
            }
        };
        if self.path.contains(&id) {
            return Err(GenerateError::CycleDetected {
                node: id,
                path: self.path_with(id),
            });
        }
        if self.path.len() >= self.options.max_depth {
            return Err(GenerateError::DepthExceeded {
                node: id,
                limit: self.options.max_depth,
                path: self.path_with(id),
            });
        }
        if !is_root && node.parent().is_none() {
            return Err(GenerateError::MissingParent {
                node: id,
                kind: node.tag(),
                path: self.path_with(id),
            });
        }

        let visitor = node.accept(registry)?;
        if !visitor.can_visit(node, &self.visited) {
            debug!(node = %id, kind = %node.tag(), "skipping node already generated in this traversal");
            return Ok(None);
        }

        self.visited.insert(id);
        self.path.push(id);
        trace!(node = %id, kind = %node.tag(), depth = self.path.len(), "enter");

        let mut buf = SourceBuffer::for_node(id, indent, self.options.indent.as_str());
        let result = self
            .run_hooks(visitor, node, &mut buf)
            .map_err(|e| e.with_path(|| self.current_path()));

        self.path.pop();
        if let Err(e) = &result {
            debug!(node = %id, kind = %node.tag(), error = %e, "generation failed");
        }
        result?;
        Ok(Some(buf))
    }

    fn run_hooks(
        &mut self,
        visitor: &dyn ConstructVisitor,
        node: NodeRef<'a>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        visitor.begin_visit(node, buf)?;
        visitor.visit(node, self, buf)?;
        visitor.end_visit(node, buf)
    }

    fn already_generated(&self, id: NodeId, slot: &str) -> GenerateError {
        let owner = self.path.last().copied().unwrap_or(id);
        match (self.ast.node(owner), self.ast.node(id)) {
            (Some(owner_node), Some(child)) => GenerateError::malformed(
                owner,
                owner_node.tag(),
                format!(
                    "{} {}{} was already generated elsewhere",
                    slot,
                    child.tag(),
                    id
                ),
            ),
            _ => GenerateError::UnknownNode {
                node: id,
                path: self.current_path(),
            },
        }
    }

    fn path_with(&self, id: NodeId) -> NodePath {
        let mut ids = self.path.clone();
        ids.push(id);
        self.path_of(&ids)
    }

    fn path_of(&self, ids: &[NodeId]) -> NodePath {
        NodePath::new(
            ids.iter()
                .filter_map(|id| self.ast.node(*id).map(|n| (*id, n.tag())))
                .collect(),
        )
    }
}
