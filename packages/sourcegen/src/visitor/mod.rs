//! Visitor protocol.
//!
//! Each construct kind has one [`ConstructVisitor`]. The traversal engine
//! calls its hooks in a fixed order for every node it enters:
//! `can_visit`, then `begin_visit`, `visit` and `end_visit`. Hooks write into
//! the buffer of the node's own frame; nested constructs are generated by
//! handing their ids back to the engine from `visit`.

pub mod registry;

use indexmap::IndexSet;

use crate::ast::{NodeId, NodeRef};
use crate::error::GenerateResult;
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;

pub trait ConstructVisitor: Send + Sync {
    /// Re-entrancy guard. A node that has already been entered during this
    /// traversal is not generated again.
    fn can_visit(&self, node: NodeRef<'_>, visited: &IndexSet<NodeId>) -> bool {
        !visited.contains(&node.id())
    }

    /// Emits the construct's leading fragment.
    fn begin_visit(&self, _node: NodeRef<'_>, _buf: &mut SourceBuffer) -> GenerateResult<()> {
        Ok(())
    }

    /// Generates nested constructs through the engine. The default emits
    /// every child in order with nothing between them.
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_children(node.children(), buf).map(|_| ())
    }

    /// Emits the construct's trailing fragment.
    fn end_visit(&self, _node: NodeRef<'_>, _buf: &mut SourceBuffer) -> GenerateResult<()> {
        Ok(())
    }
}
