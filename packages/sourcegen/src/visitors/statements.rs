//! Simple statements: each generates onto a single logical line ending in
//! `;`, except blocks and comments.

use crate::ast::{NodeKind, NodeRef, NodeTag};
use crate::error::GenerateResult;
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;
use crate::visitor::registry::VisitorRegistry;
use crate::visitor::ConstructVisitor;
use crate::visitors::declarations::visit_variable;
use crate::visitors::{exact_children, forbid_children, kind_mismatch, malformed, require_identifier};

pub fn register(registry: &mut VisitorRegistry) {
    registry.register(
        NodeTag::VariableDefinitionStatement,
        Box::new(VariableDefinitionStatementVisitor),
    );
    registry.register(NodeTag::AssignmentStatement, Box::new(AssignmentStatementVisitor));
    registry.register(NodeTag::ExpressionStatement, Box::new(ExpressionStatementVisitor));
    registry.register(NodeTag::ReturnStatement, Box::new(ReturnStatementVisitor));
    registry.register(
        NodeTag::ReplyStatement,
        Box::new(KeywordStatementVisitor { keyword: "reply" }),
    );
    registry.register(
        NodeTag::ThrowStatement,
        Box::new(KeywordStatementVisitor { keyword: "throw" }),
    );
    registry.register(
        NodeTag::BreakStatement,
        Box::new(BareStatementVisitor { keyword: "break" }),
    );
    registry.register(
        NodeTag::AbortStatement,
        Box::new(BareStatementVisitor { keyword: "abort" }),
    );
    registry.register(NodeTag::CommentStatement, Box::new(CommentStatementVisitor));
    registry.register(
        NodeTag::WorkerInvocationStatement,
        Box::new(WorkerInteractionVisitor { arrow: "->" }),
    );
    registry.register(
        NodeTag::WorkerReplyStatement,
        Box::new(WorkerInteractionVisitor { arrow: "<-" }),
    );
    registry.register(NodeTag::BlockStatement, Box::new(BlockStatementVisitor));
    registry.register(NodeTag::TransformStatement, Box::new(TransformStatementVisitor));
}

pub struct VariableDefinitionStatementVisitor;

impl ConstructVisitor for VariableDefinitionStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::VariableDefinitionStatement { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        visit_variable(node, type_name, name, traversal, buf)
    }
}

/// `a, b = rhs;` where the last child is the right-hand side.
pub struct AssignmentStatementVisitor;

impl ConstructVisitor for AssignmentStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let Some((rhs, lhs)) = node.children().split_last() else {
            return Err(malformed(node, "missing right-hand side"));
        };
        if lhs.is_empty() {
            return Err(malformed(node, "missing assignment target"));
        }
        traversal.visit_required_separated(lhs, ", ", "assignment target", buf)?;
        buf.print(" = ");
        traversal.visit_required(*rhs, "right-hand side", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

pub struct ExpressionStatementVisitor;

impl ConstructVisitor for ExpressionStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let expr = exact_children(node, 1, "one expression")?;
        traversal.visit_required(expr[0], "expression", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

/// `return;` or `return a, b;`
pub struct ReturnStatementVisitor;

impl ConstructVisitor for ReturnStatementVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print("return");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        if !node.children().is_empty() {
            buf.print(" ");
            traversal.visit_required_separated(node.children(), ", ", "return value", buf)?;
        }
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

/// `keyword expr;`
pub struct KeywordStatementVisitor {
    keyword: &'static str,
}

impl ConstructVisitor for KeywordStatementVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(self.keyword);
        buf.print(" ");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let expr = exact_children(node, 1, "one expression")?;
        traversal.visit_required(expr[0], "expression", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

/// `keyword;`
pub struct BareStatementVisitor {
    keyword: &'static str,
}

impl ConstructVisitor for BareStatementVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        forbid_children(node)?;
        buf.print(self.keyword);
        buf.print(";");
        Ok(())
    }
}

/// `// text`, one comment line per line of text.
pub struct CommentStatementVisitor;

impl ConstructVisitor for CommentStatementVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::CommentStatement { text } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        forbid_children(node)?;
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                buf.newline();
            }
            let line = line.trim_end();
            if line.trim_start().starts_with("//") {
                buf.print(line.trim_start());
            } else if line.is_empty() {
                buf.print("//");
            } else {
                buf.print("// ");
                buf.print(line);
            }
        }
        if text.is_empty() {
            buf.print("//");
        }
        Ok(())
    }
}

/// `a, b -> w1;` and `a, b <- w1;`
pub struct WorkerInteractionVisitor {
    arrow: &'static str,
}

impl ConstructVisitor for WorkerInteractionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let worker_name = match node.kind() {
            NodeKind::WorkerInvocationStatement { worker_name }
            | NodeKind::WorkerReplyStatement { worker_name } => worker_name,
            _ => return Err(kind_mismatch(node)),
        };
        if node.children().is_empty() {
            return Err(malformed(node, "missing message expression"));
        }
        traversal.visit_required_separated(node.children(), ", ", "message expression", buf)?;
        buf.print(" ");
        buf.print(self.arrow);
        buf.print(" ");
        buf.print(require_identifier(node, "worker name", worker_name)?);
        buf.print(";");
        Ok(())
    }
}

pub struct BlockStatementVisitor;

impl ConstructVisitor for BlockStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_block(node.children(), buf)?;
        Ok(())
    }
}

pub struct TransformStatementVisitor;

impl ConstructVisitor for TransformStatementVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print("transform ");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_block(node.children(), buf)?;
        Ok(())
    }
}
