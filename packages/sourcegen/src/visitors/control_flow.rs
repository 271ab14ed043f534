//! Compound statements.
//!
//! A compound statement is a wrapper whose children are its clauses
//! (`if`/`else if`/`else`, `try`/`catch`/`finally`, ...). The wrapper checks
//! clause order and joins the clauses with a space, so every clause after the
//! first continues on the line of the previous clause's closing brace.

use crate::ast::{NodeId, NodeKind, NodeRef, NodeTag};
use crate::error::GenerateResult;
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;
use crate::visitor::registry::VisitorRegistry;
use crate::visitor::ConstructVisitor;
use crate::visitors::{kind_mismatch, malformed, require_identifier, require_type, split_first};

pub fn register(registry: &mut VisitorRegistry) {
    registry.register(NodeTag::IfElseStatement, Box::new(IfElseStatementVisitor));
    registry.register(
        NodeTag::IfStatement,
        Box::new(ConditionalClauseVisitor { keyword: "if" }),
    );
    registry.register(
        NodeTag::ElseIfStatement,
        Box::new(ConditionalClauseVisitor { keyword: "else if" }),
    );
    registry.register(
        NodeTag::ElseStatement,
        Box::new(ClauseVisitor { keyword: "else" }),
    );
    registry.register(
        NodeTag::WhileStatement,
        Box::new(ConditionalClauseVisitor { keyword: "while" }),
    );
    registry.register(NodeTag::TryCatchStatement, Box::new(TryCatchStatementVisitor));
    registry.register(NodeTag::TryStatement, Box::new(ClauseVisitor { keyword: "try" }));
    registry.register(NodeTag::CatchStatement, Box::new(CatchStatementVisitor));
    registry.register(
        NodeTag::FinallyStatement,
        Box::new(ClauseVisitor { keyword: "finally" }),
    );
    registry.register(NodeTag::ForkJoinStatement, Box::new(ForkJoinStatementVisitor));
    registry.register(NodeTag::JoinStatement, Box::new(JoinStatementVisitor));
    registry.register(NodeTag::TimeoutStatement, Box::new(TimeoutStatementVisitor));
    registry.register(
        NodeTag::TransactionAbortedStatement,
        Box::new(TransactionAbortedStatementVisitor),
    );
    registry.register(
        NodeTag::TransactionStatement,
        Box::new(ClauseVisitor {
            keyword: "transaction",
        }),
    );
    registry.register(
        NodeTag::AbortedStatement,
        Box::new(ClauseVisitor { keyword: "aborted" }),
    );
    registry.register(
        NodeTag::CommittedStatement,
        Box::new(ClauseVisitor {
            keyword: "committed",
        }),
    );
}

/// One slot in a compound statement's clause sequence.
struct ClauseRule {
    tag: NodeTag,
    required: bool,
    repeated: bool,
}

const fn clause(tag: NodeTag, required: bool, repeated: bool) -> ClauseRule {
    ClauseRule {
        tag,
        required,
        repeated,
    }
}

/// Checks that `node`'s children follow `rules` in order.
fn check_clauses(node: NodeRef<'_>, rules: &[ClauseRule]) -> GenerateResult<()> {
    let children = node.children();
    let mut i = 0;
    for rule in rules {
        let mut matched = 0;
        while i < children.len() && node.child_tag(children[i]) == Some(rule.tag) {
            matched += 1;
            i += 1;
            if !rule.repeated {
                break;
            }
        }
        if rule.required && matched == 0 {
            return Err(malformed(node, format!("missing {} clause", rule.tag)));
        }
    }
    if let Some(&extra) = children.get(i) {
        let tag = node.child_tag(extra).map(|t| t.name()).unwrap_or("node");
        return Err(malformed(
            node,
            format!("unexpected {}{} in clause sequence", tag, extra),
        ));
    }
    Ok(())
}

/// Generates clauses joined by a single space.
fn visit_clauses(
    traversal: &mut Traversal<'_>,
    ids: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<usize> {
    traversal.visit_separated(ids, " ", buf)
}

pub struct IfElseStatementVisitor;

impl ConstructVisitor for IfElseStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        check_clauses(
            node,
            &[
                clause(NodeTag::IfStatement, true, false),
                clause(NodeTag::ElseIfStatement, false, true),
                clause(NodeTag::ElseStatement, false, false),
            ],
        )?;
        visit_clauses(traversal, node.children(), buf)?;
        Ok(())
    }
}

/// `keyword (condition) { ... }` where the first child is the condition.
pub struct ConditionalClauseVisitor {
    keyword: &'static str,
}

impl ConstructVisitor for ConditionalClauseVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(self.keyword);
        buf.print(" (");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let (condition, body) = split_first(node, "condition")?;
        traversal.visit_required(condition, "condition", buf)?;
        buf.print(") ");
        traversal.visit_block(body, buf)?;
        Ok(())
    }
}

/// `keyword { ... }`
pub struct ClauseVisitor {
    keyword: &'static str,
}

impl ConstructVisitor for ClauseVisitor {
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
        traversal.visit_block(node.children(), buf)?;
        Ok(())
    }
}

pub struct TryCatchStatementVisitor;

impl ConstructVisitor for TryCatchStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        check_clauses(
            node,
            &[
                clause(NodeTag::TryStatement, true, false),
                clause(NodeTag::CatchStatement, true, false),
                clause(NodeTag::FinallyStatement, false, false),
            ],
        )?;
        visit_clauses(traversal, node.children(), buf)?;
        Ok(())
    }
}

/// `catch (type name) { ... }`
pub struct CatchStatementVisitor;

impl ConstructVisitor for CatchStatementVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::CatchStatement { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print("catch (");
        buf.print(require_type(node, type_name)?);
        buf.print(" ");
        buf.print(require_identifier(node, "exception name", name)?);
        buf.print(") ");
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

/// `fork { workers } join (...) (...) { ... } timeout (...) (...) { ... }`
pub struct ForkJoinStatementVisitor;

impl ConstructVisitor for ForkJoinStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        check_clauses(
            node,
            &[
                clause(NodeTag::WorkerDeclaration, false, true),
                clause(NodeTag::JoinStatement, false, false),
                clause(NodeTag::TimeoutStatement, false, false),
            ],
        )?;
        let children = node.children();
        let split = children
            .iter()
            .position(|id| node.child_tag(*id) != Some(NodeTag::WorkerDeclaration))
            .unwrap_or(children.len());
        let (workers, clauses) = children.split_at(split);

        buf.print("fork ");
        traversal.visit_block(workers, buf)?;
        for &id in clauses {
            if let Some(child) = traversal.render_child(id, buf)? {
                buf.print(" ");
                buf.append_buffer(child);
            }
        }
        Ok(())
    }
}

/// `join (all) (message[] results) { ... }`
pub struct JoinStatementVisitor;

impl ConstructVisitor for JoinStatementVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::JoinStatement {
            condition,
            type_name,
            name,
        } = node.kind()
        else {
            return Err(kind_mismatch(node));
        };
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(malformed(node, "join condition is empty"));
        }
        buf.print("join (");
        buf.print(condition);
        buf.print(") (");
        buf.print(require_type(node, type_name)?);
        buf.print(" ");
        buf.print(require_identifier(node, "join result name", name)?);
        buf.print(") ");
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

/// `timeout (expr) (message[] results) { ... }` where the first child is the
/// timeout expression.
pub struct TimeoutStatementVisitor;

impl ConstructVisitor for TimeoutStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::TimeoutStatement { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let (timeout, body) = split_first(node, "timeout expression")?;
        buf.print("timeout (");
        traversal.visit_required(timeout, "timeout expression", buf)?;
        buf.print(") (");
        buf.print(require_type(node, type_name)?);
        buf.print(" ");
        buf.print(require_identifier(node, "timeout result name", name)?);
        buf.print(") ");
        traversal.visit_block(body, buf)?;
        Ok(())
    }
}

pub struct TransactionAbortedStatementVisitor;

impl ConstructVisitor for TransactionAbortedStatementVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        check_clauses(
            node,
            &[
                clause(NodeTag::TransactionStatement, true, false),
                clause(NodeTag::AbortedStatement, false, false),
                clause(NodeTag::CommittedStatement, false, false),
            ],
        )?;
        visit_clauses(traversal, node.children(), buf)?;
        Ok(())
    }
}
