//! Expressions.
//!
//! Every nested operand or argument is generated in its own frame through
//! the traversal engine, so `foo(bar(baz()))` composes purely from the
//! three invocation frames.

use crate::ast::{LiteralType, NodeKind, NodeRef, NodeTag};
use crate::error::GenerateResult;
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;
use crate::util;
use crate::visitor::registry::VisitorRegistry;
use crate::visitor::ConstructVisitor;
use crate::visitors::{
    exact_children, forbid_children, kind_mismatch, malformed, print_qualified, require_identifier,
    require_type,
};

pub fn register(registry: &mut VisitorRegistry) {
    registry.register(
        NodeTag::FunctionInvocationExpression,
        Box::new(FunctionInvocationExpressionVisitor),
    );
    registry.register(
        NodeTag::ActionInvocationExpression,
        Box::new(ActionInvocationExpressionVisitor),
    );
    registry.register(
        NodeTag::ConnectorInitExpression,
        Box::new(ConnectorInitExpressionVisitor),
    );
    registry.register(NodeTag::BinaryExpression, Box::new(BinaryExpressionVisitor));
    registry.register(NodeTag::UnaryExpression, Box::new(UnaryExpressionVisitor));
    registry.register(
        NodeTag::ParenthesizedExpression,
        Box::new(ParenthesizedExpressionVisitor),
    );
    registry.register(
        NodeTag::BasicLiteralExpression,
        Box::new(BasicLiteralExpressionVisitor),
    );
    registry.register(
        NodeTag::VariableReferenceExpression,
        Box::new(VariableReferenceExpressionVisitor),
    );
    registry.register(
        NodeTag::FieldAccessExpression,
        Box::new(FieldAccessExpressionVisitor),
    );
    registry.register(
        NodeTag::IndexAccessExpression,
        Box::new(IndexAccessExpressionVisitor),
    );
    registry.register(NodeTag::TypeCastExpression, Box::new(TypeCastExpressionVisitor));
    registry.register(
        NodeTag::TypeConversionExpression,
        Box::new(TypeConversionExpressionVisitor),
    );
    registry.register(
        NodeTag::ArrayInitExpression,
        Box::new(DelimitedExpressionVisitor { open: "[", close: "]" }),
    );
    registry.register(
        NodeTag::MapInitExpression,
        Box::new(MapInitExpressionVisitor),
    );
    registry.register(NodeTag::KeyValueExpression, Box::new(KeyValueExpressionVisitor));
    registry.register(
        NodeTag::BackQuoteExpression,
        Box::new(BackQuoteExpressionVisitor),
    );
}

/// `foo(a, b)`.
///
/// The node stores its leading fragment, the callee with the opening
/// delimiter (`foo(`). A fragment stored in closed form (`foo()`) is
/// normalized to its leading part. Arguments are the children, joined by the
/// configured argument separator.
pub struct FunctionInvocationExpressionVisitor;

impl ConstructVisitor for FunctionInvocationExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::FunctionInvocationExpression { function } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        if function.is_empty() {
            return Err(malformed(node, "invocation fragment is empty"));
        }
        let prefix = util::invocation_prefix(function).ok_or_else(|| {
            malformed(
                node,
                format!("`{}` is not an invocation fragment", function),
            )
        })?;
        buf.print(&prefix);
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_arguments(node.children(), buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(")");
        Ok(())
    }
}

/// `pkg:Connector.action(a, b)`
pub struct ActionInvocationExpressionVisitor;

impl ConstructVisitor for ActionInvocationExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::ActionInvocationExpression {
            package_name,
            connector_name,
            action_name,
        } = node.kind()
        else {
            return Err(kind_mismatch(node));
        };
        print_qualified(node, package_name.as_deref(), connector_name, buf)?;
        buf.print(".");
        buf.print(require_identifier(node, "action name", action_name)?);
        buf.print("(");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_arguments(node.children(), buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(")");
        Ok(())
    }
}

/// `create pkg:Connector(a, b)`
pub struct ConnectorInitExpressionVisitor;

impl ConstructVisitor for ConnectorInitExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::ConnectorInitExpression {
            package_name,
            connector_name,
        } = node.kind()
        else {
            return Err(kind_mismatch(node));
        };
        buf.print("create ");
        print_qualified(node, package_name.as_deref(), connector_name, buf)?;
        buf.print("(");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_arguments(node.children(), buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(")");
        Ok(())
    }
}

pub struct BinaryExpressionVisitor;

impl ConstructVisitor for BinaryExpressionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::BinaryExpression { operator } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let operands = exact_children(node, 2, "two operands")?;
        traversal.visit_required(operands[0], "left operand", buf)?;
        buf.print(" ");
        buf.print(operator.as_str());
        buf.print(" ");
        traversal.visit_required(operands[1], "right operand", buf)?;
        Ok(())
    }
}

pub struct UnaryExpressionVisitor;

impl ConstructVisitor for UnaryExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::UnaryExpression { operator } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print(operator.as_str());
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let operand = exact_children(node, 1, "one operand")?;
        traversal.visit_required(operand[0], "operand", buf)?;
        Ok(())
    }
}

pub struct ParenthesizedExpressionVisitor;

impl ConstructVisitor for ParenthesizedExpressionVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print("(");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let inner = exact_children(node, 1, "one expression")?;
        traversal.visit_required(inner[0], "expression", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(")");
        Ok(())
    }
}

pub struct BasicLiteralExpressionVisitor;

impl ConstructVisitor for BasicLiteralExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::BasicLiteralExpression {
            literal_type,
            value,
        } = node.kind()
        else {
            return Err(kind_mismatch(node));
        };
        forbid_children(node)?;
        match literal_type {
            LiteralType::String => buf.print(&util::escape_string_literal(value)),
            LiteralType::Null => buf.print("null"),
            LiteralType::Boolean => {
                if value != "true" && value != "false" {
                    return Err(malformed(node, format!("`{}` is not a boolean", value)));
                }
                buf.print(value);
            }
            LiteralType::Int | LiteralType::Float => {
                if value.trim().is_empty() {
                    return Err(malformed(node, "numeric literal is empty"));
                }
                buf.print(value.trim());
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        _node: NodeRef<'_>,
        _traversal: &mut Traversal<'_>,
        _buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        Ok(())
    }
}

/// `name` or `pkg:name`
pub struct VariableReferenceExpressionVisitor;

impl ConstructVisitor for VariableReferenceExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::VariableReferenceExpression { package_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        forbid_children(node)?;
        print_qualified(node, package_name.as_deref(), name, buf)
    }

    fn visit(
        &self,
        _node: NodeRef<'_>,
        _traversal: &mut Traversal<'_>,
        _buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        Ok(())
    }
}

/// `base.field`
pub struct FieldAccessExpressionVisitor;

impl ConstructVisitor for FieldAccessExpressionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::FieldAccessExpression { field_name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let base = exact_children(node, 1, "a base expression")?;
        traversal.visit_required(base[0], "base expression", buf)?;
        buf.print(".");
        buf.print(require_identifier(node, "field name", field_name)?);
        Ok(())
    }
}

/// `base[index]`
pub struct IndexAccessExpressionVisitor;

impl ConstructVisitor for IndexAccessExpressionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let parts = exact_children(node, 2, "a base and an index")?;
        traversal.visit_required(parts[0], "base expression", buf)?;
        buf.print("[");
        traversal.visit_required(parts[1], "index", buf)?;
        buf.print("]");
        Ok(())
    }
}

/// `(int)expr`
pub struct TypeCastExpressionVisitor;

impl ConstructVisitor for TypeCastExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::TypeCastExpression { target_type } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print("(");
        buf.print(require_type(node, target_type)?);
        buf.print(")");
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
}

/// `<string>expr`
pub struct TypeConversionExpressionVisitor;

impl ConstructVisitor for TypeConversionExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::TypeConversionExpression { target_type } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print("<");
        buf.print(require_type(node, target_type)?);
        buf.print(">");
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
}

/// Children between `open` and `close`, joined by the argument separator.
pub struct DelimitedExpressionVisitor {
    open: &'static str,
    close: &'static str,
}

impl ConstructVisitor for DelimitedExpressionVisitor {
    fn begin_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(self.open);
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_arguments(node.children(), buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(self.close);
        Ok(())
    }
}

/// `{k:v, k2:v2}`; every entry must be a key-value pair.
pub struct MapInitExpressionVisitor;

impl ConstructVisitor for MapInitExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        if let Some(&entry) = node
            .children()
            .iter()
            .find(|id| node.child_tag(**id) != Some(NodeTag::KeyValueExpression))
        {
            return Err(malformed(
                node,
                format!("map entry {} is not a key-value pair", entry),
            ));
        }
        buf.print("{");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_arguments(node.children(), buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print("}");
        Ok(())
    }
}

/// `key:value`
pub struct KeyValueExpressionVisitor;

impl ConstructVisitor for KeyValueExpressionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let parts = exact_children(node, 2, "a key and a value")?;
        traversal.visit_required(parts[0], "key", buf)?;
        buf.print(":");
        traversal.visit_required(parts[1], "value", buf)?;
        Ok(())
    }
}

/// `` `template` ``
pub struct BackQuoteExpressionVisitor;

impl ConstructVisitor for BackQuoteExpressionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::BackQuoteExpression { template } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        forbid_children(node)?;
        if template.contains('`') {
            return Err(malformed(node, "template contains a back quote"));
        }
        buf.print("`");
        buf.print(template);
        buf.print("`");
        Ok(())
    }

    fn visit(
        &self,
        _node: NodeRef<'_>,
        _traversal: &mut Traversal<'_>,
        _buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        Ok(())
    }
}
