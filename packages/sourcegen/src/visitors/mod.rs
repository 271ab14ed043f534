//! Per-construct visitors.
//!
//! One unit struct per construct kind, grouped by the part of the grammar it
//! belongs to. [`register_all`] installs every one of them.

pub mod control_flow;
pub mod declarations;
pub mod expressions;
pub mod statements;

use crate::ast::{NodeId, NodeRef, NodeTag};
use crate::error::{GenerateError, GenerateResult};
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;
use crate::util;
use crate::visitor::registry::VisitorRegistry;

pub fn register_all(registry: &mut VisitorRegistry) {
    declarations::register(registry);
    statements::register(registry);
    control_flow::register(registry);
    expressions::register(registry);
}

/// Error for a node whose kind does not match the visitor it was routed to.
pub(crate) fn kind_mismatch(node: NodeRef<'_>) -> GenerateError {
    GenerateError::malformed(
        node.id(),
        node.tag(),
        "routed to a visitor for a different construct",
    )
}

pub(crate) fn malformed(node: NodeRef<'_>, reason: impl Into<String>) -> GenerateError {
    GenerateError::malformed(node.id(), node.tag(), reason)
}

pub(crate) fn require_identifier<'a>(
    node: NodeRef<'_>,
    what: &str,
    value: &'a str,
) -> GenerateResult<&'a str> {
    if value.is_empty() {
        return Err(malformed(node, format!("{} is empty", what)));
    }
    if !util::is_identifier(value) {
        return Err(malformed(node, format!("{} `{}` is not an identifier", what, value)));
    }
    Ok(value)
}

pub(crate) fn require_type<'a>(node: NodeRef<'_>, value: &'a str) -> GenerateResult<&'a str> {
    if !util::is_type_name(value) {
        return Err(malformed(node, format!("`{}` is not a type name", value)));
    }
    Ok(value)
}

/// Prints `pkg:name` or `name`.
pub(crate) fn print_qualified(
    node: NodeRef<'_>,
    package_name: Option<&str>,
    name: &str,
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    if let Some(pkg) = package_name {
        buf.print(require_identifier(node, "package name", pkg)?);
        buf.print(":");
    }
    buf.print(require_identifier(node, "name", name)?);
    Ok(())
}

/// Requires exactly `count` children.
pub(crate) fn exact_children<'a>(
    node: NodeRef<'a>,
    count: usize,
    what: &str,
) -> GenerateResult<&'a [NodeId]> {
    let children = node.children();
    if children.len() != count {
        return Err(malformed(
            node,
            format!("expected {}, found {} children", what, children.len()),
        ));
    }
    Ok(children)
}

/// Splits off the leading child, required to be present.
pub(crate) fn split_first<'a>(
    node: NodeRef<'a>,
    what: &str,
) -> GenerateResult<(NodeId, &'a [NodeId])> {
    node.children()
        .split_first()
        .map(|(first, rest)| (*first, rest))
        .ok_or_else(|| malformed(node, format!("missing {}", what)))
}

pub(crate) fn forbid_children(node: NodeRef<'_>) -> GenerateResult<()> {
    if !node.children().is_empty() {
        return Err(malformed(node, "takes no children"));
    }
    Ok(())
}

/// Children of a definition, split into the sections of its header and body.
#[derive(Debug, Default)]
pub(crate) struct Sections {
    pub annotations: Vec<NodeId>,
    pub parameters: Vec<NodeId>,
    pub returns: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

impl Sections {
    /// Sections must appear in header order: annotations, parameters, return
    /// parameters, then body members.
    pub fn split(node: NodeRef<'_>) -> GenerateResult<Sections> {
        let mut sections = Sections::default();
        let mut current = 0;
        for &id in node.children() {
            let rank = match node.child_tag(id) {
                Some(NodeTag::Annotation) => 0,
                Some(NodeTag::ParameterDefinition) => 1,
                Some(NodeTag::ReturnParameter) => 2,
                _ => 3,
            };
            if rank < current {
                let tag = node.child_tag(id).map(|t| t.name()).unwrap_or("node");
                return Err(malformed(
                    node,
                    format!("{}{} is out of order in the definition", tag, id),
                ));
            }
            current = rank;
            match rank {
                0 => sections.annotations.push(id),
                1 => sections.parameters.push(id),
                2 => sections.returns.push(id),
                _ => sections.body.push(id),
            }
        }
        Ok(sections)
    }
}

/// Generates members of a definition body one per line, separating nested
/// definitions from what precedes them with a blank line.
pub(crate) fn visit_members(
    traversal: &mut Traversal<'_>,
    ids: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<usize> {
    let blank_lines = traversal.options().blank_line_between_definitions;
    let mut emitted = 0;
    for &id in ids {
        let tag = traversal.ast().node(id).map(|n| n.tag());
        let Some(child) = traversal.render_child(id, buf)? else {
            continue;
        };
        let nested_definition = matches!(
            tag,
            Some(NodeTag::ResourceDefinition | NodeTag::ActionDefinition)
        );
        if blank_lines && emitted > 0 && nested_definition {
            buf.newline();
        }
        buf.append_buffer(child);
        buf.newline();
        emitted += 1;
    }
    Ok(emitted)
}

/// `{` members `}`, using [`visit_members`].
pub(crate) fn visit_member_block(
    traversal: &mut Traversal<'_>,
    ids: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<usize> {
    buf.println("{");
    buf.inc_indent();
    let emitted = visit_members(traversal, ids, buf)?;
    buf.dec_indent();
    buf.print("}");
    Ok(emitted)
}
