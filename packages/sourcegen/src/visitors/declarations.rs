//! Top-level declarations and definitions.
//!
//! Definitions print their annotations one per line, then the header, then
//! either a block body or `;` for native definitions. Header children must
//! come in order: annotations, parameters, return parameters, body.

use crate::ast::{Modifiers, NodeId, NodeKind, NodeRef, NodeTag};
use crate::error::GenerateResult;
use crate::output::source_buffer::SourceBuffer;
use crate::traversal::Traversal;
use crate::util;
use crate::visitor::registry::VisitorRegistry;
use crate::visitor::ConstructVisitor;
use crate::visitors::{
    exact_children, kind_mismatch, malformed, print_qualified, require_identifier, require_type,
    visit_member_block, Sections,
};

pub fn register(registry: &mut VisitorRegistry) {
    registry.register(NodeTag::CompilationUnit, Box::new(CompilationUnitVisitor));
    registry.register(NodeTag::PackageDeclaration, Box::new(PackageDeclarationVisitor));
    registry.register(NodeTag::ImportDeclaration, Box::new(ImportDeclarationVisitor));
    registry.register(NodeTag::Annotation, Box::new(AnnotationVisitor));
    registry.register(NodeTag::AnnotationAttribute, Box::new(AnnotationAttributeVisitor));
    registry.register(NodeTag::ServiceDefinition, Box::new(ServiceDefinitionVisitor));
    registry.register(NodeTag::ResourceDefinition, Box::new(ResourceDefinitionVisitor));
    registry.register(NodeTag::FunctionDefinition, Box::new(FunctionDefinitionVisitor));
    registry.register(NodeTag::ConnectorDefinition, Box::new(ConnectorDefinitionVisitor));
    registry.register(NodeTag::ActionDefinition, Box::new(ActionDefinitionVisitor));
    registry.register(NodeTag::StructDefinition, Box::new(StructDefinitionVisitor));
    registry.register(NodeTag::ConstantDefinition, Box::new(ConstantDefinitionVisitor));
    registry.register(NodeTag::TypeMapperDefinition, Box::new(TypeMapperDefinitionVisitor));
    registry.register(NodeTag::WorkerDeclaration, Box::new(WorkerDeclarationVisitor));
    registry.register(NodeTag::ParameterDefinition, Box::new(ParameterDefinitionVisitor));
    registry.register(NodeTag::ReturnParameter, Box::new(ReturnParameterVisitor));
    registry.register(NodeTag::VariableDefinition, Box::new(VariableDefinitionVisitor));
}

fn print_modifiers(
    node: NodeRef<'_>,
    modifiers: Modifiers,
    allowed: Modifiers,
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    if !allowed.contains(modifiers) {
        return Err(malformed(
            node,
            format!("modifiers {:?} are not allowed here", modifiers - allowed),
        ));
    }
    if modifiers.contains(Modifiers::PUBLIC) {
        buf.print("public ");
    }
    if modifiers.contains(Modifiers::NATIVE) {
        buf.print("native ");
    }
    Ok(())
}

fn print_parameters(
    traversal: &mut Traversal<'_>,
    ids: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    buf.print("(");
    traversal.visit_separated(ids, ", ", buf)?;
    buf.print(")");
    Ok(())
}

fn print_returns(
    traversal: &mut Traversal<'_>,
    ids: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    if !ids.is_empty() {
        buf.print(" ");
        print_parameters(traversal, ids, buf)?;
    }
    Ok(())
}

/// Statement block, or `;` for a native definition.
fn print_body(
    node: NodeRef<'_>,
    native: bool,
    traversal: &mut Traversal<'_>,
    body: &[NodeId],
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    if native {
        if !body.is_empty() {
            return Err(malformed(node, "native definition cannot have a body"));
        }
        buf.print(";");
        return Ok(());
    }
    buf.print(" ");
    traversal.visit_block(body, buf)?;
    Ok(())
}

fn forbid_returns(node: NodeRef<'_>, sections: &Sections) -> GenerateResult<()> {
    if !sections.returns.is_empty() {
        return Err(malformed(node, "does not take return parameters"));
    }
    Ok(())
}

pub struct CompilationUnitVisitor;

impl ConstructVisitor for CompilationUnitVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let blank_lines = traversal.options().blank_line_between_definitions;
        let mut prev: Option<NodeTag> = None;

        for &id in node.children() {
            let tag = node.child_tag(id);
            let Some(child) = traversal.render_child(id, buf)? else {
                continue;
            };
            if let Some(prev_tag) = prev {
                buf.newline();
                let starts_group = tag.map_or(false, |t| t != prev_tag || t.is_definition());
                if blank_lines && starts_group && prev_tag != NodeTag::CommentStatement {
                    buf.newline();
                }
            }
            buf.append_buffer(child);
            prev = tag;
        }
        Ok(())
    }
}

pub struct PackageDeclarationVisitor;

impl ConstructVisitor for PackageDeclarationVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::PackageDeclaration { name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        if !util::is_qualified_name(name) {
            return Err(malformed(node, format!("`{}` is not a package name", name)));
        }
        buf.print("package ");
        buf.print(name);
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

pub struct ImportDeclarationVisitor;

impl ConstructVisitor for ImportDeclarationVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::ImportDeclaration {
            package_name,
            alias,
        } = node.kind()
        else {
            return Err(kind_mismatch(node));
        };
        if !util::is_qualified_name(package_name) {
            return Err(malformed(
                node,
                format!("`{}` is not a package name", package_name),
            ));
        }
        buf.print("import ");
        buf.print(package_name);
        if let Some(alias) = alias {
            buf.print(" as ");
            buf.print(require_identifier(node, "alias", alias)?);
        }
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

/// `@pkg:Name {key:value, ...}`
pub struct AnnotationVisitor;

impl ConstructVisitor for AnnotationVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::Annotation { package_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print("@");
        print_qualified(node, package_name.as_deref(), name, buf)?;
        buf.print(" {");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        traversal.visit_separated(node.children(), ", ", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print("}");
        Ok(())
    }
}

pub struct AnnotationAttributeVisitor;

impl ConstructVisitor for AnnotationAttributeVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::AnnotationAttribute { key } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print(require_identifier(node, "attribute key", key)?);
        buf.print(":");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let value = exact_children(node, 1, "an attribute value")?;
        traversal.visit_required(value[0], "attribute value", buf)?;
        Ok(())
    }
}

/// `service<http> name { ... }`
pub struct ServiceDefinitionVisitor;

impl ConstructVisitor for ServiceDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::ServiceDefinition { protocol, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        if !sections.parameters.is_empty() {
            return Err(malformed(node, "services take no parameters"));
        }
        forbid_returns(node, &sections)?;

        traversal.visit_lines(&sections.annotations, buf)?;
        buf.print("service<");
        buf.print(require_identifier(node, "protocol", protocol)?);
        buf.print("> ");
        buf.print(require_identifier(node, "service name", name)?);
        buf.print(" ");
        visit_member_block(traversal, &sections.body, buf)?;
        Ok(())
    }
}

/// `resource name (params) { ... }`
pub struct ResourceDefinitionVisitor;

impl ConstructVisitor for ResourceDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::ResourceDefinition { name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        forbid_returns(node, &sections)?;

        traversal.visit_lines(&sections.annotations, buf)?;
        buf.print("resource ");
        buf.print(require_identifier(node, "resource name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        print_body(node, false, traversal, &sections.body, buf)
    }
}

/// `[public ][native ]function name (params) (returns) { ... }`
pub struct FunctionDefinitionVisitor;

impl ConstructVisitor for FunctionDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::FunctionDefinition { name, modifiers } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;

        traversal.visit_lines(&sections.annotations, buf)?;
        print_modifiers(node, *modifiers, Modifiers::PUBLIC | Modifiers::NATIVE, buf)?;
        buf.print("function ");
        buf.print(require_identifier(node, "function name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        print_returns(traversal, &sections.returns, buf)?;
        print_body(
            node,
            modifiers.contains(Modifiers::NATIVE),
            traversal,
            &sections.body,
            buf,
        )
    }
}

/// `connector Name (params) { ... }`
pub struct ConnectorDefinitionVisitor;

impl ConstructVisitor for ConnectorDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::ConnectorDefinition { name, modifiers } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        forbid_returns(node, &sections)?;

        traversal.visit_lines(&sections.annotations, buf)?;
        print_modifiers(node, *modifiers, Modifiers::NATIVE, buf)?;
        buf.print("connector ");
        buf.print(require_identifier(node, "connector name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        buf.print(" ");
        visit_member_block(traversal, &sections.body, buf)?;
        Ok(())
    }
}

/// `[native ]action name (params) (returns) { ... }`
pub struct ActionDefinitionVisitor;

impl ConstructVisitor for ActionDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::ActionDefinition { name, modifiers } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;

        traversal.visit_lines(&sections.annotations, buf)?;
        print_modifiers(node, *modifiers, Modifiers::NATIVE, buf)?;
        buf.print("action ");
        buf.print(require_identifier(node, "action name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        print_returns(traversal, &sections.returns, buf)?;
        print_body(
            node,
            modifiers.contains(Modifiers::NATIVE),
            traversal,
            &sections.body,
            buf,
        )
    }
}

/// `struct Name { type field; ... }`
pub struct StructDefinitionVisitor;

impl ConstructVisitor for StructDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::StructDefinition { name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        if !sections.parameters.is_empty() || !sections.returns.is_empty() {
            return Err(malformed(node, "structs take no parameters"));
        }
        if let Some(&field) = sections
            .body
            .iter()
            .find(|id| node.child_tag(**id) != Some(NodeTag::VariableDefinition))
        {
            return Err(malformed(
                node,
                format!("struct member {} is not a field definition", field),
            ));
        }

        traversal.visit_lines(&sections.annotations, buf)?;
        buf.print("struct ");
        buf.print(require_identifier(node, "struct name", name)?);
        buf.print(" ");
        traversal.visit_block(&sections.body, buf)?;
        Ok(())
    }
}

/// `const type NAME = value;`
pub struct ConstantDefinitionVisitor;

impl ConstructVisitor for ConstantDefinitionVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::ConstantDefinition { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print("const ");
        buf.print(require_type(node, type_name)?);
        buf.print(" ");
        buf.print(require_identifier(node, "constant name", name)?);
        buf.print(" = ");
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let value = exact_children(node, 1, "a constant value")?;
        traversal.visit_required(value[0], "constant value", buf)?;
        Ok(())
    }

    fn end_visit(&self, _node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        buf.print(";");
        Ok(())
    }
}

/// `typemapper name (Source s) (Target) { ... }`
pub struct TypeMapperDefinitionVisitor;

impl ConstructVisitor for TypeMapperDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::TypeMapperDefinition { name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        if sections.parameters.len() != 1 || sections.returns.len() != 1 {
            return Err(malformed(
                node,
                "a type mapper takes one parameter and one return type",
            ));
        }

        traversal.visit_lines(&sections.annotations, buf)?;
        buf.print("typemapper ");
        buf.print(require_identifier(node, "type mapper name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        print_returns(traversal, &sections.returns, buf)?;
        print_body(node, false, traversal, &sections.body, buf)
    }
}

/// `worker name (message m) { ... }`
pub struct WorkerDeclarationVisitor;

impl ConstructVisitor for WorkerDeclarationVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::WorkerDeclaration { name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        let sections = Sections::split(node)?;
        if !sections.annotations.is_empty() {
            return Err(malformed(node, "workers cannot be annotated"));
        }
        forbid_returns(node, &sections)?;

        buf.print("worker ");
        buf.print(require_identifier(node, "worker name", name)?);
        buf.print(" ");
        print_parameters(traversal, &sections.parameters, buf)?;
        print_body(node, false, traversal, &sections.body, buf)
    }
}

/// `[@Annotation {} ]type name`
pub struct ParameterDefinitionVisitor;

impl ConstructVisitor for ParameterDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::ParameterDefinition { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        for &id in node.children() {
            if node.child_tag(id) != Some(NodeTag::Annotation) {
                return Err(malformed(node, "parameters may only contain annotations"));
            }
            if traversal.visit_child(id, buf)? {
                buf.print(" ");
            }
        }
        buf.print(require_type(node, type_name)?);
        buf.print(" ");
        buf.print(require_identifier(node, "parameter name", name)?);
        Ok(())
    }
}

pub struct ReturnParameterVisitor;

impl ConstructVisitor for ReturnParameterVisitor {
    fn begin_visit(&self, node: NodeRef<'_>, buf: &mut SourceBuffer) -> GenerateResult<()> {
        let NodeKind::ReturnParameter { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        buf.print(require_type(node, type_name)?);
        if let Some(name) = name {
            buf.print(" ");
            buf.print(require_identifier(node, "return parameter name", name)?);
        }
        Ok(())
    }

    fn visit(
        &self,
        node: NodeRef<'_>,
        _traversal: &mut Traversal<'_>,
        _buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        crate::visitors::forbid_children(node)
    }
}

/// `type name[ = init];`, shared by definition members and statements.
pub(crate) fn visit_variable(
    node: NodeRef<'_>,
    type_name: &str,
    name: &str,
    traversal: &mut Traversal<'_>,
    buf: &mut SourceBuffer,
) -> GenerateResult<()> {
    if node.children().len() > 1 {
        return Err(malformed(node, "a variable has at most one initializer"));
    }
    buf.print(require_type(node, type_name)?);
    buf.print(" ");
    buf.print(require_identifier(node, "variable name", name)?);
    if let Some(&init) = node.children().first() {
        buf.print(" = ");
        traversal.visit_required(init, "initializer", buf)?;
    }
    buf.print(";");
    Ok(())
}

pub struct VariableDefinitionVisitor;

impl ConstructVisitor for VariableDefinitionVisitor {
    fn visit(
        &self,
        node: NodeRef<'_>,
        traversal: &mut Traversal<'_>,
        buf: &mut SourceBuffer,
    ) -> GenerateResult<()> {
        let NodeKind::VariableDefinition { type_name, name } = node.kind() else {
            return Err(kind_mismatch(node));
        };
        visit_variable(node, type_name, name, traversal, buf)
    }
}
