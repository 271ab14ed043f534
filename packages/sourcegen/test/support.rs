#![allow(dead_code)]

use composer_sourcegen::ast::LiteralType;
use composer_sourcegen::{
    Ast, GenerateOptions, NodeId, NodeKind, SourceGenerator,
};

pub fn invocation(name: &str) -> NodeKind {
    NodeKind::FunctionInvocationExpression {
        function: format!("{}(", name),
    }
}

pub fn var(name: &str) -> NodeKind {
    NodeKind::VariableReferenceExpression {
        package_name: None,
        name: name.to_string(),
    }
}

pub fn string_lit(value: &str) -> NodeKind {
    NodeKind::BasicLiteralExpression {
        literal_type: LiteralType::String,
        value: value.to_string(),
    }
}

pub fn int_lit(value: &str) -> NodeKind {
    NodeKind::BasicLiteralExpression {
        literal_type: LiteralType::Int,
        value: value.to_string(),
    }
}

pub fn param(type_name: &str, name: &str) -> NodeKind {
    NodeKind::ParameterDefinition {
        type_name: type_name.to_string(),
        name: name.to_string(),
    }
}

/// Appends `kind` under `parent`.
pub fn add(ast: &mut Ast, parent: NodeId, kind: NodeKind) -> NodeId {
    ast.append_child(parent, kind).unwrap()
}

/// Builds a chain of `depth` nested invocations `f0(f1(...))`.
pub fn nested_invocations(depth: usize) -> Ast {
    let (mut ast, mut current) = Ast::with_root(invocation("f0"));
    for i in 1..depth {
        current = add(&mut ast, current, invocation(&format!("f{}", i)));
    }
    ast
}

pub fn generate(ast: &Ast) -> String {
    SourceGenerator::default().generate(ast).unwrap()
}

pub fn generate_with(ast: &Ast, options: GenerateOptions) -> String {
    SourceGenerator::new(options).generate(ast).unwrap()
}
