use std::path::Path;

use composer_sourcegen::ast::{BinaryOperator, SourcePosition};
use composer_sourcegen::{
    Ast, AstDocument, DocumentError, GenerateError, NodeId, NodeKind, SourceGenerator,
};

#[path = "support.rs"]
mod support;

use support::{add, generate, int_lit, invocation, var};

const HELLO_TREE: &str = r#"{
    "file": {"url": "hello.bal"},
    "root": {
        "kind": {"type": "CompilationUnit"},
        "children": [
            {"kind": {"type": "PackageDeclaration", "name": "samples"}},
            {
                "kind": {"type": "FunctionDefinition", "name": "main", "modifiers": "PUBLIC"},
                "children": [
                    {"kind": {"type": "ParameterDefinition", "typeName": "string[]", "name": "args"}},
                    {
                        "kind": {"type": "ExpressionStatement"},
                        "children": [
                            {
                                "kind": {"type": "FunctionInvocationExpression", "function": "system:println("},
                                "children": [
                                    {"kind": {"type": "BasicLiteralExpression", "literalType": "string", "value": "Hello"}}
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    }
}"#;

const HELLO_SOURCE: &str = r#"package samples;

public function main (string[] args) {
    system:println("Hello");
}"#;

fn sample_ast() -> Ast {
    let (mut ast, root) = Ast::with_root(invocation("max"));
    let sum = add(
        &mut ast,
        root,
        NodeKind::BinaryExpression {
            operator: BinaryOperator::Plus,
        },
    );
    add(&mut ast, sum, var("a"));
    add(&mut ast, sum, int_lit("1"));
    add(&mut ast, root, invocation("limit"));
    ast.set_position(sum, SourcePosition::new(3, 8)).unwrap();
    ast
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_from_tree_document() {
        let ast = AstDocument::from_json(HELLO_TREE).unwrap();
        assert_eq!(ast.source_file().map(|f| f.url.as_str()), Some("hello.bal"));
        assert_eq!(generate(&ast), HELLO_SOURCE);
    }

    #[test]
    fn should_generate_identically_after_saving_and_loading() {
        let ast = sample_ast();
        let before = generate(&ast);

        let json = AstDocument::to_json(&ast).unwrap();
        assert!(json.contains(r#""type": "FunctionInvocationExpression""#));
        assert!(json.contains(r#""operator": "+""#));

        let reloaded = AstDocument::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), ast.len());
        assert_eq!(
            reloaded.get(NodeId(1)).and_then(|n| n.position()),
            Some(SourcePosition::new(3, 8))
        );
        assert_eq!(generate(&reloaded), before);
        assert_eq!(before, "max(a + 1, limit())");
    }

    #[test]
    fn should_keep_shared_nodes_through_arena_document() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let a = add(&mut ast, root, invocation("a"));
        let b = add(&mut ast, root, invocation("b"));
        ast.share_child(b, a).unwrap();

        let reloaded = AstDocument::from_json(&AstDocument::to_json(&ast).unwrap()).unwrap();
        assert_eq!(reloaded.children(b), &[a]);
        assert_eq!(generate(&reloaded), "foo(a(), b())");
    }

    #[test]
    fn should_reject_mismatched_ids() {
        let err = AstDocument::from_json(
            r#"{"root": 0, "nodes": [{"id": 3, "kind": {"type": "CompilationUnit"}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::IdMismatch {
                index: 0,
                id: NodeId(3)
            }
        ));
    }

    #[test]
    fn should_reject_missing_root() {
        let err = AstDocument::from_json(r#"{"root": 2, "nodes": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::MissingRoot(NodeId(2))));
    }

    #[test]
    fn should_reject_unknown_kind() {
        let err = AstDocument::from_json(r#"{"root": {"kind": {"type": "GotoStatement"}}}"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn should_report_unreadable_file() {
        let err = AstDocument::load(Path::new("does/not/exist.json")).unwrap_err();
        match err {
            DocumentError::Io { path, .. } => assert_eq!(path, Path::new("does/not/exist.json")),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn should_refuse_to_save_without_root() {
        assert!(matches!(
            AstDocument::to_json(&Ast::new()),
            Err(DocumentError::NoRoot)
        ));
    }

    #[test]
    fn should_report_broken_parent_link_from_document() {
        let json = r#"{
            "root": 0,
            "nodes": [
                {"id": 0, "kind": {"type": "FunctionDefinition", "name": "f"}, "children": [1, 2]},
                {"id": 1, "kind": {"type": "ParameterDefinition", "typeName": "int", "name": "a"}, "parent": 0},
                {"id": 2, "kind": {"type": "ReturnStatement"}, "children": [3], "parent": 0},
                {"id": 3, "kind": {"type": "VariableReferenceExpression", "name": "a"}}
            ]
        }"#;
        let ast = AstDocument::from_json(json).unwrap();
        let err = SourceGenerator::default().generate(&ast).unwrap_err();

        assert!(matches!(err, GenerateError::MissingParent { node: NodeId(3), .. }));
        assert_eq!(
            err.to_string(),
            "VariableReferenceExpression#3 has no parent link (at FunctionDefinition#0 > ReturnStatement#2 > VariableReferenceExpression#3)"
        );

        // Fixing the link is enough.
        let mut ast = ast;
        ast.node_mut(NodeId(3)).unwrap().parent = Some(NodeId(2));
        assert_eq!(generate(&ast), "function f (int a) {\n    return a;\n}");
    }
}
