use composer_sourcegen::{Ast, AstDocument, GenerateError, GenerateOptions, NodeKind, SourceGenerator};

#[path = "support.rs"]
mod support;

use support::{add, generate, generate_with, invocation, nested_invocations, string_lit, var};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_nested_invocation() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        add(&mut ast, root, invocation("bar"));

        assert_eq!(generate(&ast), "foo(bar())");
    }

    #[test]
    fn should_generate_invocation_without_arguments() {
        let (ast, _) = Ast::with_root(invocation("foo"));
        assert_eq!(generate(&ast), "foo()");
    }

    #[test]
    fn should_keep_sibling_order() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        add(&mut ast, root, invocation("a"));
        add(&mut ast, root, invocation("b"));

        assert_eq!(generate(&ast), "foo(a(), b())");
        assert_eq!(
            generate_with(&ast, GenerateOptions::default().with_argument_separator("")),
            "foo(a()b())"
        );
    }

    #[test]
    fn should_keep_insertion_order_after_edits() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        add(&mut ast, root, invocation("a"));
        add(&mut ast, root, invocation("c"));
        ast.insert_child(root, 1, invocation("b")).unwrap();

        assert_eq!(generate(&ast), "foo(a(), b(), c())");
    }

    #[test]
    fn should_compose_deeply_nested_invocations() {
        let ast = nested_invocations(4);
        assert_eq!(generate(&ast), "f0(f1(f2(f3())))");
    }

    #[test]
    fn should_mix_invocations_with_other_arguments() {
        let (mut ast, root) = Ast::with_root(invocation("strings:toUpperCase"));
        let concat = add(&mut ast, root, invocation("strings:concat"));
        add(&mut ast, concat, var("name"));
        add(&mut ast, concat, string_lit("!"));

        assert_eq!(
            generate(&ast),
            "strings:toUpperCase(strings:concat(name, \"!\"))"
        );
    }

    #[test]
    fn should_normalize_closed_fragment() {
        let (mut ast, root) = Ast::with_root(NodeKind::FunctionInvocationExpression {
            function: "foo()".to_string(),
        });
        add(
            &mut ast,
            root,
            NodeKind::FunctionInvocationExpression {
                function: "bar()".to_string(),
            },
        );

        assert_eq!(generate(&ast), "foo(bar())");
    }

    #[test]
    fn should_reject_malformed_fragment() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let bad = add(
            &mut ast,
            root,
            NodeKind::FunctionInvocationExpression {
                function: "bar".to_string(),
            },
        );

        match SourceGenerator::default().generate(&ast) {
            Err(GenerateError::MalformedFragment { node, path, .. }) => {
                assert_eq!(node, bad);
                assert_eq!(
                    path.to_string(),
                    "FunctionInvocationExpression#0 > FunctionInvocationExpression#1"
                );
            }
            other => panic!("expected a malformed fragment error, got {:?}", other),
        }
    }

    #[test]
    fn should_reject_empty_fragment() {
        let (ast, _) = Ast::with_root(NodeKind::FunctionInvocationExpression {
            function: String::new(),
        });
        let err = SourceGenerator::default().generate(&ast).unwrap_err();
        assert!(matches!(err, GenerateError::MalformedFragment { .. }));
        assert!(err.to_string().contains("invocation fragment is empty"));
    }

    #[test]
    fn should_emit_shared_argument_once() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let a = add(&mut ast, root, invocation("a"));
        let b = add(&mut ast, root, invocation("b"));
        ast.share_child(b, a).unwrap();

        assert_eq!(generate(&ast), "foo(a(), b())");
    }

    #[test]
    fn should_not_leave_dangling_separator_for_skipped_argument() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let a = add(&mut ast, root, invocation("a"));
        ast.share_child(root, a).unwrap();
        add(&mut ast, root, invocation("b"));

        assert_eq!(generate(&ast), "foo(a(), b())");
    }

    #[test]
    fn should_fail_for_argument_without_parent() {
        let json = r#"{
            "root": 0,
            "nodes": [
                {"id": 0, "kind": {"type": "FunctionInvocationExpression", "function": "foo("}, "children": [1]},
                {"id": 1, "kind": {"type": "FunctionInvocationExpression", "function": "bar("}, "parent": null}
            ]
        }"#;
        let ast = AstDocument::from_json(json).unwrap();

        match SourceGenerator::default().generate(&ast) {
            Err(GenerateError::MissingParent { node, path, .. }) => {
                assert_eq!(node.0, 1);
                assert_eq!(
                    path.to_string(),
                    "FunctionInvocationExpression#0 > FunctionInvocationExpression#1"
                );
            }
            other => panic!("expected a missing parent error, got {:?}", other),
        }
    }

    #[test]
    fn should_produce_identical_output_on_repeated_generation() {
        let (mut ast, root) = Ast::with_root(invocation("foo"));
        let bar = add(&mut ast, root, invocation("bar"));
        add(&mut ast, bar, var("x"));
        add(&mut ast, root, invocation("baz"));

        let generator = SourceGenerator::default();
        let first = generator.generate(&ast).unwrap();
        let second = generator.generate(&ast).unwrap();
        assert_eq!(first, "foo(bar(x), baz())");
        assert_eq!(first, second);
    }
}
