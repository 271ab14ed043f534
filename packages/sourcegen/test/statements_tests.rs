use composer_sourcegen::ast::BinaryOperator;
use composer_sourcegen::{Ast, GenerateError, NodeKind, SourceGenerator};

#[path = "support.rs"]
mod support;

use support::{add, generate, int_lit, invocation, param, string_lit, var};

fn comment(text: &str) -> NodeKind {
    NodeKind::CommentStatement {
        text: text.to_string(),
    }
}

fn binary(operator: BinaryOperator) -> NodeKind {
    NodeKind::BinaryExpression { operator }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_if_else_chain() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::IfElseStatement);

        let if_clause = add(&mut ast, stmt, NodeKind::IfStatement);
        let cond = add(&mut ast, if_clause, binary(BinaryOperator::Greater));
        add(&mut ast, cond, var("a"));
        add(&mut ast, cond, int_lit("1"));
        let log = add(&mut ast, if_clause, NodeKind::ExpressionStatement);
        let call = add(&mut ast, log, invocation("log"));
        add(&mut ast, call, string_lit("big"));

        let else_if = add(&mut ast, stmt, NodeKind::ElseIfStatement);
        add(&mut ast, else_if, var("b"));
        add(&mut ast, else_if, NodeKind::BreakStatement);

        let else_clause = add(&mut ast, stmt, NodeKind::ElseStatement);
        add(&mut ast, else_clause, NodeKind::ReturnStatement);

        let expected = r#"if (a > 1) {
    log("big");
} else if (b) {
    break;
} else {
    return;
}"#;
        assert_eq!(generate(&ast), expected);
    }

    #[test]
    fn should_reject_else_without_if() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::IfElseStatement);
        add(&mut ast, stmt, NodeKind::ElseStatement);

        match SourceGenerator::default().generate(&ast) {
            Err(GenerateError::MalformedFragment { reason, .. }) => {
                assert_eq!(reason, "missing IfStatement clause");
            }
            other => panic!("expected a malformed clause sequence, got {:?}", other),
        }
    }

    #[test]
    fn should_reject_clause_after_else() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::IfElseStatement);
        let if_clause = add(&mut ast, stmt, NodeKind::IfStatement);
        add(&mut ast, if_clause, var("a"));
        add(&mut ast, stmt, NodeKind::ElseStatement);
        let late = add(&mut ast, stmt, NodeKind::ElseIfStatement);
        add(&mut ast, late, var("b"));

        let err = SourceGenerator::default().generate(&ast).unwrap_err();
        assert!(err
            .to_string()
            .contains("unexpected ElseIfStatement#4 in clause sequence"));
    }

    #[test]
    fn should_generate_while_loop() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::WhileStatement);
        add(&mut ast, stmt, var("running"));
        let assign = add(&mut ast, stmt, NodeKind::AssignmentStatement);
        add(&mut ast, assign, var("i"));
        let sum = add(&mut ast, assign, binary(BinaryOperator::Plus));
        add(&mut ast, sum, var("i"));
        add(&mut ast, sum, int_lit("1"));

        assert_eq!(generate(&ast), "while (running) {\n    i = i + 1;\n}");
    }

    #[test]
    fn should_generate_multi_target_assignment() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::AssignmentStatement);
        add(&mut ast, stmt, var("a"));
        add(&mut ast, stmt, var("b"));
        let call = add(&mut ast, stmt, invocation("split"));
        add(&mut ast, call, var("s"));

        assert_eq!(generate(&ast), "a, b = split(s);");
    }

    #[test]
    fn should_reject_assignment_without_target() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::AssignmentStatement);
        add(&mut ast, stmt, var("a"));

        let err = SourceGenerator::default().generate(&ast).unwrap_err();
        assert!(err.to_string().contains("missing assignment target"));
    }

    #[test]
    fn should_generate_return_values() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::ReturnStatement);
        add(&mut ast, stmt, var("a"));
        add(&mut ast, stmt, var("b"));
        assert_eq!(generate(&ast), "return a, b;");
    }

    #[test]
    fn should_prefix_every_comment_line() {
        let (ast, _) = Ast::with_root(comment("line one\n\n// already marked"));
        assert_eq!(generate(&ast), "// line one\n//\n// already marked");
    }

    #[test]
    fn should_generate_try_catch_finally() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::TryCatchStatement);
        let try_clause = add(&mut ast, stmt, NodeKind::TryStatement);
        let throw = add(&mut ast, try_clause, NodeKind::ThrowStatement);
        add(&mut ast, throw, var("err"));
        let catch = add(
            &mut ast,
            stmt,
            NodeKind::CatchStatement {
                type_name: "exception".to_string(),
                name: "e".to_string(),
            },
        );
        add(&mut ast, catch, comment("recover"));
        let finally = add(&mut ast, stmt, NodeKind::FinallyStatement);
        add(&mut ast, finally, NodeKind::AbortStatement);

        let expected = r#"try {
    throw err;
} catch (exception e) {
    // recover
} finally {
    abort;
}"#;
        assert_eq!(generate(&ast), expected);
    }

    #[test]
    fn should_generate_fork_join_with_timeout() {
        let (mut ast, fork) = Ast::with_root(NodeKind::ForkJoinStatement);

        let w1 = add(
            &mut ast,
            fork,
            NodeKind::WorkerDeclaration {
                name: "w1".to_string(),
            },
        );
        add(&mut ast, w1, param("message", "m"));
        let send = add(
            &mut ast,
            w1,
            NodeKind::WorkerInvocationStatement {
                worker_name: "w2".to_string(),
            },
        );
        add(&mut ast, send, var("m"));

        let w2 = add(
            &mut ast,
            fork,
            NodeKind::WorkerDeclaration {
                name: "w2".to_string(),
            },
        );
        add(&mut ast, w2, param("message", "m"));
        let receive = add(
            &mut ast,
            w2,
            NodeKind::WorkerReplyStatement {
                worker_name: "w1".to_string(),
            },
        );
        add(&mut ast, receive, var("m"));

        let join = add(
            &mut ast,
            fork,
            NodeKind::JoinStatement {
                condition: "all".to_string(),
                type_name: "message[]".to_string(),
                name: "results".to_string(),
            },
        );
        let reply = add(&mut ast, join, NodeKind::ReplyStatement);
        let first = add(&mut ast, reply, NodeKind::IndexAccessExpression);
        add(&mut ast, first, var("results"));
        add(&mut ast, first, int_lit("0"));

        let timeout = add(
            &mut ast,
            fork,
            NodeKind::TimeoutStatement {
                type_name: "message[]".to_string(),
                name: "timedOut".to_string(),
            },
        );
        add(&mut ast, timeout, int_lit("100"));
        add(&mut ast, timeout, comment("timed out"));

        let expected = r#"fork {
    worker w1 (message m) {
        m -> w2;
    }
    worker w2 (message m) {
        m <- w1;
    }
} join (all) (message[] results) {
    reply results[0];
} timeout (100) (message[] timedOut) {
    // timed out
}"#;
        assert_eq!(generate(&ast), expected);
    }

    #[test]
    fn should_generate_transaction_clauses() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::TransactionAbortedStatement);
        let transaction = add(&mut ast, stmt, NodeKind::TransactionStatement);
        let update = add(&mut ast, transaction, NodeKind::ExpressionStatement);
        let action = add(
            &mut ast,
            update,
            NodeKind::ActionInvocationExpression {
                package_name: Some("sql".to_string()),
                connector_name: "ClientConnector".to_string(),
                action_name: "update".to_string(),
            },
        );
        add(&mut ast, action, var("db"));
        add(&mut ast, action, string_lit("UPDATE t"));
        add(&mut ast, stmt, NodeKind::AbortedStatement);
        let committed = add(&mut ast, stmt, NodeKind::CommittedStatement);
        add(&mut ast, committed, comment("done"));

        let expected = r#"transaction {
    sql:ClientConnector.update(db, "UPDATE t");
} aborted {
} committed {
    // done
}"#;
        assert_eq!(generate(&ast), expected);
    }

    #[test]
    fn should_generate_transform_and_nested_blocks() {
        let (mut ast, transform) = Ast::with_root(NodeKind::TransformStatement);
        let assign = add(&mut ast, transform, NodeKind::AssignmentStatement);
        add(&mut ast, assign, var("b"));
        add(&mut ast, assign, var("a"));
        let block = add(&mut ast, transform, NodeKind::BlockStatement);
        add(&mut ast, block, NodeKind::BreakStatement);

        assert_eq!(
            generate(&ast),
            "transform {\n    b = a;\n    {\n        break;\n    }\n}"
        );
    }

    #[test]
    fn should_reject_children_on_bare_statement() {
        let (mut ast, stmt) = Ast::with_root(NodeKind::BreakStatement);
        add(&mut ast, stmt, var("x"));

        let err = SourceGenerator::default().generate(&ast).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed BreakStatement#0: takes no children (at BreakStatement#0)"
        );
    }
}
