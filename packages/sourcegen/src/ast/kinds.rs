//! Construct kinds of the composer AST.
//!
//! `NodeKind` carries the surface fragments each construct needs to be
//! regenerated; structure (operands, arguments, bodies) lives in the node's
//! ordered children.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifiers that prefix a definition header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const NATIVE = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "^")]
    Power,
    #[serde(rename = "==")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEquals,
    #[serde(rename = "<")]
    Lower,
    #[serde(rename = "<=")]
    LowerEquals,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Lower => "<",
            BinaryOperator::LowerEquals => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralType {
    String,
    Int,
    Float,
    Boolean,
    Null,
}

/// A construct together with its surface fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum NodeKind {
    // Top level and definitions
    CompilationUnit,
    PackageDeclaration {
        name: String,
    },
    ImportDeclaration {
        package_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Annotation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package_name: Option<String>,
        name: String,
    },
    AnnotationAttribute {
        key: String,
    },
    ServiceDefinition {
        protocol: String,
        name: String,
    },
    ResourceDefinition {
        name: String,
    },
    FunctionDefinition {
        name: String,
        #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
        modifiers: Modifiers,
    },
    ConnectorDefinition {
        name: String,
        #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
        modifiers: Modifiers,
    },
    ActionDefinition {
        name: String,
        #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
        modifiers: Modifiers,
    },
    StructDefinition {
        name: String,
    },
    ConstantDefinition {
        type_name: String,
        name: String,
    },
    TypeMapperDefinition {
        name: String,
    },
    WorkerDeclaration {
        name: String,
    },
    ParameterDefinition {
        type_name: String,
        name: String,
    },
    ReturnParameter {
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    VariableDefinition {
        type_name: String,
        name: String,
    },

    // Statements
    VariableDefinitionStatement {
        type_name: String,
        name: String,
    },
    AssignmentStatement,
    ExpressionStatement,
    ReturnStatement,
    ReplyStatement,
    ThrowStatement,
    BreakStatement,
    AbortStatement,
    CommentStatement {
        text: String,
    },
    WorkerInvocationStatement {
        worker_name: String,
    },
    WorkerReplyStatement {
        worker_name: String,
    },
    BlockStatement,
    TransformStatement,
    IfElseStatement,
    IfStatement,
    ElseIfStatement,
    ElseStatement,
    WhileStatement,
    TryCatchStatement,
    TryStatement,
    CatchStatement {
        type_name: String,
        name: String,
    },
    FinallyStatement,
    ForkJoinStatement,
    JoinStatement {
        condition: String,
        type_name: String,
        name: String,
    },
    TimeoutStatement {
        type_name: String,
        name: String,
    },
    TransactionAbortedStatement,
    TransactionStatement,
    AbortedStatement,
    CommittedStatement,

    // Expressions
    FunctionInvocationExpression {
        function: String,
    },
    ActionInvocationExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package_name: Option<String>,
        connector_name: String,
        action_name: String,
    },
    ConnectorInitExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package_name: Option<String>,
        connector_name: String,
    },
    BinaryExpression {
        operator: BinaryOperator,
    },
    UnaryExpression {
        operator: UnaryOperator,
    },
    ParenthesizedExpression,
    BasicLiteralExpression {
        literal_type: LiteralType,
        value: String,
    },
    VariableReferenceExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package_name: Option<String>,
        name: String,
    },
    FieldAccessExpression {
        field_name: String,
    },
    IndexAccessExpression,
    TypeCastExpression {
        target_type: String,
    },
    TypeConversionExpression {
        target_type: String,
    },
    ArrayInitExpression,
    MapInitExpression,
    KeyValueExpression,
    BackQuoteExpression {
        template: String,
    },
}

macro_rules! node_tags {
    ($($tag:ident),* $(,)?) => {
        /// Fieldless discriminant of [`NodeKind`]; the dispatch key of the
        /// visitor registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeTag {
            $($tag),*
        }

        impl NodeTag {
            pub const ALL: &'static [NodeTag] = &[$(NodeTag::$tag),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeTag::$tag => stringify!($tag)),*
                }
            }
        }

        impl NodeKind {
            pub fn tag(&self) -> NodeTag {
                match self {
                    $(NodeKind::$tag { .. } => NodeTag::$tag),*
                }
            }
        }
    };
}

node_tags!(
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    Annotation,
    AnnotationAttribute,
    ServiceDefinition,
    ResourceDefinition,
    FunctionDefinition,
    ConnectorDefinition,
    ActionDefinition,
    StructDefinition,
    ConstantDefinition,
    TypeMapperDefinition,
    WorkerDeclaration,
    ParameterDefinition,
    ReturnParameter,
    VariableDefinition,
    VariableDefinitionStatement,
    AssignmentStatement,
    ExpressionStatement,
    ReturnStatement,
    ReplyStatement,
    ThrowStatement,
    BreakStatement,
    AbortStatement,
    CommentStatement,
    WorkerInvocationStatement,
    WorkerReplyStatement,
    BlockStatement,
    TransformStatement,
    IfElseStatement,
    IfStatement,
    ElseIfStatement,
    ElseStatement,
    WhileStatement,
    TryCatchStatement,
    TryStatement,
    CatchStatement,
    FinallyStatement,
    ForkJoinStatement,
    JoinStatement,
    TimeoutStatement,
    TransactionAbortedStatement,
    TransactionStatement,
    AbortedStatement,
    CommittedStatement,
    FunctionInvocationExpression,
    ActionInvocationExpression,
    ConnectorInitExpression,
    BinaryExpression,
    UnaryExpression,
    ParenthesizedExpression,
    BasicLiteralExpression,
    VariableReferenceExpression,
    FieldAccessExpression,
    IndexAccessExpression,
    TypeCastExpression,
    TypeConversionExpression,
    ArrayInitExpression,
    MapInitExpression,
    KeyValueExpression,
    BackQuoteExpression,
);

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl NodeTag {
    /// Top-level definitions, separated by a blank line in a compilation unit.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            NodeTag::ServiceDefinition
                | NodeTag::FunctionDefinition
                | NodeTag::ConnectorDefinition
                | NodeTag::StructDefinition
                | NodeTag::ConstantDefinition
                | NodeTag::TypeMapperDefinition
        )
    }

    pub fn is_expression(self) -> bool {
        self.name().ends_with("Expression")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_every_kind_to_its_tag() {
        let kind = NodeKind::FunctionInvocationExpression {
            function: "foo(".to_string(),
        };
        assert_eq!(kind.tag(), NodeTag::FunctionInvocationExpression);
        assert_eq!(NodeKind::CompilationUnit.tag(), NodeTag::CompilationUnit);
        assert_eq!(NodeTag::ALL.len(), 62);
    }

    #[test]
    fn should_serialize_kinds_with_type_tag() {
        let kind = NodeKind::VariableReferenceExpression {
            package_name: Some("sys".to_string()),
            name: "out".to_string(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(
            json,
            r#"{"type":"VariableReferenceExpression","packageName":"sys","name":"out"}"#
        );
        let back: NodeKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn should_read_modifiers_and_operators() {
        let kind: NodeKind = serde_json::from_str(
            r#"{"type":"FunctionDefinition","name":"f","modifiers":"PUBLIC | NATIVE"}"#,
        )
        .unwrap();
        match kind {
            NodeKind::FunctionDefinition { modifiers, .. } => {
                assert!(modifiers.contains(Modifiers::PUBLIC | Modifiers::NATIVE));
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let kind: NodeKind =
            serde_json::from_str(r#"{"type":"BinaryExpression","operator":"&&"}"#).unwrap();
        assert_eq!(
            kind,
            NodeKind::BinaryExpression {
                operator: BinaryOperator::And
            }
        );
        assert_eq!(BinaryOperator::And.as_str(), "&&");
    }

    #[test]
    fn should_print_binary_operator_as_its_serialized_name() {
        let operators = [
            BinaryOperator::Plus,
            BinaryOperator::Minus,
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
            BinaryOperator::Modulo,
            BinaryOperator::Power,
            BinaryOperator::Equals,
            BinaryOperator::NotEquals,
            BinaryOperator::Greater,
            BinaryOperator::GreaterEquals,
            BinaryOperator::Lower,
            BinaryOperator::LowerEquals,
            BinaryOperator::And,
            BinaryOperator::Or,
        ];
        for operator in operators {
            let json = serde_json::to_string(&operator).unwrap();
            assert_eq!(json, format!("\"{}\"", operator.as_str()));
        }
    }
}
