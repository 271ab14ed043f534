//! Error types for AST editing, document loading and source generation.

use std::fmt;
use std::path::PathBuf;

use crate::ast::{NodeId, NodeTag};

pub type GenerateResult<T> = std::result::Result<T, GenerateError>;

/// Chain of nodes from the traversal root down to the node that failed,
/// rendered as `CompilationUnit#0 > FunctionDefinition#3 > ...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    entries: Vec<(NodeId, NodeTag)>,
}

impl NodePath {
    pub fn new(entries: Vec<(NodeId, NodeTag)>) -> Self {
        NodePath { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(NodeId, NodeTag)] {
        &self.entries
    }

    pub fn last(&self) -> Option<(NodeId, NodeTag)> {
        self.entries.last().copied()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("<root>");
        }
        for (i, (id, tag)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}{}", tag, id)?;
        }
        Ok(())
    }
}

/// Errors raised while generating source. Any of these aborts the whole
/// request; no partial output is returned.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("AST has no root node")]
    NoRoot,

    #[error("node {node} is not part of the AST (at {path})")]
    UnknownNode { node: NodeId, path: NodePath },

    #[error("{kind}{node} has no parent link (at {path})")]
    MissingParent {
        node: NodeId,
        kind: NodeTag,
        path: NodePath,
    },

    #[error("malformed {kind}{node}: {reason} (at {path})")]
    MalformedFragment {
        node: NodeId,
        kind: NodeTag,
        reason: String,
        path: NodePath,
    },

    #[error("cycle detected: {node} is already on the active path (at {path})")]
    CycleDetected { node: NodeId, path: NodePath },

    #[error("nesting deeper than {limit} at {node} (at {path})")]
    DepthExceeded {
        node: NodeId,
        limit: usize,
        path: NodePath,
    },

    #[error("no visitor registered for {kind}")]
    UnsupportedNode { kind: NodeTag },

    #[error("failed to build source map: {0}")]
    SourceMap(#[from] crate::output::source_map::SourceMapError),
}

impl GenerateError {
    /// Builds a `MalformedFragment` error. The path is filled in by the
    /// traversal engine as the error propagates.
    pub fn malformed(node: NodeId, kind: NodeTag, reason: impl Into<String>) -> Self {
        GenerateError::MalformedFragment {
            node,
            kind,
            reason: reason.into(),
            path: NodePath::default(),
        }
    }

    /// Diagnostic path of the failing node, if one was recorded.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            GenerateError::UnknownNode { path, .. }
            | GenerateError::MissingParent { path, .. }
            | GenerateError::MalformedFragment { path, .. }
            | GenerateError::CycleDetected { path, .. }
            | GenerateError::DepthExceeded { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Sets the diagnostic path unless an inner frame already recorded one.
    pub(crate) fn with_path(mut self, at: impl FnOnce() -> NodePath) -> Self {
        match &mut self {
            GenerateError::UnknownNode { path, .. }
            | GenerateError::MissingParent { path, .. }
            | GenerateError::MalformedFragment { path, .. }
            | GenerateError::CycleDetected { path, .. }
            | GenerateError::DepthExceeded { path, .. } => {
                if path.is_empty() {
                    *path = at();
                }
            }
            _ => {}
        }
        self
    }
}

/// Errors raised by the AST mutation API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("index {index} is out of bounds for {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },
}

/// Errors raised while loading or saving AST documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid AST document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node at index {index} declares id {id}")]
    IdMismatch { index: usize, id: NodeId },

    #[error("{from} references missing node {to}")]
    DanglingReference { from: NodeId, to: NodeId },

    #[error("root {0} is not in the document")]
    MissingRoot(NodeId),

    #[error("AST has no root node")]
    NoRoot,

    #[error(transparent)]
    Ast(#[from] AstError),
}
