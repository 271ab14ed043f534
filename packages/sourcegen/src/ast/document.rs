//! JSON documents exchanged with the composer.
//!
//! Two shapes are accepted:
//!
//! - tree: `{"root": {"kind": {...}, "children": [...]}}`, where parent links
//!   are implied by nesting;
//! - arena: `{"root": 0, "nodes": [{"id": 0, "kind": {...}, "children": [1],
//!   "parent": null}]}`, where links are taken verbatim so shared nodes and
//!   inconsistent parent links survive loading.
//!
//! Both may carry `"file": {"url": ..., "content": ...}` naming the original
//! source. Saving always produces the arena shape.
//!
//! The shape is chosen from `root` alone (a number selects the arena shape),
//! then the text is parsed as that shape so errors inside a node keep
//! serde_json's line and column.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ast::{Ast, Node, NodeId, NodeKind, SourceFile, SourcePosition};
use crate::error::DocumentError;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AstDocument {
    Arena(ArenaDocument),
    Tree(TreeDocument),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SourceFile>,
    pub root: NodeId,
    pub nodes: Vec<ArenaNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaNode {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SourceFile>,
    pub root: TreeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

#[derive(Deserialize)]
struct DocumentShape {
    root: serde_json::Value,
}

impl AstDocument {
    pub fn from_json(json: &str) -> Result<Ast, DocumentError> {
        Self::parse(json)?.into_ast()
    }

    pub fn parse(json: &str) -> Result<AstDocument, DocumentError> {
        let shape: DocumentShape = serde_json::from_str(json)?;
        if shape.root.is_number() {
            Ok(AstDocument::Arena(serde_json::from_str(json)?))
        } else {
            Ok(AstDocument::Tree(serde_json::from_str(json)?))
        }
    }

    pub fn load(path: &Path) -> Result<Ast, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serializes `ast` in the arena shape.
    pub fn to_json(ast: &Ast) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&Self::from_ast(ast)?)?)
    }

    pub fn from_ast(ast: &Ast) -> Result<AstDocument, DocumentError> {
        let root = ast.root().ok_or(DocumentError::NoRoot)?;
        let nodes = ast
            .iter()
            .map(|n| ArenaNode {
                id: n.id(),
                kind: n.kind().clone(),
                children: n.children().to_vec(),
                parent: n.parent(),
                position: n.position(),
            })
            .collect();
        Ok(AstDocument::Arena(ArenaDocument {
            file: ast.source_file().cloned(),
            root,
            nodes,
        }))
    }

    pub fn into_ast(self) -> Result<Ast, DocumentError> {
        match self {
            AstDocument::Arena(doc) => doc.into_ast(),
            AstDocument::Tree(doc) => Ok(doc.into_ast()),
        }
    }
}

impl ArenaDocument {
    fn into_ast(self) -> Result<Ast, DocumentError> {
        let len = self.nodes.len();
        let in_range = |id: NodeId| id.index() < len;

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(DocumentError::IdMismatch { index, id: node.id });
            }
            let refs = node.children.iter().chain(node.parent.iter());
            if let Some(missing) = refs.copied().find(|id| !in_range(*id)) {
                return Err(DocumentError::DanglingReference {
                    from: node.id,
                    to: missing,
                });
            }
        }
        if !in_range(self.root) {
            return Err(DocumentError::MissingRoot(self.root));
        }

        let mut ast = Ast::new();
        for node in self.nodes {
            ast.push_node(Node {
                kind: node.kind,
                children: SmallVec::from_vec(node.children),
                parent: node.parent,
                position: node.position,
            });
        }
        ast.set_root(self.root)?;
        ast.set_source_file(self.file);
        Ok(ast)
    }
}

impl TreeDocument {
    fn into_ast(self) -> Ast {
        let mut ast = Ast::new();
        let root = push_tree(&mut ast, self.root, None);
        ast.set_source_file(self.file);
        // The root was just pushed, so it is in range.
        let _ = ast.set_root(root);
        ast
    }
}

fn push_tree(ast: &mut Ast, tree: TreeNode, parent: Option<NodeId>) -> NodeId {
    let id = ast.push_node(Node {
        kind: tree.kind,
        children: SmallVec::new(),
        parent,
        position: tree.position,
    });
    for child in tree.children {
        let child_id = push_tree(ast, child, Some(id));
        if let Some(node) = ast.node_mut(id) {
            node.children.push(child_id);
        }
    }
    id
}
