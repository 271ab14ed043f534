//! Arena-backed composer AST.
//!
//! Nodes are addressed by [`NodeId`], which is also their identity for the
//! traversal engine's re-entrancy guard. A node keeps a single parent link
//! but may be referenced from more than one children list (see
//! [`Ast::share_child`]).

pub mod document;
pub mod kinds;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::AstError;

pub use kinds::{BinaryOperator, LiteralType, Modifiers, NodeKind, NodeTag, UnaryOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Zero-based location of a construct in its original source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        SourcePosition { line, column }
    }
}

/// The file the AST was originally read from; referenced by source maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub type Children = SmallVec<[NodeId; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Children,
    pub parent: Option<NodeId>,
    pub position: Option<SourcePosition>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            children: SmallVec::new(),
            parent: None,
            position: None,
        }
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    source_file: Option<SourceFile>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    /// Creates an AST whose root is a node of `kind`.
    pub fn with_root(kind: NodeKind) -> (Self, NodeId) {
        let mut ast = Ast::new();
        let root = ast.add_node(kind);
        ast.root = Some(root);
        (ast, root)
    }

    /// Adds a detached node.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.push_node(Node::new(kind))
    }

    /// Adds a node exactly as given, links included. Used when loading
    /// documents whose links are taken verbatim.
    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<(), AstError> {
        self.check(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn source_file(&self) -> Option<&SourceFile> {
        self.source_file.as_ref()
    }

    pub fn set_source_file(&mut self, file: Option<SourceFile>) {
        self.source_file = file;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node(id).map(|node| NodeRef { ast: self, id, node })
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, node)| NodeRef {
                ast: self,
                id: NodeId(i as u32),
                node,
            })
    }

    pub fn set_position(&mut self, id: NodeId, position: SourcePosition) -> Result<(), AstError> {
        self.node_mut(id)
            .ok_or(AstError::UnknownNode(id))?
            .position = Some(position);
        Ok(())
    }

    /// Creates a node of `kind` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, AstError> {
        self.check(parent)?;
        let child = self.add_node(kind);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Creates a node of `kind` at `index` in `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        kind: NodeKind,
    ) -> Result<NodeId, AstError> {
        let len = self.node(parent).ok_or(AstError::UnknownNode(parent))?.children.len();
        if index > len {
            return Err(AstError::IndexOutOfBounds { parent, index, len });
        }
        let child = self.add_node(kind);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(index, child);
        Ok(child)
    }

    /// Makes a detached node the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), AstError> {
        self.check(parent)?;
        let node = self.node(child).ok_or(AstError::UnknownNode(child))?;
        if let Some(existing) = node.parent {
            return Err(AstError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Adds an extra reference to `child` from `parent` without moving its
    /// parent link. The child then appears on more than one path from the
    /// root and is generated only where it is reached first.
    pub fn share_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), AstError> {
        self.check(parent)?;
        self.check(child)?;
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Removes the first reference to `child` from `parent`. The child is
    /// detached when `parent` owned it.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), AstError> {
        self.check(child)?;
        let children = &mut self
            .nodes
            .get_mut(parent.index())
            .ok_or(AstError::UnknownNode(parent))?
            .children;
        let pos = children
            .iter()
            .position(|c| *c == child)
            .ok_or(AstError::NotAChild { parent, child })?;
        children.remove(pos);
        let still_referenced = children.contains(&child);
        let node = &mut self.nodes[child.index()];
        if node.parent == Some(parent) && !still_referenced {
            node.parent = None;
        }
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<(), AstError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(AstError::UnknownNode(id))
        }
    }
}

/// Borrowed view of one node; the handle visitors receive.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node.kind
    }

    pub fn tag(&self) -> NodeTag {
        self.node.kind.tag()
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.node.children.as_slice()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn position(&self) -> Option<SourcePosition> {
        self.node.position
    }

    /// Tag of the child at `id`, if it exists.
    pub fn child_tag(&self, id: NodeId) -> Option<NodeTag> {
        self.ast.node(id).map(Node::tag)
    }
}
