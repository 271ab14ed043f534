use std::collections::HashMap;
use std::fmt;

use crate::ast::{NodeRef, NodeTag};
use crate::error::{GenerateError, GenerateResult};
use crate::visitor::ConstructVisitor;
use crate::visitors;

/// Mapping from construct kind to the visitor that generates it.
#[derive(Default)]
pub struct VisitorRegistry {
    visitors: HashMap<NodeTag, Box<dyn ConstructVisitor>>,
}

impl VisitorRegistry {
    /// An empty registry. Prefer [`VisitorRegistry::standard`].
    pub fn new() -> Self {
        VisitorRegistry::default()
    }

    /// The registry covering every construct kind.
    pub fn standard() -> Self {
        let mut registry = VisitorRegistry::new();
        visitors::register_all(&mut registry);
        registry
    }

    /// Installs `visitor` for `tag`, returning the one it replaces.
    pub fn register(
        &mut self,
        tag: NodeTag,
        visitor: Box<dyn ConstructVisitor>,
    ) -> Option<Box<dyn ConstructVisitor>> {
        self.visitors.insert(tag, visitor)
    }

    pub fn get(&self, tag: NodeTag) -> Option<&dyn ConstructVisitor> {
        self.visitors.get(&tag).map(|v| v.as_ref())
    }

    /// Kinds with no registered visitor, in declaration order.
    pub fn missing_tags(&self) -> Vec<NodeTag> {
        NodeTag::ALL
            .iter()
            .copied()
            .filter(|tag| !self.visitors.contains_key(tag))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_tags().is_empty()
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl fmt::Debug for VisitorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.visitors.keys().collect();
        tags.sort();
        f.debug_struct("VisitorRegistry").field("tags", &tags).finish()
    }
}

impl<'a> NodeRef<'a> {
    /// Routes this node to the visitor registered for its kind.
    pub fn accept<'r>(&self, registry: &'r VisitorRegistry) -> GenerateResult<&'r dyn ConstructVisitor> {
        let kind = self.tag();
        registry
            .get(kind)
            .ok_or(GenerateError::UnsupportedNode { kind })
    }
}
