//! Arena-backed ownership tree of contexts.

use std::collections::BTreeMap;

use crate::types::{ActorId, CastId, ContextId, ProjectileId};

/// What a context node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContextKind {
    /// Root context of an actor.
    Actor,
    Cast(CastId),
    Projectile(ProjectileId),
    /// A transient hit evaluation under a projectile.
    Hit,
    /// The context a buff's conditions and effects are evaluated in.
    Buff,
}

/// One node: identity, source-actor binding and tree position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextNode {
    id: ContextId,
    identifier: String,
    source: ActorId,
    kind: ContextKind,
    parent: Option<ContextId>,
    children: Vec<ContextId>,
}

impl ContextNode {
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// `instance:source-identifier`, fixed at construction.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source(&self) -> ActorId {
        self.source
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Non-owning back-reference; never participates in teardown.
    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn children(&self) -> &[ContextId] {
        &self.children
    }
}

/// Owns every context node. Parents own their children: removing a node
/// removes its whole subtree, while the child-to-parent link is only an id.
#[derive(Clone, Debug, Default)]
pub struct ContextTree {
    nodes: BTreeMap<ContextId, ContextNode>,
    next_id: u64,
}

impl ContextTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node. It joins the tree through [`ContextTree::add_child`].
    pub fn create(
        &mut self,
        instance: &str,
        source: ActorId,
        source_identifier: &str,
        kind: ContextKind,
    ) -> ContextId {
        let id = ContextId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            ContextNode {
                id,
                identifier: format!("{instance}:{source_identifier}"),
                source,
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Appends `child` to `parent`'s owned children.
    ///
    /// The caller guarantees `child` has no other parent. Returns false when
    /// either node is unknown.
    pub fn add_child(&mut self, parent: ContextId, child: ContextId) -> bool {
        if parent == child || !self.nodes.contains_key(&child) {
            return false;
        }
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        parent_node.children.push(child);
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
        true
    }

    /// Removes `id` and its owned subtree, children before parents.
    ///
    /// Returns the removed nodes in that order so callers can tear down
    /// whatever each node stood for.
    pub fn remove(&mut self, id: ContextId) -> Vec<ContextNode> {
        let Some(parent) = self.nodes.get(&id).map(|node| node.parent) else {
            return Vec::new();
        };
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent_node.children.retain(|&c| c != id);
        }

        let mut removed = Vec::new();
        self.remove_subtree(id, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: ContextId, removed: &mut Vec<ContextNode>) {
        let children = self
            .nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child, removed);
        }
        if let Some(node) = self.nodes.remove(&id) {
            removed.push(node);
        }
    }

    pub fn get(&self, id: ContextId) -> Option<&ContextNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn identifier(&self, id: ContextId) -> Option<&str> {
        self.nodes.get(&id).map(ContextNode::identifier)
    }

    /// Walks from `id` (inclusive) up to its root.
    pub fn ancestors(&self, id: ContextId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes.contains_key(&id).then_some(id),
        }
    }

    /// Nearest node at or above `id` of the requested kind.
    pub fn find_ancestor(
        &self,
        id: ContextId,
        predicate: impl Fn(ContextKind) -> bool,
    ) -> Option<&ContextNode> {
        self.ancestors(id).find(|node| predicate(node.kind))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator returned by [`ContextTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a ContextTree,
    next: Option<ContextId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ContextNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.nodes.get(&self.next?)?;
        self.next = node.parent;
        Some(node)
    }
}
