//! Read-only navigation over a [Forest].
//!
//! [NodeRef] bundles a node handle with the forest it lives in, so upward, downward and
//! sideways queries can be chained without touching the arena directly.
use std::collections::BTreeMap;

use crate::{
    paths::{compile_criteria, Glob},
    properties::RemoteIdentity,
};

use super::{
    forest::{Forest, NodeView},
    node::{IconState, NodeId, TreeNode, Variant},
};

/// Resolve one path segment against `candidates`: exact name (folders first), then the first
/// candidate whose name glob-matches the segment.
pub(crate) fn pick_child(forest: &Forest, candidates: &[NodeId], segment: &str) -> Option<NodeId> {
    candidates
        .iter()
        .copied()
        .filter(|c| forest[*c].name() == segment)
        .min_by_key(|c| forest[*c].variant())
        .or_else(|| {
            let glob = Glob::new(segment)
                .inspect_err(|err| tracing::warn!("Cannot resolve '{segment}': {err}"))
                .ok()?;
            candidates
                .iter()
                .copied()
                .find(|c| glob.is_match(forest[*c].name()))
        })
}

#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    forest: &'a Forest,
    id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("handle", &self.id)
            .field("id", &self.node().id())
            .finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn new(forest: &'a Forest, id: NodeId) -> NodeRef<'a> {
        NodeRef { forest, id }
    }

    pub fn handle(&self) -> NodeId {
        self.id
    }

    pub fn forest(&self) -> &'a Forest {
        self.forest
    }

    pub fn node(&self) -> &'a TreeNode {
        &self.forest[self.id]
    }

    pub fn id(&self) -> &'a str {
        self.node().id()
    }

    pub fn name(&self) -> &'a str {
        self.node().name()
    }

    pub fn variant(&self) -> Variant {
        self.node().variant()
    }

    pub fn is_folder(&self) -> bool {
        self.node().is_folder()
    }

    pub fn properties(&self) -> &'a BTreeMap<String, String> {
        &self.node().properties
    }

    pub fn property(&self, key: &str) -> Option<&'a str> {
        self.node().property(key)
    }

    pub fn identity(&self) -> Option<&'a RemoteIdentity> {
        self.node().identity.as_ref()
    }

    pub fn icon(&self) -> IconState {
        self.node().icon()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node()
            .parent()
            .map(|parent| NodeRef::new(self.forest, parent))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let forest = self.forest;
        self.node()
            .children()
            .iter()
            .map(move |child| NodeRef::new(forest, *child))
    }

    pub fn child_count(&self) -> usize {
        self.node().children().len()
    }

    pub fn get(&self, name: &str, variant: Variant) -> Option<NodeRef<'a>> {
        self.children()
            .find(|child| child.name() == name && child.variant() == variant)
    }

    pub fn find_children(&self, name: &str) -> Vec<NodeRef<'a>> {
        self.children().filter(|child| child.name() == name).collect()
    }

    /// Names from the root down to this node.
    pub fn path(&self) -> Vec<String> {
        let mut path = self
            .ancestors()
            .iter()
            .map(|a| a.name().to_string())
            .collect::<Vec<_>>();
        path.reverse();
        path.push(self.name().to_string());
        path
    }

    pub fn depth(&self) -> usize {
        self.ancestors().len()
    }

    /// Resolve `names` below this node, one child per segment. An empty path is this node.
    pub fn navigate<S: AsRef<str>>(&self, names: &[S]) -> Option<NodeRef<'a>> {
        let mut current = *self;
        for name in names {
            let next = pick_child(self.forest, current.node().children(), name.as_ref())?;
            current = NodeRef::new(self.forest, next);
        }
        Some(current)
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self) -> Vec<NodeRef<'a>> {
        let mut res = Vec::new();
        let mut current = self.parent();
        while let Some(ancestor) = current {
            current = ancestor.parent();
            res.push(ancestor);
        }
        res
    }

    pub fn find_ancestor<F>(&self, mut pred: F) -> Option<NodeRef<'a>>
    where
        F: FnMut(NodeRef<'a>) -> bool,
    {
        let mut current = self.parent();
        while let Some(ancestor) = current {
            if pred(ancestor) {
                return Some(ancestor);
            }
            current = ancestor.parent();
        }
        None
    }

    /// Depth-first pre-order search starting with this node; stops at the first match.
    pub fn find_descendant<F>(&self, mut pred: F) -> Option<NodeRef<'a>>
    where
        F: FnMut(NodeRef<'a>) -> bool,
    {
        let mut stack = vec![*self];
        while let Some(current) = stack.pop() {
            if pred(current) {
                return Some(current);
            }
            stack.extend(
                current
                    .node()
                    .children()
                    .iter()
                    .rev()
                    .map(|c| NodeRef::new(self.forest, *c)),
            );
        }
        None
    }

    /// Pre-order collection of every node with a remote identity, keyed by object name.
    pub fn flatten(&self, map: &mut BTreeMap<String, NodeId>) {
        if let Some(identity) = self.identity() {
            map.insert(identity.object_name.clone(), self.id);
        }
        for child in self.children() {
            child.flatten(map);
        }
    }

    /// Glob match (`*` wildcard, case-insensitive) of `name` and/or properties against every
    /// criterion. An empty criteria map never matches; an absent property does not match.
    pub fn matches(&self, criteria: &BTreeMap<String, String>) -> bool {
        match compile_criteria(criteria) {
            Ok(compiled) => self.matches_compiled(&compiled),
            Err(err) => {
                tracing::warn!("Ignoring match criteria: {err}");
                false
            }
        }
    }

    /// [NodeRef::matches] with the patterns compiled up front, for testing many nodes.
    pub fn matches_compiled(&self, criteria: &[(String, Glob)]) -> bool {
        if criteria.is_empty() {
            return false;
        }
        criteria.iter().all(|(key, glob)| {
            let value = if key == "name" {
                Some(self.name())
            } else {
                self.property(key)
            };
            value.is_some_and(|value| glob.is_match(value))
        })
    }

    pub fn has_operations<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.identity()
            .is_some_and(|identity| identity.info.has_operations(names))
    }

    /// Nodes without a remote identity have nothing to deny.
    pub fn has_invoke_rights<S: AsRef<str>>(&self, methods: &[S]) -> bool {
        self.identity()
            .map(|identity| identity.info.can_invoke_all(methods))
            .unwrap_or(true)
    }

    pub fn view(&self) -> NodeView {
        NodeView {
            id: self.id().to_string(),
            name: self.name().to_string(),
            icon: self.icon(),
            children: self.children().map(|child| child.view()).collect(),
        }
    }
}
