use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    ops::{Index, IndexMut},
};

use crate::{
    config::{TreeConfig, DEFAULT_FOLDER_SUFFIX, DEFAULT_ID_SEPARATOR},
    error::TreeError,
    paths::to_id_segment,
    properties::RemoteIdentity,
};

use super::{
    context::{pick_child, NodeRef},
    node::{IconState, NodeId, NodeKind, TreeNode, Variant},
};

/// Renderer-facing snapshot of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub name: String,
    pub icon: IconState,
    pub children: Vec<NodeView>,
}

/// An arena of [TreeNode]s plus the ordered list of root nodes.
///
/// Children are owned through the `children` list of their folder; `parent` is only a
/// back-reference for upward queries. Nodes removed from the tree stay in the arena, detached
/// and unreachable from [Forest::roots], until the forest is dropped. Indexing with a [NodeId]
/// from another forest panics, the same way petgraph indices do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    id_separator: String,
    folder_suffix: String,
    #[serde(skip)]
    id_counters: BTreeMap<(Option<NodeId>, String), u32>,
}

/// Surviving part of a subtree under [Forest::filter_clone].
struct Pruned {
    id: NodeId,
    children: Vec<Pruned>,
}

impl Default for Forest {
    fn default() -> Self {
        Forest {
            nodes: Vec::new(),
            roots: Vec::new(),
            id_separator: DEFAULT_ID_SEPARATOR.to_string(),
            folder_suffix: DEFAULT_FOLDER_SUFFIX.to_string(),
            id_counters: BTreeMap::new(),
        }
    }
}

impl Index<NodeId> for Forest {
    type Output = TreeNode;
    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Forest {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }
}

impl Forest {
    pub fn new(config: &TreeConfig) -> Self {
        Forest {
            id_separator: config.id_separator.clone(),
            folder_suffix: config.folder_suffix.clone(),
            ..Default::default()
        }
    }

    /// An empty forest sharing this forest's id conventions.
    pub fn empty_like(&self) -> Self {
        Forest {
            id_separator: self.id_separator.clone(),
            folder_suffix: self.folder_suffix.clone(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_refs(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.roots.iter().map(|id| NodeRef::new(self, *id))
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    /// Number of nodes reachable from the roots.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = self.roots.clone();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self[id].children());
        }
        count
    }

    fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(parent) => self[parent].children(),
            None => &self.roots,
        }
    }

    fn parent_label(&self, parent: Option<NodeId>) -> String {
        parent
            .map(|p| self[p].id.clone())
            .unwrap_or_else(|| "<root>".to_string())
    }

    fn sibling_with(
        &self,
        parent: Option<NodeId>,
        name: &str,
        variant: Variant,
        exclude: Option<NodeId>,
    ) -> Option<NodeId> {
        self.siblings(parent).iter().copied().find(|sib| {
            Some(*sib) != exclude && self[*sib].name == name && self[*sib].variant() == variant
        })
    }

    fn check_unique(
        &self,
        parent: Option<NodeId>,
        name: &str,
        variant: Variant,
        exclude: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if self.sibling_with(parent, name, variant, exclude).is_some() {
            return Err(TreeError::DuplicateSibling {
                parent: self.parent_label(parent),
                name: name.to_string(),
                kind: variant.to_string(),
            });
        }
        Ok(())
    }

    /// `parent id + separator + escaped name (+ folder suffix)`, with a per-(parent, base)
    /// counter appended when a sibling already holds that id.
    fn derive_id(&mut self, parent: Option<NodeId>, node: NodeId) -> String {
        let prefix = parent
            .map(|p| format!("{}{}", self[p].id, self.id_separator))
            .unwrap_or_default();
        let suffix = if self[node].is_folder() {
            self.folder_suffix.as_str()
        } else {
            ""
        };
        let base = format!("{prefix}{}{suffix}", to_id_segment(&self[node].name));
        let taken = |forest: &Forest, candidate: &str| {
            forest
                .siblings(parent)
                .iter()
                .any(|sib| *sib != node && forest[*sib].id == candidate)
        };
        if !taken(self, &base) {
            return base;
        }
        let mut counter = self
            .id_counters
            .get(&(parent, base.clone()))
            .copied()
            .unwrap_or(1);
        let id = loop {
            counter += 1;
            let candidate = format!("{base}{}{counter}", self.id_separator);
            if !taken(self, &candidate) {
                break candidate;
            }
        };
        tracing::debug!("Id collision on '{base}', disambiguated as '{id}'");
        self.id_counters.insert((parent, base), counter);
        id
    }

    /// Recompute the ids of `top` and everything below it, breadth first.
    fn rederive_ids(&mut self, top: NodeId) {
        let parent = self[top].parent;
        self[top].id.clear();
        let id = self.derive_id(parent, top);
        self[top].id = id;
        let mut queue = VecDeque::from([top]);
        while let Some(current) = queue.pop_front() {
            let children = self[current].children().to_vec();
            for child in children.iter() {
                self[*child].id.clear();
            }
            for child in children {
                let id = self.derive_id(Some(current), child);
                self[child].id = id;
                queue.push_back(child);
            }
        }
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, parent: Option<NodeId>, child: NodeId) {
        self[child].parent = parent;
        match parent {
            Some(p) => {
                if let Some(children) = self[p].children_mut() {
                    children.push(child);
                }
            }
            None => self.roots.push(child),
        }
        let id = self.derive_id(parent, child);
        self[child].id = id;
    }

    /// Unlink `child` from wherever it currently hangs, clearing its parent.
    fn detach(&mut self, child: NodeId) {
        match self[child].parent.take() {
            Some(p) => {
                if let Some(children) = self[p].children_mut() {
                    children.retain(|c| *c != child);
                }
            }
            None => self.roots.retain(|r| *r != child),
        }
    }

    fn require_folder(&self, id: NodeId) -> Result<(), TreeError> {
        if self[id].is_folder() {
            Ok(())
        } else {
            Err(TreeError::NotAFolder(self[id].id.clone()))
        }
    }

    pub fn create_root(&mut self, name: &str, variant: Variant) -> Result<NodeId, TreeError> {
        self.check_unique(None, name, variant, None)?;
        let id = self.alloc(TreeNode::new(name, variant));
        self.attach(None, id);
        Ok(id)
    }

    pub fn get_root(&self, name: &str, variant: Variant) -> Option<NodeId> {
        self.sibling_with(None, name, variant, None)
    }

    pub fn get_or_create_root(&mut self, name: &str, variant: Variant) -> NodeId {
        match self.get_root(name, variant) {
            Some(id) => id,
            None => {
                let id = self.alloc(TreeNode::new(name, variant));
                self.attach(None, id);
                id
            }
        }
    }

    /// A node hanging nowhere, to be placed later with [Forest::adopt] or [Forest::adopt_root].
    pub fn create_detached(&mut self, name: &str, variant: Variant) -> NodeId {
        let id = self.alloc(TreeNode::new(name, variant));
        let node_id = self.derive_id(None, id);
        self[id].id = node_id;
        id
    }

    /// Append a new child. The parent must already be a folder, see [Forest::promote_to_folder].
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: &str,
        variant: Variant,
    ) -> Result<NodeId, TreeError> {
        self.require_folder(parent)?;
        self.check_unique(Some(parent), name, variant, None)?;
        let id = self.alloc(TreeNode::new(name, variant));
        self.attach(Some(parent), id);
        Ok(id)
    }

    pub fn get_child(&self, parent: NodeId, name: &str, variant: Variant) -> Option<NodeId> {
        self.sibling_with(Some(parent), name, variant, None)
    }

    pub fn get_or_create(
        &mut self,
        parent: NodeId,
        name: &str,
        variant: Variant,
    ) -> Result<NodeId, TreeError> {
        match self.get_child(parent, name, variant) {
            Some(id) => Ok(id),
            None => self.create_child(parent, name, variant),
        }
    }

    /// Every child called `name`: at most one folder and one leaf.
    pub fn find_children(&self, parent: NodeId, name: &str) -> Vec<NodeId> {
        self[parent]
            .children()
            .iter()
            .copied()
            .filter(|c| self[*c].name == name)
            .collect()
    }

    /// Turn a leaf into an empty folder. Folders are left alone.
    pub fn promote_to_folder(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self[id].is_folder() {
            return Ok(());
        }
        let parent = self[id].parent;
        let name = self[id].name.clone();
        self.check_unique(parent, &name, Variant::Folder, Some(id))?;
        tracing::debug!("Promoting leaf '{}' to folder", self[id].id);
        self[id].kind = NodeKind::Folder {
            children: Vec::new(),
        };
        self.rederive_ids(id);
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self[id].parent;
        }
        false
    }

    /// Move `child` (and its subtree) under `parent`, detaching it from its current place first.
    ///
    /// Adopting into the current parent is a no-op. The ids of the moved subtree are
    /// re-derived from the new parent.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle(self[child].id.clone()));
        }
        self.require_folder(parent)?;
        if self[child].parent == Some(parent) {
            return Ok(());
        }
        let name = self[child].name.clone();
        self.check_unique(Some(parent), &name, self[child].variant(), None)?;
        self.detach(child);
        self.attach(Some(parent), child);
        self.rederive_ids(child);
        Ok(())
    }

    /// Move `child` to the end of the root list.
    pub fn adopt_root(&mut self, child: NodeId) -> Result<(), TreeError> {
        if self[child].parent.is_none() && self.roots.contains(&child) {
            return Ok(());
        }
        let name = self[child].name.clone();
        self.check_unique(None, &name, self[child].variant(), None)?;
        self.detach(child);
        self.attach(None, child);
        self.rederive_ids(child);
        Ok(())
    }

    /// Detach `child` from `parent`. Returns `None` if it was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        if self[child].parent != Some(parent) {
            return None;
        }
        self.detach(child);
        Some(child)
    }

    /// Detach every child of `parent`, returning them in their previous order.
    pub fn remove_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let removed = match self[parent].children_mut() {
            Some(children) => std::mem::take(children),
            None => Vec::new(),
        };
        for child in removed.iter() {
            self[*child].parent = None;
        }
        removed
    }

    pub fn remove_root(&mut self, root: NodeId) -> Option<NodeId> {
        if self[root].parent.is_some() || !self.roots.contains(&root) {
            return None;
        }
        self.detach(root);
        Some(root)
    }

    pub fn add_property<K: Into<String>, V: Into<String>>(&mut self, id: NodeId, key: K, value: V) {
        self[id].add_property(key, value);
    }

    pub fn set_identity(&mut self, id: NodeId, identity: Option<RemoteIdentity>) {
        self[id].identity = identity;
    }

    pub fn take_identity(&mut self, id: NodeId) -> Option<RemoteIdentity> {
        self[id].identity.take()
    }

    /// Root named `name`, folders first.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.get_root(name, Variant::Folder)
            .or_else(|| self.get_root(name, Variant::Leaf))
    }

    /// Resolve `names` starting from the roots. An empty path resolves to nothing.
    pub fn navigate<S: AsRef<str>>(&self, names: &[S]) -> Option<NodeId> {
        let (first, rest) = names.split_first()?;
        let root = pick_child(self, &self.roots, first.as_ref())?;
        self.node_ref(root).navigate(rest).map(|n| n.handle())
    }

    /// Walk `names` below `start` (or from the roots when `None`), calling `f` on each node
    /// resolved along the way. Returns the last node reached if the whole path resolved.
    pub fn for_each<S, F>(&mut self, start: Option<NodeId>, names: &[S], mut f: F) -> Option<NodeId>
    where
        S: AsRef<str>,
        F: FnMut(&mut TreeNode),
    {
        let mut current = start;
        for name in names {
            let candidates = self.siblings(current).to_vec();
            let next = pick_child(self, &candidates, name.as_ref())?;
            f(&mut self[next]);
            current = Some(next);
        }
        current
    }

    /// Pre-order search across all roots; first match wins.
    pub fn find_descendant<F>(&self, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        self.roots
            .iter()
            .find_map(|root| self.node_ref(*root).find_descendant(&mut pred))
            .map(|n| n.handle())
    }

    /// Every node carrying a remote identity, keyed by object name.
    pub fn flatten(&self) -> BTreeMap<String, NodeId> {
        let mut map = BTreeMap::new();
        for root in self.root_refs() {
            root.flatten(&mut map);
        }
        map
    }

    /// Order roots and every child list by name (case-sensitive), folders before leaves of the
    /// same name. Stable.
    pub fn sort(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_ids(&mut roots);
        self.roots = roots;
        let mut stack = self.roots.clone();
        while let Some(id) = stack.pop() {
            let mut children = match self[id].children_mut() {
                Some(children) => std::mem::take(children),
                None => continue,
            };
            self.sort_ids(&mut children);
            stack.extend_from_slice(&children);
            if let Some(slot) = self[id].children_mut() {
                *slot = children;
            }
        }
    }

    fn sort_ids(&self, ids: &mut [NodeId]) {
        ids.sort_by(|a, b| {
            self[*a]
                .name
                .cmp(&self[*b].name)
                .then(self[*a].variant().cmp(&self[*b].variant()))
        });
    }

    /// Copy of the subtree at `id` keeping only nodes that satisfy `pred` or have a surviving
    /// descendant, built as the single root of a new forest. `None` when nothing survives.
    /// The source forest is left as it was.
    ///
    /// Unlike [crate::builder::TreeBuilder::filter], a match does not keep the whole subtree
    /// below it: descendants are pruned by the same rule.
    pub fn filter_clone<F>(&self, id: NodeId, mut pred: F) -> Option<(Forest, NodeId)>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let pruned = self.pruned(id, &mut pred)?;
        let mut target = self.empty_like();
        let root = self.copy_pruned(&pruned, &mut target, None);
        Some((target, root))
    }

    fn pruned<F>(&self, id: NodeId, pred: &mut F) -> Option<Pruned>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let matched = pred(self.node_ref(id));
        let children = self[id]
            .children()
            .iter()
            .filter_map(|child| self.pruned(*child, pred))
            .collect::<Vec<_>>();
        if !matched && children.is_empty() {
            return None;
        }
        Some(Pruned { id, children })
    }

    // Siblings are already unique in the source, so no checks are needed on the way over.
    fn copy_pruned(&self, pruned: &Pruned, target: &mut Forest, parent: Option<NodeId>) -> NodeId {
        let copy = target.alloc(self[pruned.id].detached_copy());
        target.attach(parent, copy);
        for child in &pruned.children {
            self.copy_pruned(child, target, Some(copy));
        }
        copy
    }

    /// Deep copy of the subtree at `id` into `target`, under `parent` (or as a root).
    pub fn copy_subtree_into(
        &self,
        id: NodeId,
        target: &mut Forest,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let copy = self.copy_node_into(id, target, parent)?;
        for child in self[id].children() {
            self.copy_subtree_into(*child, target, Some(copy))?;
        }
        Ok(copy)
    }

    /// Copy of the node at `id` alone, without its children.
    pub fn copy_node_into(
        &self,
        id: NodeId,
        target: &mut Forest,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let source = &self[id];
        if let Some(p) = parent {
            target.require_folder(p)?;
        }
        target.check_unique(parent, &source.name, source.variant(), None)?;
        let copy = target.alloc(source.detached_copy());
        target.attach(parent, copy);
        Ok(copy)
    }

    pub fn view(&self) -> Vec<NodeView> {
        self.root_refs().map(|root| root.view()).collect()
    }
}
