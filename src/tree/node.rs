use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use crate::properties::RemoteIdentity;

/// Handle of a node inside its [super::Forest] arena. Only meaningful for the forest that
/// produced it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two node shapes is meant. Folders sort before leaves of the same name.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Variant {
    Folder,
    Leaf,
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Folder => write!(f, "folder"),
            Variant::Leaf => write!(f, "leaf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf,
    Folder { children: Vec<NodeId> },
}

impl NodeKind {
    pub fn new(variant: Variant) -> Self {
        match variant {
            Variant::Folder => NodeKind::Folder {
                children: Vec::new(),
            },
            Variant::Leaf => NodeKind::Leaf,
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            NodeKind::Leaf => Variant::Leaf,
            NodeKind::Folder { .. } => Variant::Folder,
        }
    }
}

/// Derived icon selection for renderers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum IconState {
    Folder,
    Leaf,
    /// The node stands for a remote object the caller may not invoke.
    Locked,
}

pub const TYPE_PROPERTY: &str = "type";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub properties: BTreeMap<String, String>,
    pub identity: Option<RemoteIdentity>,
}

impl TreeNode {
    pub(crate) fn new(name: &str, variant: Variant) -> Self {
        TreeNode {
            id: String::new(),
            name: name.to_string(),
            kind: NodeKind::new(variant),
            parent: None,
            properties: BTreeMap::new(),
            identity: None,
        }
    }

    /// Copy of everything but the structure: no parent, no children, no id.
    pub(crate) fn detached_copy(&self) -> Self {
        TreeNode {
            id: String::new(),
            name: self.name.clone(),
            kind: NodeKind::new(self.variant()),
            parent: None,
            properties: self.properties.clone(),
            identity: self.identity.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn variant(&self) -> Variant {
        self.kind.variant()
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::Leaf => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::Leaf => None,
        }
    }

    pub fn add_property<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.as_str())
    }

    pub fn set_type<V: Into<String>>(&mut self, type_tag: V) {
        self.add_property(TYPE_PROPERTY, type_tag);
    }

    pub fn object_name(&self) -> Option<&str> {
        self.identity.as_ref().map(|ident| ident.object_name.as_str())
    }

    pub fn icon(&self) -> IconState {
        if self.identity.as_ref().is_some_and(|ident| ident.is_locked()) {
            IconState::Locked
        } else if self.is_folder() {
            IconState::Folder
        } else {
            IconState::Leaf
        }
    }
}
