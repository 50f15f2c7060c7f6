//! Tree module: the forest of nodes a management console navigates.
//!
//! # Module Organization
//!
//! - [`node`]: Node data ([`TreeNode`], [`NodeKind`], [`NodeId`], [`IconState`])
//! - [`forest`]: The arena ([`Forest`]) and every structural mutation
//! - [`context`]: Read-only navigation ([`NodeRef`])
//!
//! # Invariants
//!
//! Every mutation goes through [`Forest`], which keeps:
//!
//! - sibling ids unique (collisions get a deterministic counter suffix);
//! - at most one folder and one leaf of a given name among siblings;
//! - `child.parent == Some(p)` exactly when `p`'s children contain `child`;
//! - no cycles (adopting a node into itself or its own subtree is rejected);
//! - removed nodes always come back with their parent cleared.
//!
//! ```rust
//! use mbean_tree::tree::{Forest, Variant};
//!
//! let mut forest = Forest::default();
//! let root = forest.create_root("java.lang", Variant::Folder).unwrap();
//! let pools = forest.create_child(root, "MemoryPool", Variant::Folder).unwrap();
//! forest.create_child(pools, "Metaspace", Variant::Leaf).unwrap();
//!
//! let found = forest.navigate(&["java.lang", "MemoryPool", "Metaspace"]).unwrap();
//! assert_eq!(forest.node_ref(found).path(), vec!["java.lang", "MemoryPool", "Metaspace"]);
//! ```

pub mod context;
pub mod forest;
pub mod node;


pub use context::NodeRef;
pub use forest::{Forest, NodeView};
pub use node::{IconState, NodeId, NodeKind, TreeNode, Variant, TYPE_PROPERTY};
