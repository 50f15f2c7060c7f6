//! # mbean-tree
//!
//! Tree construction and processing for management consoles.
//!
//! ## Overview
//!
//! A management agent exposes remote managed objects named `domain:key=value,key=value`. This
//! crate turns a catalog of those objects into a navigable forest, one root folder per domain,
//! and lets feature modules reshape the generic forest into domain-specific views before it is
//! handed to a renderer.
//!
//! ### Key Features
//!
//! - **Property list parsing**: quoted values, `type` promotion and per-domain key reordering
//! - **Strict tree invariants**: unique sibling ids, no cycles, explicit leaf to folder promotion
//! - **Processor pipeline**: named, ordered, async post-processing of every built forest
//! - **Invoke rights**: RBAC decorations resolved per operation, including overloads
//! - **Fail-soft loading**: an unreachable agent yields an empty tree, not an error page
//!
//! ## Architecture
//!
//! - **[`paths`]**: [`PropertyList`](paths::PropertyList) tokenizer and name escaping
//! - **[`tree`]**: the [`Forest`](tree::Forest) arena and the [`NodeRef`](tree::NodeRef) view
//! - **[`builder`]**: [`TreeBuilder`](builder::TreeBuilder), catalog to forest
//! - **[`processor`]**: [`ProcessorRegistry`](processor::ProcessorRegistry) and the
//!   [`TreeProcessor`](processor::TreeProcessor) trait
//! - **[`source`]**: traits for the remote client (catalog, attribute reads)
//! - **[`loader`]**: [`TreeLoader`](loader::TreeLoader), generation-stamped reloads
//! - **[`reshape`]**: example reshapers, Apache Camel context grouping
//! - **[`properties`]**: Jolokia-shaped descriptors and invoke-rights resolution
//!
//! ## Quick Start
//!
//! ```rust
//! use futures::FutureExt;
//! use mbean_tree::{
//!     builder::TreeBuilder,
//!     processor::ProcessorRegistry,
//!     properties::{Catalog, MBeanInfo},
//!     source::StaticCatalog,
//!     tree::Forest,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut catalog = Catalog::new();
//! let java_lang = catalog.entry("java.lang".to_string()).or_default();
//! java_lang.insert("type=Memory".to_string(), MBeanInfo::default());
//! java_lang.insert("type=MemoryPool,name=Metaspace".to_string(), MBeanInfo::default());
//!
//! let registry = ProcessorRegistry::default();
//! registry.add_fn("tag-pools", |forest: &mut Forest| {
//!     async move {
//!         if let Some(pools) = forest.navigate(&["java.lang", "MemoryPool"]) {
//!             forest.add_property(pools, "type", "pools");
//!         }
//!         Ok(())
//!     }
//!     .boxed()
//! });
//!
//! let forest = TreeBuilder::default()
//!     .load(&StaticCatalog::new(catalog), &registry)
//!     .await;
//! let pools = forest.navigate(&["java.lang", "MemoryPool"]).unwrap();
//! assert_eq!(forest[pools].property("type"), Some("pools"));
//! assert_eq!(forest.flatten().len(), 2);
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`TreeConfig`](config::TreeConfig) is read from TOML. Every field has a default, so the file
//! only needs what it changes. See the `config` module for the format.

pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod paths;
pub mod processor;
pub mod properties;
pub mod reshape;
pub mod source;
#[cfg(test)]
mod tests;
pub mod tree;

pub use error::*;
