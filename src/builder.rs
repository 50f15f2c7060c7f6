//! Turns a catalog into a [Forest].
//!
//! [TreeBuilder::create_from_domains] is the main entry point. It walks every descriptor of
//! every domain, resolves its [PropertyList] into a path and populates the path below the
//! domain root: folders for every segment but the last, a leaf holding the remote identity
//! for the last. The forest is then sorted and handed to the [ProcessorRegistry].
//!
//! ```rust
//! use mbean_tree::{
//!     builder::TreeBuilder,
//!     processor::ProcessorRegistry,
//!     properties::{Catalog, MBeanInfo},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mbean_tree::TreeError> {
//! let mut catalog = Catalog::new();
//! catalog
//!     .entry("java.lang".to_string())
//!     .or_default()
//!     .insert("type=MemoryPool,name=Metaspace".to_string(), MBeanInfo::default());
//!
//! let forest = TreeBuilder::default()
//!     .create_from_domains(&catalog, &ProcessorRegistry::default())
//!     .await?;
//! let leaf = forest.navigate(&["java.lang", "MemoryPool", "Metaspace"]).unwrap();
//! assert_eq!(
//!     forest[leaf].object_name(),
//!     Some("java.lang:type=MemoryPool,name=Metaspace")
//! );
//! # Ok(())
//! # }
//! ```
use crate::{
    config::TreeConfig,
    error::TreeError,
    paths::PropertyList,
    processor::ProcessorRegistry,
    properties::{Catalog, MBeanInfo, RemoteIdentity},
    source::CatalogSource,
    tree::{Forest, NodeId, NodeRef, Variant},
};

/// What survives of a subtree under [TreeBuilder::filter].
enum Kept {
    Whole,
    Partial(Vec<(NodeId, Kept)>),
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: TreeConfig,
}

impl TreeBuilder {
    pub fn new(config: TreeConfig) -> Self {
        TreeBuilder { config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Build, sort and process a forest. A failing processor fails the whole build.
    #[tracing::instrument(skip_all, fields(domains = catalog.len()))]
    pub async fn create_from_domains(
        &self,
        catalog: &Catalog,
        registry: &ProcessorRegistry,
    ) -> Result<Forest, TreeError> {
        let mut forest = self.populate_domains(catalog);
        forest.sort();
        registry.process(&mut forest).await?;
        Ok(forest)
    }

    /// Fetch the catalog from `source` and build from it. Only a failed fetch is an error: a
    /// failing processor is logged and the forest is returned as far as it got.
    #[tracing::instrument(skip_all)]
    pub async fn try_load<S: CatalogSource>(
        &self,
        source: &S,
        registry: &ProcessorRegistry,
    ) -> Result<Forest, TreeError> {
        let catalog = source.fetch_catalog().await?;
        let mut forest = self.populate_domains(&catalog);
        forest.sort();
        if let Err(err) = registry.process(&mut forest).await {
            tracing::warn!("Tree processing did not complete: {err}");
        }
        Ok(forest)
    }

    /// Like [TreeBuilder::try_load], but a failed fetch yields an empty forest.
    pub async fn load<S: CatalogSource>(&self, source: &S, registry: &ProcessorRegistry) -> Forest {
        match self.try_load(source, registry).await {
            Ok(forest) => forest,
            Err(err) => {
                tracing::warn!("Could not fetch catalog, presenting an empty tree: {err}");
                Forest::new(&self.config)
            }
        }
    }

    /// Create one root folder per domain and populate it, without sorting or processing.
    pub fn populate_domains(&self, catalog: &Catalog) -> Forest {
        let mut forest = Forest::new(&self.config);
        for (domain, descriptors) in catalog.iter() {
            let root = forest.get_or_create_root(domain, Variant::Folder);
            for (raw, info) in descriptors.iter() {
                let list = PropertyList::parse(
                    domain,
                    raw,
                    |name| !forest.find_children(root, name).is_empty(),
                    &self.config,
                );
                if let Err(err) = self.populate(&mut forest, root, &list, info) {
                    tracing::warn!("Skipping {}: {err}", list.object_name());
                }
            }
        }
        tracing::debug!(
            "Populated {} nodes below {} domains",
            forest.node_count(),
            forest.roots().len()
        );
        forest
    }

    /// Walk `list`'s path below `root`, creating what is missing. Returns the leaf, or `None`
    /// for an empty path.
    pub fn populate(
        &self,
        forest: &mut Forest,
        root: NodeId,
        list: &PropertyList,
        info: &MBeanInfo,
    ) -> Result<Option<NodeId>, TreeError> {
        let paths = list.paths();
        let Some((last, folders)) = paths.split_last() else {
            tracing::warn!("Empty property list for {}, skipping", list.object_name());
            return Ok(None);
        };
        let mut parent = root;
        for segment in folders {
            parent = forest.get_or_create(parent, segment, Variant::Folder)?;
        }
        let leaf = forest.get_or_create(parent, last, Variant::Leaf)?;
        if let Some(previous) = forest[leaf].object_name() {
            tracing::debug!(
                "{} resolves to the same node as {previous}, replacing it",
                list.object_name()
            );
        }
        for (key, value) in list.entries() {
            forest.add_property(leaf, key.as_str(), value.as_str());
        }
        forest.set_identity(
            leaf,
            Some(RemoteIdentity::new(list.object_name(), info.clone())),
        );
        Ok(Some(leaf))
    }

    /// A new forest whose roots are deep copies of `ids` from `source`. No processing.
    pub fn create_from_nodes(&self, source: &Forest, ids: &[NodeId]) -> Result<Forest, TreeError> {
        let mut forest = Forest::new(&self.config);
        for id in ids {
            source.copy_subtree_into(*id, &mut forest, None)?;
        }
        Ok(forest)
    }

    /// A new forest holding what of `roots` survives `pred`.
    ///
    /// A matching node is kept together with its entire subtree. A node that does not match is
    /// kept, as a shallow copy, only if some descendant survives, and then holds only the
    /// surviving children.
    pub fn filter<F>(
        &self,
        forest: &Forest,
        roots: &[NodeId],
        mut pred: F,
    ) -> Result<Forest, TreeError>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let mut filtered = Forest::new(&self.config);
        for root in roots {
            if let Some(kept) = Self::survivors(forest.node_ref(*root), &mut pred) {
                Self::copy_kept(forest, *root, kept, &mut filtered, None)?;
            }
        }
        Ok(filtered)
    }

    fn survivors<F>(node: NodeRef<'_>, pred: &mut F) -> Option<Kept>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        if pred(node) {
            return Some(Kept::Whole);
        }
        let children = node
            .children()
            .filter_map(|child| Self::survivors(child, pred).map(|kept| (child.handle(), kept)))
            .collect::<Vec<_>>();
        if children.is_empty() {
            None
        } else {
            Some(Kept::Partial(children))
        }
    }

    fn copy_kept(
        source: &Forest,
        id: NodeId,
        kept: Kept,
        target: &mut Forest,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        match kept {
            Kept::Whole => source.copy_subtree_into(id, target, parent),
            Kept::Partial(children) => {
                let copy = source.copy_node_into(id, target, parent)?;
                for (child, kept) in children {
                    Self::copy_kept(source, child, kept, target, Some(copy))?;
                }
                Ok(copy)
            }
        }
    }
}
