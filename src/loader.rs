//! Generation-stamped reloads.
//!
//! A console rebuilds its tree wholesale whenever the remote catalog may have changed. Loads
//! can overlap (a slow fetch, then a user hitting refresh), so [TreeLoader] stamps every load
//! with a generation and only publishes the result of the newest one. Older builds that finish
//! late are dropped and reported as [TreeEvent::Superseded].
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    builder::TreeBuilder, error::TreeError, event::TreeEvent, processor::ProcessorRegistry,
    source::CatalogSource, tree::Forest,
};

pub struct TreeLoader {
    builder: TreeBuilder,
    registry: ProcessorRegistry,
    generation: AtomicU64,
    current: RwLock<Arc<Forest>>,
    events: Option<UnboundedSender<TreeEvent>>,
}

impl TreeLoader {
    pub fn new(builder: TreeBuilder, registry: ProcessorRegistry) -> Self {
        let empty = Forest::new(builder.config());
        TreeLoader {
            builder,
            registry,
            generation: AtomicU64::new(0),
            current: RwLock::new(Arc::new(empty)),
            events: None,
        }
    }

    pub fn with_events(mut self, tx: UnboundedSender<TreeEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// The most recently published forest. Empty until the first load completes.
    pub fn current(&self) -> Arc<Forest> {
        self.current.read().clone()
    }

    /// Generation of the most recently started load.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn emit(&self, event: TreeEvent) -> Result<(), TreeError> {
        if let Some(tx) = self.events.as_ref() {
            tx.send(event)?;
        }
        Ok(())
    }

    fn notify(&self, event: TreeEvent) {
        tracing::debug!("{event}");
        if let Err(err) = self.emit(event) {
            tracing::debug!("Tree event dropped: {err}");
        }
    }

    /// Build a fresh forest from `source` and publish it, unless a newer load started in the
    /// meantime. Returns the published forest, or `None` when this load was superseded.
    ///
    /// A failed fetch publishes an empty forest.
    #[tracing::instrument(skip_all)]
    pub async fn reload<S: CatalogSource>(&self, source: &S) -> Option<Arc<Forest>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Starting tree load {generation}");
        let outcome = self.builder.try_load(source, &self.registry).await;

        let mut current = self.current.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            drop(current);
            self.notify(TreeEvent::Superseded { generation });
            return None;
        }
        let (forest, event) = match outcome {
            Ok(forest) => {
                let roots = forest
                    .root_refs()
                    .map(|root| root.name().to_string())
                    .collect();
                (forest, TreeEvent::Loaded { generation, roots })
            }
            Err(err) => {
                tracing::warn!("Could not fetch catalog, presenting an empty tree: {err}");
                let reason = err.to_string();
                (
                    Forest::new(self.builder.config()),
                    TreeEvent::LoadFailed { generation, reason },
                )
            }
        };
        let published = Arc::new(forest);
        *current = published.clone();
        drop(current);
        self.notify(event);
        Some(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{source::StaticCatalog, tests::helpers::*};
    use test_log::test;
    use tokio::sync::mpsc::unbounded_channel;

    #[test(tokio::test)]
    async fn test_reload_publishes_and_reports() {
        let (tx, mut rx) = unbounded_channel();
        let loader =
            TreeLoader::new(TreeBuilder::default(), ProcessorRegistry::default()).with_events(tx);
        assert!(loader.current().is_empty());

        let source = StaticCatalog::new(create_camel_catalog());
        let published = loader.reload(&source).await.unwrap();
        assert!(Arc::ptr_eq(&published, &loader.current()));
        assert_eq!(
            rx.recv().await,
            Some(TreeEvent::Loaded {
                generation: 1,
                roots: vec!["java.lang".to_string(), "org.apache.camel".to_string()],
            })
        );

        source.set(Default::default());
        loader.reload(&source).await.unwrap();
        assert!(loader.current().is_empty());
        assert_eq!(rx.recv().await.map(|e| e.generation()), Some(2));
        assert_eq!(loader.generation(), 2);
    }

    #[test(tokio::test)]
    async fn test_reload_without_listener() {
        let loader = TreeLoader::new(TreeBuilder::default(), ProcessorRegistry::default());
        let published = loader
            .reload(&StaticCatalog::new(create_camel_catalog()))
            .await
            .unwrap();
        assert_eq!(published.flatten().len(), 7);
    }

    #[test(tokio::test)]
    async fn test_closed_listener_does_not_fail_reload() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let loader =
            TreeLoader::new(TreeBuilder::default(), ProcessorRegistry::default()).with_events(tx);
        assert!(loader
            .reload(&StaticCatalog::new(create_camel_catalog()))
            .await
            .is_some());
    }
}
