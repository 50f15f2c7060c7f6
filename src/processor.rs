//! Ordered post-processing of freshly built forests.
//!
//! Feature modules register a [TreeProcessor] under a name with a [ProcessorRegistry]. After
//! [crate::builder::TreeBuilder] has populated and sorted a forest, the registry runs every
//! processor against it, one at a time and in registration order. Registering a second
//! processor under an existing name replaces the first one in its original slot.
//!
//! ```rust
//! use futures::FutureExt;
//! use mbean_tree::{processor::ProcessorRegistry, tree::{Forest, Variant}};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mbean_tree::TreeError> {
//! let registry = ProcessorRegistry::default();
//! registry.add_fn("add-root", |forest: &mut Forest| {
//!     async move {
//!         forest.get_or_create_root("extra", Variant::Folder);
//!         Ok(())
//!     }
//!     .boxed()
//! });
//!
//! let mut forest = Forest::default();
//! registry.process(&mut forest).await?;
//! assert!(forest.get("extra").is_some());
//! # Ok(())
//! # }
//! ```
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{error::TreeError, tree::Forest};

/// A mutating pass over a whole forest.
///
/// Returns a boxed future so implementations can be stored as trait objects in a
/// [ProcessorRegistry].
pub trait TreeProcessor: Send + Sync {
    fn process<'a>(&'a self, forest: &'a mut Forest) -> BoxFuture<'a, Result<(), TreeError>>;
}

/// Adapts a closure into a [TreeProcessor].
pub struct FnProcessor<F>(pub F);

impl<F> TreeProcessor for FnProcessor<F>
where
    F: for<'a> Fn(&'a mut Forest) -> BoxFuture<'a, Result<(), TreeError>> + Send + Sync,
{
    fn process<'a>(&'a self, forest: &'a mut Forest) -> BoxFuture<'a, Result<(), TreeError>> {
        (self.0)(forest)
    }
}

type Processors = Vec<(String, Arc<dyn TreeProcessor>)>;

/// Insertion-ordered set of named processors. Clones share the same underlying list.
#[derive(Default)]
pub struct ProcessorRegistry(Arc<RwLock<Processors>>);

impl Clone for ProcessorRegistry {
    fn clone(&self) -> Self {
        ProcessorRegistry(self.0.clone())
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ProcessorRegistry")
            .field(&self.processors())
            .finish()
    }
}

impl ProcessorRegistry {
    /// Register `processor` under `name`. An existing entry of that name is replaced in place.
    pub fn add<P: TreeProcessor + 'static>(&self, name: &str, processor: P) {
        self.add_arc(name, Arc::new(processor));
    }

    pub fn add_arc(&self, name: &str, processor: Arc<dyn TreeProcessor>) {
        let mut writer = self.0.write();
        if let Some(entry) = writer.iter_mut().find(|(existing, _)| existing == name) {
            tracing::debug!("Replacing tree processor '{name}'");
            entry.1 = processor;
        } else {
            tracing::debug!("Registering tree processor '{name}'");
            writer.push((name.to_string(), processor));
        }
    }

    pub fn add_fn<F>(&self, name: &str, f: F)
    where
        F: for<'a> Fn(&'a mut Forest) -> BoxFuture<'a, Result<(), TreeError>>
            + Send
            + Sync
            + 'static,
    {
        self.add(name, FnProcessor(f));
    }

    /// Registered names, in the order they will run.
    pub fn processors(&self) -> Vec<String> {
        self.0.read().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn reset(&self) {
        self.0.write().clear();
    }

    /// Run every processor against `forest`, waiting for each to finish before starting the
    /// next. The first failure stops the run and is returned as [TreeError::Processor].
    #[tracing::instrument(skip_all)]
    pub async fn process(&self, forest: &mut Forest) -> Result<(), TreeError> {
        // Processors registered while a run is in flight wait for the next run.
        let snapshot = self.0.read().clone();
        for (name, processor) in snapshot.iter() {
            tracing::debug!("Running tree processor '{name}'");
            if let Err(err) = processor.process(forest).await {
                tracing::warn!("Tree processor '{name}' failed: {err}");
                return Err(match err {
                    TreeError::Processor { .. } => err,
                    other => TreeError::Processor {
                        name: name.clone(),
                        reason: other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }
}
