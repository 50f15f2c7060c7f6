//! Where catalogs and attribute values come from.
//!
//! The remote protocol client is outside this crate. It plugs in through two traits:
//!
//! - [CatalogSource]: hands the builder the full `domain -> property list -> descriptor`
//!   catalog. Generic, so implementations can return any `Send` future.
//! - [AttributeReader]: reads a single attribute of a single remote object. Object-safe, so
//!   processors can hold an `Arc<dyn AttributeReader>`.
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use crate::{error::TreeError, properties::Catalog};

pub trait CatalogSource: Sync {
    fn fetch_catalog(
        &self,
    ) -> impl std::future::Future<Output = Result<Catalog, TreeError>> + Send;
}

/// An in-memory catalog. The content can be swapped between loads with [StaticCatalog::set].
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(Arc<RwLock<Catalog>>);

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self {
        StaticCatalog(Arc::new(RwLock::new(catalog)))
    }

    pub fn set(&self, catalog: Catalog) {
        *self.0.write() = catalog;
    }
}

impl From<Catalog> for StaticCatalog {
    fn from(catalog: Catalog) -> Self {
        StaticCatalog::new(catalog)
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch_catalog(
        &self,
    ) -> impl std::future::Future<Output = Result<Catalog, TreeError>> + Send {
        let catalog = self.0.read().clone();
        async move { Ok(catalog) }
    }
}

/// A catalog stored as a JSON document in the shape of a Jolokia `list` response body
/// (`{"<domain>": {"<property list>": {"desc": .., "attr": {..}, "op": {..}}}}`).
///
/// A full response envelope (`{"request": .., "value": {..}, "status": 200}`) is unwrapped.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileCatalog { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn parse(content: &str) -> Result<Catalog, TreeError> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;
        if let Some(status) = value.get("status").and_then(|s| s.as_u64()) {
            if status != 200 {
                let reason = value
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("no error message")
                    .to_string();
                return Err(TreeError::Source(format!("status {status}: {reason}")));
            }
        }
        // A bare list body may hold a domain called `value`, so only unwrap a real envelope
        let enveloped = value.get("request").is_some() || value.get("status").is_some();
        if let Some(inner) = value.get_mut("value").filter(|_| enveloped) {
            value = inner.take();
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl CatalogSource for JsonFileCatalog {
    fn fetch_catalog(
        &self,
    ) -> impl std::future::Future<Output = Result<Catalog, TreeError>> + Send {
        async move {
            tracing::debug!("Reading catalog from {:?}", self.path);
            let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                TreeError::Source(format!("Could not read {}: {e}", self.path.display()))
            })?;
            JsonFileCatalog::parse(&content)
        }
    }
}

pub trait AttributeReader: Send + Sync {
    fn read_attribute<'a>(
        &'a self,
        object_name: &'a str,
        attribute: &'a str,
    ) -> BoxFuture<'a, Result<serde_json::Value, TreeError>>;
}

/// Attribute values held in memory, keyed by object name then attribute name.
#[derive(Debug, Clone, Default)]
pub struct StaticAttributes(Arc<RwLock<BTreeMap<String, BTreeMap<String, serde_json::Value>>>>);

impl StaticAttributes {
    pub fn insert<V: Into<serde_json::Value>>(&self, object_name: &str, attribute: &str, value: V) {
        self.0
            .write()
            .entry(object_name.to_string())
            .or_default()
            .insert(attribute.to_string(), value.into());
    }
}

impl AttributeReader for StaticAttributes {
    fn read_attribute<'a>(
        &'a self,
        object_name: &'a str,
        attribute: &'a str,
    ) -> BoxFuture<'a, Result<serde_json::Value, TreeError>> {
        let value = self
            .0
            .read()
            .get(object_name)
            .and_then(|attrs| attrs.get(attribute))
            .cloned()
            .ok_or_else(|| TreeError::NotFound(format!("{object_name} attribute {attribute}")));
        Box::pin(async move { value })
    }
}
