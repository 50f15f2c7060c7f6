use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::TreeError,
    processor::TreeProcessor,
    source::AttributeReader,
    tree::{Forest, NodeId, Variant},
};

pub const VERSION_PROPERTY: &str = "version";

/// A child folder of a context that is kept as-is, tagged with `type_tag`, its own children
/// tagged with `item_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCategory {
    pub name: String,
    pub type_tag: String,
    pub item_type: String,
}

impl ContextCategory {
    pub fn new(name: &str, type_tag: &str, item_type: &str) -> Self {
        ContextCategory {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            item_type: item_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextGroupingConfig {
    /// Domain whose root is reshaped.
    pub domain: String,
    /// Folder created under the domain root to hold every context.
    pub contexts_folder: String,
    /// Per-context folder for children that fit no category.
    pub catch_all: String,
    /// Child of a context folder whose leaf describes the context itself.
    pub context_child: String,
    /// Attribute read from the context to fill its `version` property.
    pub version_attribute: String,
    pub categories: Vec<ContextCategory>,
}

impl ContextGroupingConfig {
    /// Apache Camel's layout.
    pub fn camel() -> Self {
        ContextGroupingConfig {
            domain: "org.apache.camel".to_string(),
            contexts_folder: "Camel Contexts".to_string(),
            catch_all: "MBeans".to_string(),
            context_child: "context".to_string(),
            version_attribute: "CamelVersion".to_string(),
            categories: vec![
                ContextCategory::new("routes", "routes", "route"),
                ContextCategory::new("endpoints", "endpoints", "endpoint"),
                ContextCategory::new("components", "components", "component"),
                ContextCategory::new("dataformats", "dataformats", "dataformat"),
                ContextCategory::new("threadpools", "threadpools", "threadpool"),
            ],
        }
    }

    fn category(&self, name: &str) -> Option<&ContextCategory> {
        self.categories.iter().find(|cat| cat.name == name)
    }
}

impl Default for ContextGroupingConfig {
    fn default() -> Self {
        ContextGroupingConfig::camel()
    }
}

/// Regroups a flat `domain/<context>/<type>/<name>` tree into
/// `domain/<contexts folder>/<context>/{<category>.., <catch-all>}`.
///
/// Each context folder takes over the remote identity of its context leaf, so invoking
/// context operations works directly on the folder.
pub struct ContextGroupingProcessor {
    config: ContextGroupingConfig,
    reader: Option<Arc<dyn AttributeReader>>,
}

impl ContextGroupingProcessor {
    pub fn new(config: ContextGroupingConfig) -> Self {
        ContextGroupingProcessor {
            config,
            reader: None,
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn AttributeReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn config(&self) -> &ContextGroupingConfig {
        &self.config
    }

    /// Structural part of the reshaping. Returns the context folders.
    pub fn regroup(&self, forest: &mut Forest) -> Result<Vec<NodeId>, TreeError> {
        let config = &self.config;
        let Some(root) = forest.get_root(&config.domain, Variant::Folder) else {
            tracing::debug!("No '{}' domain, nothing to regroup", config.domain);
            return Ok(Vec::new());
        };
        if forest
            .get_child(root, &config.contexts_folder, Variant::Folder)
            .is_some()
        {
            tracing::debug!("'{}' already regrouped", config.domain);
            return Ok(Vec::new());
        }

        let originals = forest.remove_children(root);
        let contexts_folder = forest.create_child(root, &config.contexts_folder, Variant::Folder)?;
        forest[contexts_folder].set_type("contexts");

        let mut contexts = Vec::new();
        for original in originals {
            if !forest[original].is_folder() {
                forest.adopt(root, original)?;
                continue;
            }
            forest.adopt(contexts_folder, original)?;
            self.regroup_context(forest, original)?;
            contexts.push(original);
        }
        tracing::debug!(
            "Grouped {} contexts under '{}'",
            contexts.len(),
            config.contexts_folder
        );
        Ok(contexts)
    }

    fn regroup_context(&self, forest: &mut Forest, context: NodeId) -> Result<(), TreeError> {
        let config = &self.config;
        forest[context].set_type("context");
        let mut catch_all = None;
        for child in forest.remove_children(context) {
            let name = forest[child].name().to_string();
            if name == config.context_child {
                let leaf = forest
                    .node_ref(child)
                    .find_descendant(|n| n.identity().is_some())
                    .map(|n| n.handle());
                match leaf {
                    Some(leaf) => {
                        let identity = forest.take_identity(leaf);
                        forest.set_identity(context, identity);
                    }
                    None => tracing::debug!("'{name}' of {} has no mbean", forest[context].id()),
                }
                continue;
            }
            if let Some(category) = config.category(&name).filter(|_| forest[child].is_folder()) {
                forest.adopt(context, child)?;
                forest[child].set_type(category.type_tag.as_str());
                for item in forest[child].children().to_vec() {
                    forest[item].set_type(category.item_type.as_str());
                }
                continue;
            }
            let bucket = match catch_all {
                Some(bucket) => bucket,
                None => {
                    let bucket = forest.create_child(context, &config.catch_all, Variant::Folder)?;
                    catch_all = Some(bucket);
                    bucket
                }
            };
            forest.adopt(bucket, child)?;
        }
        Ok(())
    }

    async fn read_versions(&self, forest: &mut Forest, contexts: &[NodeId]) {
        let Some(reader) = self.reader.as_ref() else {
            return;
        };
        for context in contexts {
            let Some(object_name) = forest[*context].object_name().map(str::to_string) else {
                continue;
            };
            match reader
                .read_attribute(&object_name, &self.config.version_attribute)
                .await
            {
                Ok(serde_json::Value::String(version)) => {
                    forest.add_property(*context, VERSION_PROPERTY, version)
                }
                Ok(serde_json::Value::Null) => {}
                Ok(other) => forest.add_property(*context, VERSION_PROPERTY, other.to_string()),
                Err(err) => tracing::warn!("Could not read version of {object_name}: {err}"),
            }
        }
    }
}

impl TreeProcessor for ContextGroupingProcessor {
    fn process<'a>(&'a self, forest: &'a mut Forest) -> BoxFuture<'a, Result<(), TreeError>> {
        Box::pin(async move {
            let contexts = self.regroup(forest)?;
            self.read_versions(forest, &contexts).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::TreeBuilder, processor::ProcessorRegistry, source::StaticAttributes,
        tests::helpers::*, tree::IconState,
    };
    use test_log::test;

    async fn build(processor: ContextGroupingProcessor) -> Forest {
        let registry = ProcessorRegistry::default();
        registry.add("camel", processor);
        TreeBuilder::default()
            .create_from_domains(&create_camel_catalog(), &registry)
            .await
            .unwrap()
    }

    fn child_names(forest: &Forest, id: NodeId) -> Vec<String> {
        forest
            .node_ref(id)
            .children()
            .map(|c| c.name().to_string())
            .collect()
    }

    #[test(tokio::test)]
    async fn test_contexts_are_grouped() {
        let forest = build(ContextGroupingProcessor::new(ContextGroupingConfig::camel())).await;
        let root = forest.get("org.apache.camel").unwrap();
        assert_eq!(child_names(&forest, root), vec!["Camel Contexts"]);

        let ctx = forest
            .navigate(&["org.apache.camel", "Camel Contexts", "ctx"])
            .unwrap();
        assert_eq!(forest[ctx].property("type"), Some("context"));
        assert_eq!(
            forest[ctx].object_name(),
            Some(r#"org.apache.camel:context=ctx,type=context,name="ctx""#)
        );
        assert_eq!(forest.node_ref(ctx).icon(), IconState::Folder);
        assert_eq!(child_names(&forest, ctx), vec!["endpoints", "routes", "MBeans"]);

        let routes = forest.node_ref(ctx).get("routes", Variant::Folder).unwrap();
        assert_eq!(routes.property("type"), Some("routes"));
        assert!(routes.children().all(|r| r.property("type") == Some("route")));
        assert_eq!(routes.child_count(), 2);

        let stray = forest
            .navigate(&["org.apache.camel", "Camel Contexts", "ctx", "MBeans", "tracer"])
            .unwrap();
        assert_eq!(forest[stray].children().len(), 1);

        // Other domains are left alone, and the identity moved rather than copied
        assert!(forest.navigate(&["java.lang", "Memory"]).is_some());
        assert_eq!(forest.flatten().len(), 7);
    }

    #[test(tokio::test)]
    async fn test_version_is_read_when_a_reader_is_configured() {
        let attributes = StaticAttributes::default();
        attributes.insert(
            r#"org.apache.camel:context=ctx,type=context,name="ctx""#,
            "CamelVersion",
            "4.4.0",
        );
        let processor = ContextGroupingProcessor::new(ContextGroupingConfig::camel())
            .with_reader(Arc::new(attributes));
        let forest = build(processor).await;
        let ctx = forest
            .navigate(&["org.apache.camel", "Camel Contexts", "ctx"])
            .unwrap();
        assert_eq!(forest[ctx].property(VERSION_PROPERTY), Some("4.4.0"));
    }

    #[test(tokio::test)]
    async fn test_failed_version_read_does_not_fail_processing() {
        let processor = ContextGroupingProcessor::new(ContextGroupingConfig::camel())
            .with_reader(Arc::new(StaticAttributes::default()));
        let forest = build(processor).await;
        let ctx = forest
            .navigate(&["org.apache.camel", "Camel Contexts", "ctx"])
            .unwrap();
        assert_eq!(forest[ctx].property(VERSION_PROPERTY), None);
    }

    #[test(tokio::test)]
    async fn test_regroup_is_idempotent_and_tolerates_missing_domain() {
        let processor = ContextGroupingProcessor::new(ContextGroupingConfig::camel());
        let mut forest = build(ContextGroupingProcessor::new(ContextGroupingConfig::camel())).await;
        let before = forest.view();
        processor.process(&mut forest).await.unwrap();
        assert_eq!(forest.view(), before);

        let mut other = create_test_forest().forest;
        let _ = other.remove_root(other.get("org.apache.camel").unwrap());
        assert!(processor.regroup(&mut other).unwrap().is_empty());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = crate::config::TreeConfig {
            reshape: crate::config::ReshapeConfig {
                camel: Some(ContextGroupingConfig::camel()),
            },
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("reshape.camel"));
        let parsed = crate::config::TreeConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);

        let partial = crate::config::TreeConfig::from_toml_str(
            "[reshape.camel]\ndomain = \"org.apache.camel.k\"\n",
        )
        .unwrap();
        let camel = partial.reshape.camel.unwrap();
        assert_eq!(camel.domain, "org.apache.camel.k");
        assert_eq!(camel.catch_all, "MBeans");
    }
}
