//! Shared test utilities for tree testing

use crate::{
    properties::{Catalog, MBeanInfo, OperationEntry, OperationInfo, RemoteIdentity},
    tree::{Forest, NodeId, Variant},
};
use std::collections::BTreeMap;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Descriptor with a `stop` operation and the given aggregate invoke flag
pub fn create_test_info(can_invoke: Option<bool>) -> MBeanInfo {
    let mut info = MBeanInfo {
        can_invoke,
        ..Default::default()
    };
    info.op.insert(
        "stop".to_string(),
        OperationEntry::Single(OperationInfo {
            ret: "void".to_string(),
            ..Default::default()
        }),
    );
    info
}

pub fn create_test_identity(object_name: &str, can_invoke: Option<bool>) -> RemoteIdentity {
    RemoteIdentity::new(object_name, create_test_info(can_invoke))
}

/// Handles into the forest built by [create_test_forest]
pub struct TestTree {
    pub forest: Forest,
    pub java_lang: NodeId,
    pub memory_pool: NodeId,
    pub metaspace: NodeId,
    pub eden: NodeId,
    pub memory: NodeId,
    pub camel: NodeId,
}

/// A small forest:
///
/// ```text
/// java.lang/
///   MemoryPool/
///     Metaspace      (identity)
///     Eden Space     (identity, locked)
///   Memory           (identity)
/// org.apache.camel/
/// ```
pub fn create_test_forest() -> TestTree {
    init_logging();
    let mut forest = Forest::default();
    let java_lang = forest.create_root("java.lang", Variant::Folder).unwrap();
    let memory_pool = forest
        .create_child(java_lang, "MemoryPool", Variant::Folder)
        .unwrap();
    let metaspace = forest
        .create_child(memory_pool, "Metaspace", Variant::Leaf)
        .unwrap();
    forest.set_identity(
        metaspace,
        Some(create_test_identity(
            "java.lang:type=MemoryPool,name=Metaspace",
            None,
        )),
    );
    let eden = forest
        .create_child(memory_pool, "Eden Space", Variant::Leaf)
        .unwrap();
    forest.set_identity(
        eden,
        Some(create_test_identity(
            "java.lang:type=MemoryPool,name=Eden Space",
            Some(false),
        )),
    );
    let memory = forest
        .create_child(java_lang, "Memory", Variant::Leaf)
        .unwrap();
    forest.set_identity(
        memory,
        Some(create_test_identity("java.lang:type=Memory", Some(true))),
    );
    let camel = forest
        .create_root("org.apache.camel", Variant::Folder)
        .unwrap();
    TestTree {
        forest,
        java_lang,
        memory_pool,
        metaspace,
        eden,
        memory,
        camel,
    }
}

/// A Camel-flavoured catalog with one context holding routes, endpoints and a stray mbean
pub fn create_camel_catalog() -> Catalog {
    let mut camel = BTreeMap::new();
    for raw in [
        r#"context=ctx,type=context,name="ctx""#,
        r#"context=ctx,type=routes,name="route1""#,
        r#"context=ctx,type=routes,name="route2""#,
        r#"context=ctx,type=endpoints,name="timer://foo""#,
        r#"context=ctx,type=tracer,name="BacklogTracer""#,
    ] {
        camel.insert(raw.to_string(), create_test_info(None));
    }
    let mut java_lang = BTreeMap::new();
    java_lang.insert("type=Memory".to_string(), create_test_info(Some(true)));
    java_lang.insert(
        "type=MemoryPool,name=Metaspace".to_string(),
        create_test_info(None),
    );

    let mut catalog = Catalog::new();
    catalog.insert("org.apache.camel".to_string(), camel);
    catalog.insert("java.lang".to_string(), java_lang);
    catalog
}
