//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A Jolokia `list` response for one JVM: memory beans plus a Camel context with two routes,
/// one of which the current user may not invoke.
#[allow(dead_code)]
pub const LIST_RESPONSE: &str = r#"{
  "request": {"type": "list"},
  "status": 200,
  "value": {
    "java.lang": {
      "type=Memory": {
        "desc": "Memory",
        "attr": {"HeapMemoryUsage": {"type": "javax.management.openmbean.CompositeData", "rw": false}},
        "op": {"gc": {"args": [], "ret": "void", "canInvoke": true}},
        "canInvoke": true
      },
      "type=MemoryPool,name=Metaspace": {
        "attr": {"Usage": {"type": "javax.management.openmbean.CompositeData", "rw": false}},
        "op": {"resetPeakUsage": {"args": [], "ret": "void"}}
      }
    },
    "org.apache.camel": {
      "context=shop,type=context,name=\"shop\"": {
        "attr": {"CamelVersion": {"type": "java.lang.String", "rw": false}},
        "op": {
          "stop": {"args": [], "ret": "void"},
          "start": [
            {"args": [], "ret": "void", "canInvoke": true},
            {"args": [{"name": "p0", "type": "boolean"}], "ret": "void", "canInvoke": false}
          ]
        },
        "opByString": {
          "start()": {"args": [], "ret": "void", "canInvoke": true},
          "start(boolean)": {"args": [{"name": "p0", "type": "boolean"}], "ret": "void", "canInvoke": false}
        }
      },
      "context=shop,type=routes,name=\"orders\"": {
        "op": {"stop": {"args": [], "ret": "void", "canInvoke": true}}
      },
      "context=shop,type=routes,name=\"refunds\"": {
        "op": {"stop": {"args": [], "ret": "void", "canInvoke": false}},
        "canInvoke": false
      },
      "context=shop,type=endpoints,name=\"direct://orders\"": {}
    }
  }
}"#;

/// Write [LIST_RESPONSE] to `<temp_dir>/list.json`.
#[allow(dead_code)]
pub fn write_catalog(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("list.json");
    std::fs::write(&path, LIST_RESPONSE).unwrap();
    path
}

/// Write a config enabling the Camel reshaper to `<temp_dir>/tree.toml`.
#[allow(dead_code)]
pub fn write_config(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("tree.toml");
    std::fs::write(
        &path,
        "[reshape.camel]\ndomain = \"org.apache.camel\"\ncontexts_folder = \"Contexts\"\n",
    )
    .unwrap();
    path
}
