use crate::{error::TreeError, reshape::ContextGroupingConfig};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{read_to_string, write},
    path::Path,
};

pub const DEFAULT_ID_SEPARATOR: &str = "-";
pub const DEFAULT_FOLDER_SUFFIX: &str = "-folder";

/// Engine settings. Every field has a default, so a partial TOML file only overrides what it
/// names:
///
/// ```toml
/// id_separator = "-"
///
/// [reorder]
/// "osgi.core" = ["type", "version", "framework"]
///
/// [reshape.camel]
/// domain = "org.apache.camel"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Joins a parent id and an escaped child name.
    pub id_separator: String,
    /// Appended to the ids of folder nodes.
    pub folder_suffix: String,
    /// Domain name -> property keys moved, in order, to the front of every path in that domain.
    pub reorder: BTreeMap<String, Vec<String>>,
    pub reshape: ReshapeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeConfig {
    pub camel: Option<ContextGroupingConfig>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let mut reorder = BTreeMap::new();
        reorder.insert(
            "osgi.compendium".to_string(),
            vec![
                "service".to_string(),
                "version".to_string(),
                "framework".to_string(),
            ],
        );
        reorder.insert(
            "osgi.core".to_string(),
            vec![
                "type".to_string(),
                "version".to_string(),
                "framework".to_string(),
            ],
        );
        TreeConfig {
            id_separator: DEFAULT_ID_SEPARATOR.to_string(),
            folder_suffix: DEFAULT_FOLDER_SUFFIX.to_string(),
            reorder,
            reshape: ReshapeConfig::default(),
        }
    }
}

impl TreeConfig {
    pub fn from_toml_str(content: &str) -> Result<TreeConfig, TreeError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, TreeError> {
        Ok(toml::to_string(self)?)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<TreeConfig, TreeError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read tree config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(TreeConfig::default());
        }
        let content = read_to_string(path)?;
        TreeConfig::from_toml_str(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        tracing::debug!("Attempting to write tree config to: {:?}", path.as_ref());
        write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn reorder_for(&self, domain: &str) -> Option<&[String]> {
        self.reorder.get(domain).map(|keys| keys.as_slice())
    }
}
