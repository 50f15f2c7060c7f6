//! Domain-specific reshaping of the generic tree.
//!
//! Reshapers are ordinary [TreeProcessor](crate::processor::TreeProcessor)s that only use the
//! public [Forest](crate::tree::Forest) primitives. [register_configured] adds the ones
//! enabled in a [TreeConfig] to a registry.
use std::sync::Arc;

use crate::{config::TreeConfig, processor::ProcessorRegistry, source::AttributeReader};

pub mod camel;

pub use camel::{ContextCategory, ContextGroupingConfig, ContextGroupingProcessor};

pub const CAMEL_PROCESSOR: &str = "camel";

/// Register every reshaper `config` enables. Returns the registered names.
pub fn register_configured(
    registry: &ProcessorRegistry,
    config: &TreeConfig,
    reader: Option<Arc<dyn AttributeReader>>,
) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(camel) = config.reshape.camel.as_ref() {
        let mut processor = ContextGroupingProcessor::new(camel.clone());
        if let Some(reader) = reader {
            processor = processor.with_reader(reader);
        }
        registry.add(CAMEL_PROCESSOR, processor);
        names.push(CAMEL_PROCESSOR.to_string());
    }
    names
}
