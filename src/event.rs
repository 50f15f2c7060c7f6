use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Outcome of a tree load, published by [crate::loader::TreeLoader] to interested renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeEvent {
    /// Generation, names of the published roots
    Loaded { generation: u64, roots: Vec<String> },
    /// The catalog fetch failed and an empty forest was published for this generation.
    LoadFailed { generation: u64, reason: String },
    /// A build finished after a newer load started; its forest was dropped.
    Superseded { generation: u64 },
}

impl TreeEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TreeEvent::Loaded { generation, .. }
            | TreeEvent::LoadFailed { generation, .. }
            | TreeEvent::Superseded { generation } => *generation,
        }
    }
}

impl Display for TreeEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeEvent::Loaded { generation, roots } => {
                write!(f, "Loaded(gen {generation}, {} roots)", roots.len())
            }
            TreeEvent::LoadFailed { generation, reason } => {
                write!(f, "LoadFailed(gen {generation}): {reason}")
            }
            TreeEvent::Superseded { generation } => write!(f, "Superseded(gen {generation})"),
        }
    }
}
