use std::io;

use http::status::StatusCode;
use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError as TokioSendError;

use crate::event::TreeEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum TreeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Adopting '{0}' would make it its own ancestor")]
    Cycle(String),
    #[error("A {kind} named '{name}' already exists under '{parent}'")]
    DuplicateSibling {
        parent: String,
        name: String,
        kind: String,
    },
    #[error("File System error: {0}")]
    Io(String),
    #[error("Node '{0}' is a leaf and cannot hold children")]
    NotAFolder(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Processor '{name}' failed: {reason}")]
    Processor { name: String, reason: String },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Catalog source error: {0}")]
    Source(String),
}

impl TreeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TreeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TreeError::Cycle(_) => StatusCode::CONFLICT,
            TreeError::DuplicateSibling { .. } => StatusCode::CONFLICT,
            TreeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TreeError::NotAFolder(_) => StatusCode::BAD_REQUEST,
            TreeError::NotFound(_) => StatusCode::NOT_FOUND,
            TreeError::PermissionDenied => StatusCode::FORBIDDEN,
            TreeError::Processor { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            TreeError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TreeError::Source(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<toml::de::Error> for TreeError {
    fn from(src: toml::de::Error) -> TreeError {
        TreeError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for TreeError {
    fn from(src: toml::ser::Error) -> TreeError {
        TreeError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for TreeError {
    fn from(src: JsonError) -> TreeError {
        TreeError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for TreeError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => TreeError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => TreeError::PermissionDenied,
            _ => TreeError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<RegexError> for TreeError {
    fn from(x: RegexError) -> Self {
        TreeError::Serialization(format!("Regex parse failed: {x}"))
    }
}

impl From<TokioSendError<TreeEvent>> for TreeError {
    fn from(x: TokioSendError<TreeEvent>) -> Self {
        TreeError::Io(format!(
            "Channel update send Error, could not transmit tree event {:?}",
            x.0
        ))
    }
}
