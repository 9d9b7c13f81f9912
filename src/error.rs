use std::{fmt, io, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use walkdir::Error as WalkDirError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum CleanupError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Malformed markup: {0}")]
    Malformed(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl CleanupError {
    /// Wrap any displayable parser failure as a markup error.
    pub fn malformed<E: fmt::Display>(src: E) -> CleanupError {
        CleanupError::Malformed(format!("{src}"))
    }

    /// Whether this error means the document itself could not be read as a tree.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CleanupError::Malformed(_))
    }
}

impl From<toml::de::Error> for CleanupError {
    fn from(src: toml::de::Error) -> CleanupError {
        CleanupError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for CleanupError {
    fn from(src: JsonError) -> CleanupError {
        CleanupError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<FromUtf8Error> for CleanupError {
    fn from(src: FromUtf8Error) -> CleanupError {
        CleanupError::Serialization(format!("Serialized document is not valid UTF-8: {src}"))
    }
}

impl From<io::Error> for CleanupError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => CleanupError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => CleanupError::PermissionDenied,
            _ => CleanupError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<WalkDirError> for CleanupError {
    fn from(x: WalkDirError) -> Self {
        let path = x.path().map(|p| p.to_path_buf());
        match x.into_io_error() {
            Some(io_error) => CleanupError::from(io_error),
            None => CleanupError::Io(format!("directory walk failed at {path:?}")),
        }
    }
}
