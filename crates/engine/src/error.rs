//! The module contains the errors the engine can return.
//!
//! Lifecycle operations report failure through [`EngineError`]; they never
//! panic on bad input. [`Persistence`] is internal to the storage layer: the
//! engine resolves it through the fallback chain and callers of lifecycle
//! operations never observe it.
//!
//! [`Persistence`]: EngineError::Persistence
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A referenced id is absent from the entity store.
    #[error("\"{0}\" not found!")]
    NotFound(String),
    /// Required input is missing or malformed.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The operation is illegal for the current status.
    #[error("Invalid state: {0}")]
    StateInvariant(String),
    /// A durable medium failed. Never surfaced by lifecycle operations.
    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Persistence(err.to_string())
    }
}
