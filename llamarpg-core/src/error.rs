//! Error types for the llamarpg core library.

use thiserror::Error;

use crate::action::InvalidDecision;
use crate::types::EntityId;

/// Top-level error type for world operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// Two roster entries share an id.
    #[error("Duplicate entity id in roster: {0}")]
    DuplicateEntity(EntityId),

    /// An entity with the given id is not registered.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A decision payload failed validation.
    #[error("Invalid decision: {0}")]
    InvalidDecision(#[from] InvalidDecision),

    /// An entity tried to trade or chat with itself.
    #[error("Entity {0} cannot interact with itself")]
    SelfInteraction(EntityId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
