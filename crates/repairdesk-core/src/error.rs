//! Error types for the RepairDesk core.

use thiserror::Error;

/// The four failure kinds every core operation can surface.
///
/// Callers match on the variant to decide how to present the failure;
/// the core itself never turns these into user-facing text.
#[derive(Debug, Error)]
pub enum ShopError {
    /// A required field is missing or a business rule was violated.
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// The store rejected a write (duplicate key, failed assertion,
    /// exhausted identifier space).
    #[error("Constraint violation: {message}")]
    Constraint { message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShopError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }
}

pub type ShopResult<T> = Result<T, ShopError>;
