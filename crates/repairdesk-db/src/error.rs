//! Database-specific error types and conversions.

use std::collections::HashMap;

use repairdesk_core::error::ShopError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The store refused a write (duplicate record id, failed assertion).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    /// A stored value could not be mapped back into a domain record.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify an error raised by a statement: storage refusals become
    /// [`DbError::Constraint`], everything else stays a storage error.
    pub(crate) fn from_statement(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if is_constraint_violation(&message) {
            DbError::Constraint(message)
        } else {
            DbError::Surreal(err)
        }
    }

    /// Classify the errors of a multi-statement response.
    ///
    /// Inside a transaction every statement after the failing one reports
    /// a "not executed" placeholder; the first real cause in statement
    /// order is the one classified. Returns `None` when nothing failed.
    pub(crate) fn from_statements(errors: HashMap<usize, surrealdb::Error>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let mut errors: Vec<(usize, surrealdb::Error)> = errors.into_iter().collect();
        errors.sort_by_key(|(index, _)| *index);

        let position = errors
            .iter()
            .position(|(_, err)| !is_not_executed(&err.to_string()))
            .unwrap_or(0);
        let (_, cause) = errors.swap_remove(position);
        Some(DbError::from_statement(cause))
    }

    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

fn is_constraint_violation(message: &str) -> bool {
    message.contains("already exists")
        || message.contains("must conform to")
        || message.contains("already contains")
}

fn is_not_executed(message: &str) -> bool {
    message.contains("not executed") || message.contains("failed transaction")
}

impl From<DbError> for ShopError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ShopError::NotFound { entity, id },
            DbError::Constraint(message) => ShopError::Constraint { message },
            DbError::Validation(message) => ShopError::Validation { message },
            other => ShopError::Storage(other.to_string()),
        }
    }
}
