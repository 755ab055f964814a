//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The single failure shape of an authorization decision.
///
/// `Unauthenticated` means the action needs an actor and none was resolved;
/// `Forbidden` means an actor was resolved but failed the role, ownership or
/// publication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient permissions")]
    Forbidden,
}

impl From<AccessDenied> for DomainError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => DomainError::Unauthorized,
            AccessDenied::Forbidden => DomainError::Forbidden,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique key already holds the value.
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Any other integrity violation, such as a dangling foreign key.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}
