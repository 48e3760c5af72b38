//! Shared domain errors for aggregates without a dedicated error enum.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic business failures. The cart has its own richer `CartError`;
/// orders and ids report through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The named entity (e.g. "order") does not exist yet.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }

    /// True for errors caused by caller input rather than aggregate state.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(DomainError::not_found("order").to_string(), "order not found");
        assert_eq!(
            DomainError::validation("zip_code is required").to_string(),
            "validation failed: zip_code is required"
        );
    }

    #[test]
    fn client_errors_are_input_problems() {
        assert!(DomainError::validation("x").is_client_error());
        assert!(DomainError::invalid_id("x").is_client_error());
        assert!(!DomainError::conflict("x").is_client_error());
        assert!(!DomainError::not_found("order").is_client_error());
    }
}
