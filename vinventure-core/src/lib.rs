pub mod authz;
pub mod identity;
pub mod pagination;
pub mod user;

/// Error taxonomy shared by every service in the workspace. Each variant maps to a
/// stable HTTP status and machine-readable kind at the API boundary; only
/// `InternalError` is treated as unexpected.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Resource inactive: {0}")]
    InactiveResourceError(String),
    #[error("Capacity exceeded: {0}")]
    CapacityError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Not authorized: {0}")]
    AuthorizationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Stable machine-readable kind carried in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::ValidationError(_) => "VALIDATION_ERROR",
            CoreError::NotFoundError(_) => "NOT_FOUND",
            CoreError::InactiveResourceError(_) => "INACTIVE_RESOURCE",
            CoreError::CapacityError(_) => "CAPACITY_EXCEEDED",
            CoreError::ConflictError(_) => "CONFLICT",
            CoreError::AuthenticationError(_) => "AUTHENTICATION_FAILED",
            CoreError::AuthorizationError(_) => "NOT_AUTHORIZED",
            CoreError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(CoreError::ConflictError("slot".into()).kind(), "CONFLICT");
        assert_eq!(
            CoreError::CapacityError("9 > 8".into()).kind(),
            "CAPACITY_EXCEEDED"
        );
        assert_eq!(
            CoreError::InactiveResourceError("exp".into()).kind(),
            "INACTIVE_RESOURCE"
        );
    }
}
