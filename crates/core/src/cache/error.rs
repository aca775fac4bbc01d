use thiserror::Error;

/// Errors that can occur during cache registration and store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache store: {0}")]
    Validation(String),
    #[error("A cache store named '{0}' is already registered")]
    DuplicateRegistration(String),
    #[error("Cache store '{0}' is not registered")]
    StoreNotFound(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let error = CacheError::Validation("name cannot be empty".to_string());
        assert_eq!(error.to_string(), "Invalid cache store: name cannot be empty");
    }

    #[test]
    fn test_duplicate_registration_display() {
        let error = CacheError::DuplicateRegistration("users".to_string());
        assert_eq!(
            error.to_string(),
            "A cache store named 'users' is already registered"
        );
    }

    #[test]
    fn test_store_not_found_display() {
        let error = CacheError::StoreNotFound("sessions".to_string());
        assert_eq!(error.to_string(), "Cache store 'sessions' is not registered");
    }

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("connection reset".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: connection reset");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let error = CacheError::from(err);
        assert!(matches!(error, CacheError::Serialization(_)));
    }
}
