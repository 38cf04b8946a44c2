//! Storage error types.

use thiserror::Error;

/// Convenience alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors returned by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database rejected the operation or could not be reached.
    #[error("Database error: {0}")]
    Database(String),

    /// A value could not be converted to or from its stored form.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored record exists but cannot be used.
    #[error("Corrupt record '{id}': {reason}")]
    Corrupt {
        /// Id (or key) of the record.
        id: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StorageError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StorageError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_names_the_record() {
        let error = StorageError::Corrupt {
            id: "offline_a.myshopify.com".to_string(),
            reason: "invalid shop".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("offline_a.myshopify.com"));
        assert!(message.contains("invalid shop"));
    }

    #[test]
    fn test_database_message() {
        let error = StorageError::Database("connection refused".to_string());
        assert_eq!(error.to_string(), "Database error: connection refused");
    }
}
