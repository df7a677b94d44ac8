/// Error taxonomy for the identity and membership store
///
/// Every store operation returns [`StoreResult`]. The four variants map onto
/// four distinct [`ErrorKind`]s so the transport layer can tell client-caused
/// failures apart from storage failures without string matching.
///
/// # Example
///
/// ```
/// use usermanagement_shared::error::{ErrorKind, StoreError};
///
/// let err = StoreError::validation("user_id must be positive");
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert!(err.kind().is_client_error());
/// ```

use std::fmt;

/// Result alias used by stores and repositories
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure returned by a store or repository operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Structurally invalid input: missing field, non-positive id, bad page size
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness or single-membership invariant would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation required an active row that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing store failed for an unrelated reason
    #[error("Storage failure: {message}")]
    Storage {
        /// Human-readable description
        message: String,

        /// Underlying database error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },
}

/// Coarse classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Storage,
}

impl ErrorKind {
    /// Returns the snake_case label for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
        }
    }

    /// True for kinds caused by the caller's input rather than the backend
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ErrorKind::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoreError {
    pub fn validation(detail: impl Into<String>) -> Self {
        StoreError::Validation(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        StoreError::Conflict(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        StoreError::NotFound(detail.into())
    }

    /// Storage failure with no underlying database error
    pub fn storage(message: impl Into<String>) -> Self {
        StoreError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Returns the human-readable detail without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            StoreError::Validation(msg) | StoreError::Conflict(msg) | StoreError::NotFound(msg) => {
                msg
            }
            StoreError::Storage { message, .. } => message,
        }
    }
}

/// Maps database errors onto the taxonomy
///
/// The partial unique indexes on active rows are the authoritative guard
/// against duplicates, so a unique violation surfaces as [`StoreError::Conflict`]
/// even when the application-level check raced past it.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let detail = match db_err.constraint() {
                    Some(constraint) => format!("unique constraint {} violated", constraint),
                    None => "unique constraint violated".to_string(),
                };
                return StoreError::Conflict(detail);
            }
        }

        StoreError::Storage {
            message: format!("database error: {}", err),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(StoreError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(StoreError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(StoreError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(StoreError::storage("x").kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_client_errors_distinguishable_from_storage() {
        assert!(ErrorKind::Validation.is_client_error());
        assert!(ErrorKind::Conflict.is_client_error());
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(!ErrorKind::Storage.is_client_error());
    }

    #[test]
    fn test_display_and_detail() {
        let err = StoreError::not_found("user 7 not found");
        assert_eq!(err.to_string(), "Not found: user 7 not found");
        assert_eq!(err.detail(), "user 7 not found");
    }

    #[test]
    fn test_non_unique_sqlx_error_is_storage() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_row_not_found_is_storage() {
        // Missing rows are reported explicitly by the stores, never via sqlx
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
