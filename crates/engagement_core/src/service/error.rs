//! Service-level error taxonomy.

use crate::db::DbError;
use crate::repo::engagement_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by counter and query services.
///
/// Absent posts or detail rows are never errors, and detail-row uniqueness
/// conflicts are reconciled inside the engine, so only storage failures
/// remain.
#[derive(Debug)]
pub enum ServiceError {
    /// Store could not be reached or the transaction could not run.
    StorageUnavailable(RepoError),
    /// Store rejected the operation or returned unusable data.
    Storage(RepoError),
}

impl ServiceError {
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Stable machine-readable code for logs and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) | Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        if value.is_unavailable() {
            Self::StorageUnavailable(value)
        } else {
            Self::Storage(value)
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        RepoError::from(value).into()
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::engagement_repo::RepoError;

    #[test]
    fn schema_problems_classify_as_unavailable() {
        let err = ServiceError::from(RepoError::MissingRequiredTable("posts"));
        assert!(err.is_storage_unavailable());
        assert_eq!(err.code(), "storage_unavailable");
    }

    #[test]
    fn bad_data_classifies_as_storage_error() {
        let err = ServiceError::from(RepoError::InvalidData("x".to_string()));
        assert!(!err.is_storage_unavailable());
        assert!(err.to_string().contains("invalid engagement data"));
    }
}
