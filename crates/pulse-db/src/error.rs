use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage-level outcomes the HTTP layer needs to tell apart.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced idea/user/comment does not exist.
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    /// Uniqueness-constraint violation on insert. For vote/reaction toggles
    /// this means the race was lost and the caller falls back to the
    /// update/delete path rather than surfacing an error.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
