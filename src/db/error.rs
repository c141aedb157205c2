use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Storage failures, classified so callers can match on them instead of
/// inspecting driver messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A record with this value already exists")]
    UniqueViolation,

    #[error("Record not found")]
    NotFound,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Self::UniqueViolation;
        }

        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}
