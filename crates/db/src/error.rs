use foltia_core::error::CoreError;
use foltia_core::types::DbId;

/// Error type for catalog database operations.
///
/// Wraps [`CoreError`] for decode and validation failures and keeps
/// [`sqlx::Error`] untouched so callers see the backing-store error as-is.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A domain-level error from `foltia_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A mutation was requested that would write nothing.
    #[error("Empty mutation: {0}")]
    EmptyMutation(&'static str),

    /// A row that was just written could not be read back.
    #[error("Subtitle {p_id} vanished after update")]
    Vanished { p_id: DbId },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for catalog results.
pub type DbResult<T> = Result<T, DbError>;
