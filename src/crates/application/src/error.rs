use domain::account::AccountError;
use domain::song::SongError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Upload quota exceeded")]
    QuotaExceeded,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Aggregate not found: {0}: {1}")]
    AggregateNotFound(String, String),
    #[error("Account error: {0}")]
    AccountError(#[from] AccountError),
    #[error("Song error: {0}")]
    SongError(#[from] SongError),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Repository error: {0}: {1}")]
    RepositoryError(String, String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}
