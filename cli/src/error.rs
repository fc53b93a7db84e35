use thiserror::Error;
use traffic_shell_core::ParseError;
use traffic_shell_db::DbError;

/// Errors reported for one shell line.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An argument value has the wrong shape.
    #[error("invalid value '{value}' for -{name}")]
    InvalidArgument { name: &'static str, value: String },

    /// A required named argument was not supplied.
    #[error("-{0} is required")]
    MissingArgument(&'static str),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, ShellError>;
