// Error kinds for rendering and series reconciliation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or non-positive argument (e.g. update_interval).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No formatter or runner registered for the requested pair/medium.
    #[error("not found: {0}")]
    NotFound(String),

    /// External series command exited non-zero or printed something unparsable.
    #[error("external command failed: `{command}`: {output}")]
    ExternalToolFailure { command: String, output: String },

    /// Bad ignore-rule pattern or other config problem.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_external(&self) -> bool {
        matches!(self, Error::ExternalToolFailure { .. })
    }
}
