//! Errors shared by the cache, configuration and bootstrap layers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures below the analysis pipeline
///
/// The pipeline treats these as cache trouble (logged, not fatal);
/// only the administrative and HTTP edges surface them.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query, pool or transaction failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or config file access
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or malformed `jeonse-analyzer.toml`
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected caller input, e.g. an empty region name
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_errors_convert() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("Database error"));
    }
}
