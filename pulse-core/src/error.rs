//! Common error types for Pulse

use thiserror::Error;

/// Common result type for Pulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Pulse platform
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registration attempted with an email that already has an account
    #[error("Email address {0} is already registered")]
    DuplicateRegistration(String),

    /// Login rejected; one variant covers unknown email and wrong password
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before any write took place
    #[error("Validation error: {0}")]
    Validation(String),
}
