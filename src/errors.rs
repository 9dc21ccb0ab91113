//! Unified error type for the service.
//!
//! Core operations return [`Result`]; the HTTP layer maps each variant to a
//! status code in [`crate::api::error`].

use thiserror::Error;

/// All failures raised by core operations, configuration loading and startup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying `SeaORM` / database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A lookup by id found nothing
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "menu item")
        entity: &'static str,
        /// Identifier that was requested
        id: String,
    },

    /// Input failed validation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input
        message: String,
    },

    /// A price was negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A reservation date string did not match `dd-mm-YYYY HH:MM`
    #[error("Invalid reservation date '{input}', expected dd-mm-YYYY HH:MM")]
    InvalidDate {
        /// The rejected input
        input: String,
    },

    /// A business rule was violated
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Which rule was violated
        message: String,
    },

    /// The request carried no caller identity
    #[error("Authentication required")]
    Unauthorized,

    /// The caller lacks the role required for the operation
    #[error("Requires role {role}")]
    Forbidden {
        /// Name of the missing role
        role: String,
    },

    /// I/O failure during startup
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
