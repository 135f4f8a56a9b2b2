//! Unified error types and result handling.
//!
//! Validation failures are reported with dedicated variants so callers can
//! present precise messages; everything that goes wrong on the backend side
//! collapses into [`Error::Database`], which carries the backend's own
//! message verbatim. Out-of-range paging values are never errors: they are
//! clamped silently by the query layer.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the configuration problem
        message: String,
    },

    /// The backing database rejected or failed a query.
    #[error("Database error: {message}")]
    Database {
        /// The backend's error message, propagated unchanged
        message: String,
    },

    /// The authentication provider failed, or an operation required a
    /// signed-in user and none was present.
    #[error("Authentication error: {message}")]
    Auth {
        /// The provider's error message, propagated unchanged
        message: String,
    },

    /// A write payload failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the payload
        message: String,
    },

    /// A price was negative, NaN, or infinite.
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected value
        price: f64,
    },

    /// A category label outside the closed set was supplied.
    #[error("Unknown category: {value}")]
    UnknownCategory {
        /// The rejected label
        value: String,
    },

    /// A sort key outside `created_at`, `price`, `name` was supplied.
    #[error("Unknown sort key: {value}")]
    UnknownSortKey {
        /// The rejected key
        value: String,
    },

    /// No product with the given id is visible to the requesting user.
    #[error("Product {id} not found")]
    ProductNotFound {
        /// The id that matched no owned row
        id: i64,
    },
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
