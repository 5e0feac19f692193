//! Unified error types for the storefront core.
//!
//! `Error` is the crate-wide error returned by fallible operations. Catalog
//! failures keep their own taxonomy in [`CatalogError`] so callers can tell an
//! unusable request apart from an answer that could not be understood.

use thiserror::Error;

/// Failure kinds of a single product catalog lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The search term could not be turned into a request target.
    #[error("Invalid catalog query: {message}")]
    InvalidQuery {
        /// What was wrong with the term or base URL
        message: String,
    },

    /// Transport failure or non-success HTTP status.
    #[error("Catalog request failed: {message}")]
    RequestFailed {
        /// Transport error text or offending status
        message: String,
    },

    /// The catalog answered but the body is not a product list.
    #[error("Could not decode catalog response: {message}")]
    DecodeError {
        /// Decoder error text
        message: String,
    },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Local favorites database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Product catalog failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Realtime review store failure.
    #[error("Realtime store error: {message}")]
    Realtime {
        /// Description of the store failure
        message: String,
    },

    /// Credentials rejected before reaching the identity provider.
    #[error("Invalid credentials: {reason}")]
    InvalidCredentials {
        /// Human-readable rejection reason
        reason: String,
    },

    /// Review rejected before reaching the store.
    #[error("Invalid review: {reason}")]
    InvalidReview {
        /// Human-readable rejection reason
        reason: String,
    },

    /// Command line could not be understood.
    #[error("{message}")]
    Usage {
        /// Usage text to show
        message: String,
    },

    /// HTTP client construction or transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable failure.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
