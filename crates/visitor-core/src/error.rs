//! Error type shared by the record, dispatch, and session layers.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while enriching a request.
///
/// Unsupported categories and falsy provider values are not errors: the first is skipped,
/// the second is stored as the unknown sentinel.
#[derive(Debug, Error)]
pub enum VisitorError {
    /// No raw input supplied and the request context has no fallback for it.
    #[error("no {input} supplied and none found in the request context")]
    MissingInput { input: &'static str },
    /// A category that needs a parameter (e.g. a database path) was requested without one.
    #[error("category '{category}' requires a database path")]
    MissingParameter { category: String },
    /// The resolved address could not be handed to the geo provider.
    #[error("'{address}' is not a valid IP address")]
    InvalidAddress { address: String },
    /// The user-agent classifier failed.
    #[error("user agent classification failed: {0}")]
    Classification(String),
    /// A database file could not be opened (missing, unreadable, or not a database).
    #[error("cannot open database '{}': {reason}", .path.display())]
    DatabaseOpen { path: PathBuf, reason: String },
    /// The database opened but the lookup failed (address absent, malformed record).
    #[error("lookup of {address} in '{}' failed: {reason}", .path.display())]
    Lookup {
        path: PathBuf,
        address: String,
        reason: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
