use thiserror::Error;

use crate::collector::SourceError;

/// Centralized error types for the application
///
/// Only conditions that abort a whole run end up here. Per-channel and
/// per-publish failures are recorded as status entries instead.
///
/// # Example
///
/// ```no_run
/// use config_harvester::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration (API credentials, paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session could not be loaded or the client could not connect
    #[error("Session error: {0}")]
    Session(String),

    /// Session loaded but not signed in
    #[error("Client not authorized, the session is invalid")]
    NotAuthorized,

    /// Message source errors outside a single channel
    #[error("Telegram error: {0}")]
    Source(#[from] SourceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
