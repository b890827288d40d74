//! Error types for inventory client operations.

use thiserror::Error;

/// Errors returned by the inventory clients.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Network or transport-level HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inventory API returned a non-success status.
    #[error("Inventory API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base URL or other setup problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A failure injected into the in-memory inventory.
    #[error("Injected failure: {0}")]
    Injected(String),
}

/// Result type alias using InventoryError.
pub type InventoryResult<T> = Result<T, InventoryError>;
