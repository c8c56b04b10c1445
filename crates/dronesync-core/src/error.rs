// ── Core error types ──
//
// Errors surfaced by dronesync-core. Almost nothing at this layer is
// fatal: peripheral failures are model state, not errors. What remains
// is session plumbing, persistent storage and configuration.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Device session is closed")]
    SessionClosed,

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Device store I/O failed at {path}: {source}")]
    Store {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Device store content is invalid: {0}")]
    StoreFormat(#[from] serde_json::Error),

    // ── Transfer errors ──────────────────────────────────────────────
    #[error("Transfer failed: {message}")]
    Transfer { message: String },

    #[error("Drone API error: {0}")]
    Api(#[from] dronesync_api::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }
}
