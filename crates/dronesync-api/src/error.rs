use thiserror::Error;

use crate::command::FeatureTag;

/// Top-level error type for the `dronesync-api` crate.
///
/// Covers both halves of the crate: decoding protocol command payloads
/// and talking to the drone's embedded HTTP server. `dronesync-core`
/// maps these into session-level errors or logs them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Payload decoding ────────────────────────────────────────────
    /// A command carried fewer arguments than its layout requires.
    #[error("{feature}/{command_id}: missing argument #{index}")]
    MissingArgument {
        feature: FeatureTag,
        command_id: u16,
        index: usize,
    },

    /// An argument did not have the type the layout requires.
    #[error("{feature}/{command_id}: argument #{index} is not {expected}")]
    ArgumentType {
        feature: FeatureTag,
        command_id: u16,
        index: usize,
        expected: &'static str,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The drone answered with a non-success status.
    #[error("Drone API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Local file I/O while downloading or uploading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for payload decoding failures, as opposed to
    /// transport or file errors.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::ArgumentType { .. }
        )
    }
}
