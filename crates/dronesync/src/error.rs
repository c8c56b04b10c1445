//! CLI error types with miette diagnostics.
//!
//! Maps config and core errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use dronesync_config::ConfigError;
use dronesync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const TRACE: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Trace ────────────────────────────────────────────────────────
    #[error("Cannot read trace file {path}")]
    #[diagnostic(code(dronesync::trace_read))]
    TraceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid trace entry at line {line}")]
    #[diagnostic(
        code(dronesync::trace_entry),
        help(
            "Each line must be one JSON object: {{\"link\": ...}}, {{\"command\": ...}} or {{\"intent\": ...}}.\n\
             Blank lines and lines starting with '#' are skipped."
        )
    )]
    TraceEntry {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error")]
    #[diagnostic(
        code(dronesync::config),
        help("Inspect the resolved configuration with: dronesync config show")
    )]
    Config(#[from] ConfigError),

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(dronesync::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Device session failed")]
    #[diagnostic(code(dronesync::session))]
    Session(#[from] CoreError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dronesync::validation))]
    Validation { field: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(dronesync::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TraceRead { .. } | Self::TraceEntry { .. } => exit_code::TRACE,
            Self::Config(_) | Self::ConfigExists { .. } => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Session(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}
