//! Command handlers: bridge CLI args to the config and core crates.

pub mod config_cmd;
pub mod replay;
