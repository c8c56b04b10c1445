//! Config subcommand handlers.

use std::path::PathBuf;

use tracing::info;

use dronesync_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Config file in effect: `--config` / `DRONESYNC_CONFIG`, else the
/// platform default.
pub fn path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// Load the resolved configuration (file + environment).
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(config::load_config_from(&path(global))?)
}

fn render_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Render(e.to_string()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = load(global)?;
            let rendered = output::render_single(&global.output, &cfg, render_toml)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let target = path(global);
            if target.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: target.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &target)?;
            info!(path = %target.display(), "config written");
            if !global.quiet {
                eprintln!("Config written to {}", target.display());
            }
            Ok(())
        }
    }
}
