//! tagsync CLI - reconcile resource tags against the remote inventory.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagsync_config_and_utils::{init_logging, Config, Paths};
use tracing::debug;

/// tagsync - converge resource tags with their declared state.
#[derive(Parser)]
#[command(name = "tagsync")]
#[command(about = "Diff and reconcile cloud resource tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Use a config file other than ~/.tagsync/config.json
    #[arg(long, global = true, env = "TAGSYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tags that would be removed and created
    Diff {
        /// JSON file with the old (remote) tag map
        #[arg(long)]
        old: PathBuf,
        /// JSON file with the new (declared) tag map
        #[arg(long)]
        new: PathBuf,
    },

    /// Reconcile one resource from a request file
    Apply {
        /// JSON request file (primary_id, spot_instance_id, old_tags, new_tags, changed)
        request: PathBuf,
        /// Run against an in-memory inventory instead of the remote API
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

/// Resolve the effective config. Validation is left to the commands that
/// talk to the inventory.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::resolve(path, true)?,
        None => Config::resolve(&Paths::new()?.config_file(), false)?,
    };
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{e:#}"), &cli.format);
            std::process::exit(2);
        }
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));
    debug!(inventory_url = %config.inventory_url, "Configuration loaded");

    let result = match cli.command {
        Commands::Diff { old, new } => commands::diff(&old, &new, &cli.format),
        Commands::Apply { request, dry_run } => {
            commands::apply(&config, &request, dry_run, &cli.format)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_show(&config, &cli.format),
        },
    };

    if let Err(e) = result {
        output::print_error(&format!("{e:#}"), &cli.format);
        std::process::exit(1);
    }
}
