//! cli-dist - CLI distribution server
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use cli_dist::cli::args::ConfigAction;
use cli_dist::cli::{Cli, Commands};
use cli_dist::config::{Config, ConfigManager};
use cli_dist::error::{DistError, DistResult};
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DistResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = match cli.config {
        Some(ref path) => {
            let initializing = matches!(
                cli.command,
                Commands::Config(ref args) if matches!(args.action, Some(ConfigAction::Init { .. }))
            );
            if !path.exists() && !initializing {
                return Err(DistError::ConfigNotFound(path.clone()));
            }
            ConfigManager::with_path(path.clone())
        }
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Serve(args) => cli_dist::cli::commands::serve(args, config).await,
        Commands::Config(args) => {
            cli_dist::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// Initialize logging: 0 = info, 1 = debug, 2+ = trace. `RUST_LOG` wins.
fn init_logging(verbose: u8, config: &Config) {
    let default = match verbose {
        0 => "cli_dist=info,tower_http=info",
        1 => "cli_dist=debug,tower_http=debug",
        _ => "cli_dist=trace,tower_http=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
