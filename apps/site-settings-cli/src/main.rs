use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use site_settings::SettingsFlag;

mod commands;
mod config;
mod logging;

use config::{AppConfig, CliOverrides};

/// Inspect and change the site's marketplace/portfolio settings.
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(name = "site-settings")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings service base URL; overrides the configuration file.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Permit a plain http:// endpoint.
    #[arg(long, global = true)]
    allow_insecure_http: bool,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current configuration and every flag.
    Show,
    /// Flip one flag and persist it immediately.
    Toggle {
        /// Flag name, e.g. `marketplaceMode` or `show-prices-on-projects`.
        flag: SettingsFlag,
    },
    /// Stage several flags and save them in one write.
    Set {
        /// Assignments such as `marketplaceMode=on paymentProcessingEnabled=off`.
        #[arg(value_parser = commands::parse_assignment, required = true)]
        assignments: Vec<(SettingsFlag, bool)>,
    },
    /// Validate the configuration without contacting the store.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        endpoint: cli.endpoint,
        allow_insecure_http: cli.allow_insecure_http,
        verbose: cli.verbose,
    });

    logging::init(&config.logging);

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => commands::show(&config).await,
        Commands::Toggle { flag } => commands::toggle(&config, flag).await,
        Commands::Set { assignments } => commands::set(&config, &assignments).await,
        Commands::Check => commands::check(&config),
    }
}
