use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voxdash::cli::{self, Cli, Commands, ConfigCommands};
use voxdash::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Checking the config must not fail on the config it is checking
    if let Commands::Config(ConfigCommands::Check) = cli.command {
        return cli::cmd_config_check(&cli.config);
    }

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        api = %config.api.base_url,
        "Starting voxdash v{}",
        env!("CARGO_PKG_VERSION")
    );

    cli::run_command(&cli, &config).await
}
