//! conform entry point

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use mediaconform::adapters::TomlConfigAdapter;
use mediaconform::app::DefaultAppContainer;
use mediaconform::cli::{commands, Cli, Commands};
use mediaconform::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, &cli.log_format)?;
    debug!("starting conform");

    let config = TomlConfigAdapter::load(cli.config.as_deref()).await?;
    let container = DefaultAppContainer::new();

    match cli.command {
        Commands::Convert(args) => commands::convert(args, &config, &container).await,
        Commands::Thumbnail(args) => commands::thumbnail(args, &config, &container).await,
        Commands::Inspect(args) => commands::inspect(args, &config, &container).await,
    }
}
