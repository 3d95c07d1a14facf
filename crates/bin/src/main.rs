use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("prefstore=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.into();

    match &cli.command {
        Commands::Info => commands::info::run(&cli.backend, format).await,
        Commands::Show(args) => commands::show::run(&cli.backend, args, format).await,
        Commands::Prune(args) => commands::prune::run(&cli.backend, args, format).await,
        Commands::Rollover(args) => commands::rollover::run(&cli.backend, args, format).await,
        Commands::Reseal => commands::reseal::run(&cli.backend, format).await,
    }
}
